//! Randomized invariant testing for the store

pub mod simulator;

pub use simulator::*;

/// Multi-seed simulation runs
pub struct TestHarness;

impl TestHarness {
    /// Run the simulator once per seed in `0..seeds`
    #[must_use]
    pub fn run_certification(seeds: u64, operations: u64) -> CertificationReport {
        tracing::info!("Running certification over {} seeds", seeds);

        let mut failed_seeds = Vec::new();
        let mut total_violations = 0;
        for seed in 0..seeds {
            let report = run_simulator(SimulatorConfig {
                seed,
                total_operations: operations,
                ..SimulatorConfig::default()
            });
            if !report.passed() {
                failed_seeds.push(seed);
            }
            total_violations += report.violations.len();
        }

        CertificationReport {
            passed: failed_seeds.is_empty(),
            total_violations,
            seeds_tested: seeds,
            failed_seeds,
        }
    }
}

/// Result of a multi-seed run
#[derive(Debug, Clone)]
pub struct CertificationReport {
    pub passed: bool,
    pub total_violations: usize,
    pub seeds_tested: u64,
    pub failed_seeds: Vec<u64>,
}
