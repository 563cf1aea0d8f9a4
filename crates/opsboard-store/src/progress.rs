//! Progress trackers
//!
//! Read-only views over the counters: the overall granted-requests goal, the
//! weekly nudge bucket and the three weekly metrics.

use crate::config::ProgressGoals;
use opsboard_model::{WeeklyNudge, WeeklyStats};
use serde::Serialize;

/// Nudge buckets shown besides the current week
pub const PREVIOUS_NUDGE_WEEKS: usize = 3;

/// Percentage of `goal` reached, rounded and capped at 100
///
/// A zero goal counts as reached.
#[must_use]
pub fn percent(value: u64, goal: u64) -> u8 {
    if goal == 0 {
        return 100;
    }
    // Round half up in integer arithmetic, matching `round(100 * v / g)`.
    let scaled = (u128::from(value) * 200 + u128::from(goal)) / (u128::from(goal) * 2);
    u8::try_from(scaled.min(100)).unwrap_or(100)
}

/// One progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tracker {
    pub value: u64,
    pub goal: u64,
    pub percent: u8,
}

impl Tracker {
    #[must_use]
    pub fn new(value: u64, goal: u64) -> Self {
        Self {
            value,
            goal,
            percent: percent(value, goal),
        }
    }
}

/// Aggregate counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total_requests_granted: u64,
    pub weekly_stats: WeeklyStats,
}

/// Nudge tracker for one week bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NudgeProgress {
    pub week: u32,
    pub year: i32,
    pub tracker: Tracker,
}

impl NudgeProgress {
    fn new(nudge: WeeklyNudge, goal: u32) -> Self {
        Self {
            week: nudge.week,
            year: nudge.year,
            tracker: Tracker::new(u64::from(nudge.count), u64::from(goal)),
        }
    }
}

/// Everything the progress trackers display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub overall: Tracker,
    pub current_week: NudgeProgress,
    /// Most recent buckets other than the current one, oldest first
    pub previous_weeks: Vec<NudgeProgress>,
    pub requests_granted: Tracker,
    pub new_joiners: Tracker,
    pub new_requests: Tracker,
}

impl ProgressReport {
    /// Build the report for the bucket `(week, year)`
    #[must_use]
    pub fn build(
        stats: BoardStats,
        nudges: &[WeeklyNudge],
        (week, year): (u32, i32),
        goals: &ProgressGoals,
    ) -> Self {
        let is_current = |n: &WeeklyNudge| n.week == week && n.year == year;
        let current = nudges
            .iter()
            .copied()
            .find(is_current)
            .unwrap_or(WeeklyNudge { week, year, count: 0 });
        let previous: Vec<WeeklyNudge> = nudges.iter().copied().filter(|n| !is_current(n)).collect();
        let skip = previous.len().saturating_sub(PREVIOUS_NUDGE_WEEKS);

        Self {
            overall: Tracker::new(stats.total_requests_granted, goals.overall_requests),
            current_week: NudgeProgress::new(current, goals.weekly_nudges),
            previous_weeks: previous[skip..]
                .iter()
                .map(|n| NudgeProgress::new(*n, goals.weekly_nudges))
                .collect(),
            requests_granted: Tracker::new(stats.weekly_stats.requests_granted, goals.weekly_metric),
            new_joiners: Tracker::new(stats.weekly_stats.new_joiners, goals.weekly_metric),
            new_requests: Tracker::new(stats.weekly_stats.new_requests, goals.weekly_metric),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn nudge(week: u32, count: u32) -> WeeklyNudge {
        WeeklyNudge { week, year: 2025, count }
    }

    #[test]
    fn percent_rounds_and_caps() {
        assert_eq!(percent(0, 30), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(1, 201), 0);
        assert_eq!(percent(45, 30), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn report_uses_goals() {
        let stats = BoardStats {
            total_requests_granted: 15,
            weekly_stats: WeeklyStats {
                new_requests: 1,
                new_joiners: 3,
                requests_granted: 4,
            },
        };
        let report = ProgressReport::build(stats, &[], (20, 2025), &ProgressGoals::default());
        assert_eq!(report.overall.percent, 50);
        assert_eq!(report.new_requests.percent, 33);
        assert_eq!(report.new_joiners.percent, 100);
        assert_eq!(report.requests_granted.percent, 100);
        assert_eq!(report.current_week.tracker.value, 0);
        assert!(report.previous_weeks.is_empty());
    }

    #[test]
    fn previous_weeks_are_last_three_non_current() {
        let nudges = [nudge(1, 1), nudge(2, 2), nudge(3, 3), nudge(5, 5), nudge(4, 4)];
        let report = ProgressReport::build(BoardStats::default(), &nudges, (5, 2025), &ProgressGoals::default());
        assert_eq!(report.current_week.tracker.value, 5);
        assert_eq!(report.current_week.tracker.percent, 50);
        let weeks: Vec<u32> = report.previous_weeks.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![2, 3, 4]);
    }

    proptest! {
        #[test]
        fn percent_never_exceeds_100(value in 0u64..10_000, goal in 0u64..1_000) {
            prop_assert!(percent(value, goal) <= 100);
        }

        #[test]
        fn percent_is_monotonic_in_value(value in 0u64..1_000, goal in 1u64..1_000) {
            prop_assert!(percent(value, goal) <= percent(value + 1, goal));
        }
    }
}
