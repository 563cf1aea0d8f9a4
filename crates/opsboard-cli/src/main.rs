//! `opsboard` command-line front end

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use opsboard_model::{Lane, RecordId, RequestStage, ResponsiblePerson, Route};
use opsboard_store::{run_simulator, BoardState, DashboardStore, SimulatorConfig, StoreConfig, Tracker};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let data_dir = || {
        Arg::new("data-dir")
            .long("data-dir")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Directory holding one JSON document per collection")
    };
    let json = || {
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as JSON")
    };

    Command::new("opsboard")
        .version(opsboard_store::VERSION)
        .about("Operations board store")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML store configuration"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the randomized board simulator")
                .arg(
                    Arg::new("operations")
                        .long("ops")
                        .default_value("2000")
                        .value_parser(value_parser!(u64))
                        .help("Number of operations to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                ),
        )
        .subcommand(
            Command::new("board")
                .about("Print the lanes of a screen")
                .arg(data_dir())
                .arg(
                    Arg::new("route")
                        .long("route")
                        .default_value("/")
                        .help("Screen path: /, /backend, /tables or /news"),
                )
                .arg(json()),
        )
        .subcommand(
            Command::new("nudge")
                .about("Count one nudge in the current week")
                .arg(data_dir()),
        )
        .subcommand(
            Command::new("report")
                .about("Print counters and progress trackers")
                .arg(data_dir())
                .arg(json()),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<StoreConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(StoreConfig::default()),
    }
}

fn open_store(args: &ArgMatches, config: StoreConfig) -> Result<DashboardStore> {
    let dir = args
        .get_one::<PathBuf>("data-dir")
        .context("--data-dir is required")?;
    DashboardStore::open_dir(dir, config).with_context(|| format!("opening board at {}", dir.display()))
}

fn owner_names(list: &[ResponsiblePerson]) -> String {
    list.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// Display line for every item in `lane`
fn lane_entries(state: &BoardState, lane: Lane) -> Vec<(RecordId, String)> {
    match lane {
        Lane::NewRequests | Lane::RequestsInProcess | Lane::MotiusAsks | Lane::FulfilledRequests => {
            let stage = match lane {
                Lane::NewRequests => RequestStage::New,
                Lane::RequestsInProcess => RequestStage::InProcess,
                Lane::MotiusAsks => RequestStage::MotiusAsk,
                _ => RequestStage::Fulfilled,
            };
            state
                .requests(stage)
                .iter()
                .map(|r| {
                    let owners = owner_names(&r.responsible_persons);
                    let label = if owners.is_empty() {
                        format!("{} ({})", r.request_text, r.person_name)
                    } else {
                        format!("{} ({}) [{}]", r.request_text, r.person_name, owners)
                    };
                    (r.id.clone(), label)
                })
                .collect()
        }
        Lane::FulfillRequests => state
            .fulfill_requests
            .iter()
            .map(|f| {
                let mark = if f.is_completed { "x" } else { " " };
                (f.id.clone(), format!("[{mark}] {} ({})", f.request_text, f.name))
            })
            .collect(),
        Lane::NewJoiners | Lane::RecentJoiners => {
            let joiners = if lane == Lane::NewJoiners {
                &state.new_joiners
            } else {
                &state.recent_joiners
            };
            joiners
                .iter()
                .map(|j| {
                    let flags = format!(
                        "app:{} mail:{}",
                        u8::from(j.is_in_app_notification_sent),
                        u8::from(j.is_email_notification_sent)
                    );
                    (j.id.clone(), format!("{} @ {} {}", j.name, j.company, flags))
                })
                .collect()
        }
        Lane::Nominations => state
            .nominations
            .iter()
            .map(|n| (n.id.clone(), format!("{} @ {}", n.name, n.company)))
            .collect(),
        Lane::Onboarding => state
            .onboarding_list
            .iter()
            .map(|c| (c.id.clone(), format!("{} @ {}", c.name, c.company)))
            .collect(),
        Lane::CustomSection => state
            .custom_section_items
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect(),
        Lane::PriorityNudging => state
            .priority_nudging_items
            .iter()
            .map(|p| {
                let label = match &p.responsible_person {
                    Some(owner) => format!("{} [{}]", p.name, owner.name),
                    None => p.name.clone(),
                };
                (p.id.clone(), label)
            })
            .collect(),
        Lane::News => state
            .news_items
            .iter()
            .map(|n| (n.id.clone(), format!("{}: {}", n.person_name, n.content)))
            .collect(),
    }
}

fn print_board(store: &DashboardStore, route_path: &str, json: bool) -> Result<()> {
    let route = Route::from_path(route_path);
    if route == Route::NotFound {
        anyhow::bail!("no screen at {route_path}");
    }

    let lanes: Vec<(Lane, Vec<(RecordId, String)>)> = store.read(|state| {
        route
            .lanes()
            .iter()
            .map(|lane| (*lane, lane_entries(state, *lane)))
            .collect()
    });

    if json {
        let value: Vec<serde_json::Value> = lanes
            .iter()
            .map(|(lane, entries)| {
                serde_json::json!({
                    "lane": lane,
                    "title": lane.title(),
                    "items": entries
                        .iter()
                        .map(|(id, label)| serde_json::json!({ "id": id, "label": label }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (lane, entries) in &lanes {
        println!("== {} ({}) ==", lane.title(), entries.len());
        for (id, label) in entries {
            println!("  {id}  {label}");
        }
        println!();
    }
    Ok(())
}

fn format_tracker(name: &str, tracker: &Tracker) -> String {
    format!("{name}: {}/{} ({}%)", tracker.value, tracker.goal, tracker.percent)
}

fn print_report(store: &DashboardStore, json: bool) -> Result<()> {
    let progress = store.progress();
    if json {
        let value = serde_json::json!({
            "stats": store.stats(),
            "progress": progress,
            "lanes": store
                .lane_counts()
                .into_iter()
                .map(|(lane, count)| (lane.title(), count))
                .collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Board Report");
    println!("============");
    println!();
    println!("{}", format_tracker("Requests granted", &progress.overall));
    println!(
        "{}",
        format_tracker(
            &format!("Nudges week {}/{}", progress.current_week.week, progress.current_week.year),
            &progress.current_week.tracker
        )
    );
    for week in &progress.previous_weeks {
        println!(
            "  {}",
            format_tracker(&format!("week {}/{}", week.week, week.year), &week.tracker)
        );
    }
    println!("{}", format_tracker("New requests this week", &progress.new_requests));
    println!("{}", format_tracker("New joiners this week", &progress.new_joiners));
    println!("{}", format_tracker("Requests granted this week", &progress.requests_granted));
    println!();
    for (lane, count) in store.lane_counts() {
        println!("{:<22} {count}", lane.title());
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let operations = args.get_one::<u64>("operations").copied().unwrap_or(2_000);
            let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
            let stop_on_violation = args.get_flag("stop-on-violation");

            tracing::info!("Simulating {} operations with seed {}", operations, seed);
            let report = run_simulator(SimulatorConfig {
                seed,
                total_operations: operations,
                seed_sample_data: config.seed_sample_data,
                stop_on_first_violation: stop_on_violation,
                ..SimulatorConfig::default()
            });
            println!("{}", report.generate_text());
            if !report.passed() {
                std::process::exit(1);
            }
        }
        Some(("board", args)) => {
            let store = open_store(args, config)?;
            let route = args.get_one::<String>("route").map_or("/", String::as_str);
            print_board(&store, route, args.get_flag("json"))?;
        }
        Some(("nudge", args)) => {
            let store = open_store(args, config)?;
            let nudge = store.add_weekly_nudge();
            let goal = store.config().goals.weekly_nudges;
            println!("Week {}/{}: {}/{} nudges", nudge.week, nudge.year, nudge.count, goal);
        }
        Some(("report", args)) => {
            let store = open_store(args, config)?;
            print_report(&store, args.get_flag("json"))?;
        }
        _ => {}
    }
    Ok(())
}
