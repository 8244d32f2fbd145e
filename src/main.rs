use clap::{value_parser, Arg, ArgAction, Command};
use racelab::{
    run_trials, ConsistencyReport, DelayRange, FinalState, RunConfig, Runner, WorkerSpec,
};
use tracing_subscriber::EnvFilter;

/// Roster the demo falls back to, modeled on a small multi-agent pipeline.
const ROSTER: [(&str, &str); 6] = [
    ("researcher", "research the latest trends in multi-agent systems"),
    ("analyzer", "analyze the key challenges in implementing these systems"),
    ("writer", "write a summary of the main findings and recommendations"),
    ("critic", "critique the proposed approaches for potential issues"),
    ("summarizer", "summarize the key insights from the research"),
    ("validator", "validate the conclusions against best practices"),
];

fn default_roster(n: usize) -> Vec<WorkerSpec> {
    (0..n)
        .map(|i| match ROSTER.get(i) {
            Some((id, input)) => WorkerSpec::new(*id, *input),
            None => WorkerSpec::new(format!("worker-{}", i + 1), "process the assigned work item"),
        })
        .collect()
}

fn build_config(seed: u64, fast: bool) -> RunConfig {
    let config = RunConfig::default().with_seed(seed);
    if fast {
        config.with_latency(DelayRange::new(20, 80))
    } else {
        config
    }
}

fn print_final_state(state: &FinalState) {
    println!("Total time: {:.2?}", state.elapsed);
    println!("Log:");
    for (i, entry) in state.entries.iter().enumerate() {
        println!(
            "  {}. {} (recorded position {}): {}",
            i + 1,
            entry.worker_id,
            entry.recorded_position,
            entry.output
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("racelab")
        .version(racelab::VERSION)
        .about("Shared-state race condition demonstrator")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("demo")
                .about("Run one batch of workers and report final state")
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("safe")
                        .value_parser(["safe", "unsafe", "sequential"])
                        .help("Aggregate variant to run against"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .default_value("6")
                        .value_parser(value_parser!(usize))
                        .help("Number of workers to launch"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Seed for the latency schedule"),
                )
                .arg(
                    Arg::new("fast")
                        .long("fast")
                        .action(ArgAction::SetTrue)
                        .help("Shrink simulated latency for quick demos"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("trials")
                .about("Repeat unguarded runs and quantify corruption frequency")
                .arg(
                    Arg::new("trials")
                        .long("trials")
                        .default_value("20")
                        .value_parser(value_parser!(usize))
                        .help("Number of unguarded runs to execute"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Number of workers per trial"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Seed for the latency schedule"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("demo", args)) => {
            let mode = args.get_one::<String>("mode").unwrap().clone();
            let workers = *args.get_one::<usize>("workers").unwrap();
            let seed = *args.get_one::<u64>("seed").unwrap();
            let fast = args.get_flag("fast");
            let json = args.get_flag("json");

            let runner = Runner::new(build_config(seed, fast));
            let specs = default_roster(workers);

            let state = match mode.as_str() {
                "unsafe" => runner.run_unsafe(&specs).await?,
                "sequential" => runner.run_sequential(&specs).await?,
                _ => runner.run_safe(&specs).await?,
            };
            let report = ConsistencyReport::check(&state, specs.len());

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "mode": mode,
                        "final_state": state,
                        "report": report,
                    }))?
                );
            } else {
                print_final_state(&state);
                println!("{}", report.generate_text());
            }

            // Corruption under the unguarded variant is the expected
            // demonstration output, not a failure of this binary.
            if mode != "unsafe" {
                std::process::exit(i32::from(!report.passed()));
            }
        }
        Some(("trials", args)) => {
            let trials = *args.get_one::<usize>("trials").unwrap();
            let workers = *args.get_one::<usize>("workers").unwrap();
            let seed = *args.get_one::<u64>("seed").unwrap();
            let json = args.get_flag("json");

            // Trials always run with shrunk latency; the interesting timing
            // lives in the jitter windows, not the simulated call.
            let runner = Runner::new(build_config(seed, true));
            let specs = default_roster(workers);

            let report = run_trials(&runner, &specs, trials).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.generate_text());
            }
        }
        _ => {}
    }

    Ok(())
}
