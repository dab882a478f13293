// Slotted ALOHA simulation runner.
//
// Usage:
//   cargo run --release --bin sim                        # one run, defaults
//   cargo run --release --bin sim -- -N 50 -p 0.02       # custom load
//   cargo run --release --bin sim -- --runs 5            # 5 seeded trials
//   cargo run --release --bin sim -- --sweep 0.01,0.05   # probability sweep
//   cargo run --release --bin sim -- --json              # machine output
//   cargo run --release --bin sim -- --trace run.jsonl   # per-slot trace

mod report;
mod sweep;
mod trace;

use aloha_engine::{SimConfig, SlotOutcome, SlotSimulator, Termination};

use report::{RunRecord, TrialReport};
use trace::{SlotSnapshot, TraceRecorder};

// ─── CLI parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    cfg: SimConfig,
    seed: u64,
    runs: usize,
    sweep: Option<Vec<f64>>,
    json: bool,
    trace: Option<std::path::PathBuf>,
}

fn usage() -> ! {
    eprintln!(
        "Usage: sim [options]\n\
         \x20 -N, --nodes <n>       population size (default 24)\n\
         \x20 -W, --cw <w>          initial contention window (default 2)\n\
         \x20 -p, --prob <p>        packet-generation probability (default 0.5)\n\
         \x20 -M, --packets <m>     delivery target (default 400)\n\
         \x20 -r, --retries <r>     retry budget per packet (default 100)\n\
         \x20     --seed <s>        base PRNG seed (default 0)\n\
         \x20     --runs <n>        seeded trials to aggregate (default 1)\n\
         \x20     --sweep <p1,p2>   sweep generation probabilities\n\
         \x20     --json            machine-readable output on stdout\n\
         \x20     --trace <file>    per-slot JSONL trace (single run only)"
    );
    std::process::exit(1);
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => {
            eprintln!("Error: {} requires a value", flag);
            usage();
        }
    }
}

fn parse_or_usage<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Error: invalid value for {}: {}", flag, value);
            usage();
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        cfg: SimConfig::default(),
        seed: 0,
        runs: 1,
        sweep: None,
        json: false,
        trace: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-N" | "--nodes" => {
                cli.cfg.population = parse_or_usage(take_value(&args, &mut i, "-N"), "-N");
            }
            "-W" | "--cw" => {
                cli.cfg.initial_cw = parse_or_usage(take_value(&args, &mut i, "-W"), "-W");
            }
            "-p" | "--prob" => {
                cli.cfg.gen_prob = parse_or_usage(take_value(&args, &mut i, "-p"), "-p");
            }
            "-M" | "--packets" => {
                cli.cfg.target_packets = parse_or_usage(take_value(&args, &mut i, "-M"), "-M");
            }
            "-r" | "--retries" => {
                cli.cfg.max_retries = parse_or_usage(take_value(&args, &mut i, "-r"), "-r");
            }
            "--seed" => {
                cli.seed = parse_or_usage(take_value(&args, &mut i, "--seed"), "--seed");
            }
            "--runs" => {
                cli.runs = parse_or_usage(take_value(&args, &mut i, "--runs"), "--runs");
            }
            "--sweep" => {
                let list = take_value(&args, &mut i, "--sweep");
                let probs: Vec<f64> = list
                    .split(',')
                    .map(|s| parse_or_usage(s.trim(), "--sweep"))
                    .collect();
                if probs.is_empty() {
                    usage();
                }
                cli.sweep = Some(probs);
            }
            "--json" => {
                cli.json = true;
            }
            "--trace" => {
                cli.trace = Some(take_value(&args, &mut i, "--trace").into());
            }
            "-h" | "--help" => usage(),
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
        i += 1;
    }

    cli
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to serialize report: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_run(record: &RunRecord) {
    println!(
        "\n  N: {}  W: {}  p: {:.3}  M: {}  retries: {}  seed: {}\n",
        record.nodes,
        record.initial_cw,
        record.gen_prob,
        record.target_packets,
        record.max_retries,
        record.seed
    );
    println!("  slots:        {}", record.slots);
    println!("  delivered:    {}", record.delivered);
    println!("  utilization:  {:.4}", record.utilization);
    match record.avg_delay {
        Some(delay) => println!("  avg delay:    {:.2}", delay),
        None => println!("  avg delay:    n/a (nothing delivered)"),
    }
    if let Some(node) = record.exhausted_node {
        println!("\n  aborted: node {} exhausted its retry budget", node);
    }
    println!();
}

fn print_trial_header() {
    println!(
        "\n  {:>8} {:>6} {:>16} {:>16} {:>10} {:>7}",
        "p", "runs", "utilization", "avg delay", "slots", "aborts"
    );
    println!("  {}", "-".repeat(68));
}

fn print_trial_row(point: &TrialReport) {
    let util_ci = (point.utilization.ci_upper - point.utilization.ci_lower) / 2.0;
    let delay_ci = (point.avg_delay.ci_upper - point.avg_delay.ci_lower) / 2.0;
    println!(
        "  {:>8.3} {:>6} {:>10.4}±{:<5.4} {:>10.2}±{:<5.2} {:>10.0} {:>7}",
        point.gen_prob,
        point.n_runs,
        point.utilization.mean,
        util_ci,
        point.avg_delay.mean,
        delay_ci,
        point.slots.mean,
        point.abort_count
    );
}

// ─── Run modes ──────────────────────────────────────────────────────────────

/// One seeded run, optionally recording a per-slot trace.
fn run_single(cli: &CliArgs) -> i32 {
    let mut sim = SlotSimulator::from_seed(cli.cfg, cli.seed);
    let mut recorder = cli.trace.as_ref().map(|_| TraceRecorder::new());

    let report = loop {
        let outcome = sim.run_slot();
        if let Some(rec) = recorder.as_mut() {
            rec.record(SlotSnapshot::new(
                sim.slot(),
                &outcome,
                sim.delivered(),
                sim.cumulative_delay(),
            ));
        }
        if let SlotOutcome::Collision {
            exhausted: Some(node),
            ..
        } = outcome
        {
            break sim.report(Termination::RetriesExhausted { node });
        }
        if sim.delivered() >= cli.cfg.target_packets {
            break sim.report(Termination::TargetReached);
        }
    };

    if let (Some(rec), Some(path)) = (&recorder, &cli.trace) {
        if let Err(e) = rec.write_jsonl(path) {
            eprintln!("Warning: failed to write trace {}: {}", path.display(), e);
        } else {
            eprintln!("  trace: {} slots -> {}", rec.len(), path.display());
        }
    }

    let record = RunRecord::new(&cli.cfg, cli.seed, &report);
    if cli.json {
        print_json(&record);
    } else {
        print_run(&record);
    }

    if report.termination.is_abort() {
        2
    } else {
        0
    }
}

fn run_trials_mode(cli: &CliArgs) -> i32 {
    let trial = sweep::run_trials(&cli.cfg, cli.runs, cli.seed);
    if cli.json {
        print_json(&trial);
    } else {
        println!(
            "\n  N: {}  W: {}  M: {}  retries: {}  base seed: {}",
            cli.cfg.population,
            cli.cfg.initial_cw,
            cli.cfg.target_packets,
            cli.cfg.max_retries,
            cli.seed
        );
        print_trial_header();
        print_trial_row(&trial);
        println!();
    }
    if trial.all_aborted() {
        2
    } else {
        0
    }
}

fn run_sweep_mode(cli: &CliArgs, probs: &[f64]) -> i32 {
    let sweep = sweep::run_sweep(&cli.cfg, probs, cli.runs, cli.seed);
    if cli.json {
        print_json(&sweep);
    } else {
        println!(
            "\n  N: {}  W: {}  M: {}  retries: {}  runs/point: {}  base seed: {}",
            sweep.nodes,
            sweep.initial_cw,
            sweep.target_packets,
            sweep.max_retries,
            sweep.runs_per_point,
            sweep.base_seed
        );
        print_trial_header();
        for point in &sweep.points {
            print_trial_row(point);
        }
        println!();
    }
    if sweep.points.iter().all(|p| p.all_aborted()) {
        2
    } else {
        0
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();

    if let Err(e) = cli.cfg.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if let Some(probs) = &cli.sweep {
        for &p in probs {
            let cfg = SimConfig {
                gen_prob: p,
                ..cli.cfg
            };
            if let Err(e) = cfg.validate() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
    if cli.runs == 0 {
        eprintln!("Error: --runs must be at least 1");
        std::process::exit(1);
    }
    if cli.trace.is_some() && (cli.runs > 1 || cli.sweep.is_some()) {
        eprintln!("Error: --trace only applies to a single run");
        std::process::exit(1);
    }

    let code = match &cli.sweep {
        Some(probs) => run_sweep_mode(&cli, probs),
        None if cli.runs > 1 => run_trials_mode(&cli),
        None => run_single(&cli),
    };

    std::process::exit(code);
}
