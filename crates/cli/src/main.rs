//! Trace-driven replay harness for the prefetcher selection engine.
//!
//! Loads a memory-access trace, drives [`l2pf_core::Engine::operate`] over
//! every line with a minimal stand-in host simulator, and prints a
//! per-heuristic utility summary at the end. This is a demonstration/test
//! harness, not a replacement for the real DPC2/ChampSim-style host the
//! `l2pf-abi` crate integrates with.

mod host;
mod trace;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use l2pf_core::{Engine, EngineConfig, HeuristicId, HostKnobs};
use tracing_subscriber::EnvFilter;

use host::TraceHost;

#[derive(Parser, Debug)]
#[command(
    name = "l2pf-sim",
    author,
    version,
    about = "Trace-driven L2 prefetcher selection engine harness",
    long_about = "Replays a memory-access trace through the online prefetcher selection \
                  engine and reports which heuristic was promoted active and how \
                  effective each one was.\n\nExamples:\n  \
                  l2pf-sim run traces/gcc.trace\n  \
                  l2pf-sim run traces/gcc.trace --period 512 --seed 7"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace file through the engine.
    Run {
        /// Trace file: one `addr ip cache_hit` triple per line.
        trace: PathBuf,

        /// PRNG seed for the sandbox false-positive test and the initial
        /// active heuristic.
        #[arg(long)]
        seed: Option<u64>,

        /// Evaluation period length, in accesses (default: 256).
        #[arg(long)]
        period: Option<u32>,

        /// Assumed prefetch latency, in accesses, for the harness's
        /// stand-in MSHR occupancy model.
        #[arg(long, default_value_t = 16)]
        prefetch_latency: u64,

        /// CPU number passed through to the engine and its logs.
        #[arg(long, default_value_t = 0)]
        cpu: i32,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { trace, seed, period, prefetch_latency, cpu } => {
            run(&trace, seed, period, prefetch_latency, cpu);
        }
    }
}

fn run(trace_path: &Path, seed: Option<u64>, period: Option<u32>, prefetch_latency: u64, cpu: i32) {
    let accesses = trace::load(trace_path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(1);
    });

    let mut config = EngineConfig::default();
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(period) = period {
        config.period = period;
    }

    let mut sim_host = TraceHost::new(prefetch_latency, HostKnobs::default());
    let mut engine = Engine::new(cpu, config, &sim_host);

    println!("replaying {} accesses from {}", accesses.len(), trace_path.display());
    println!("  period={} seed={:#x} prefetch_latency={prefetch_latency}", config.period, config.seed);
    println!();

    for access in accesses {
        sim_host.advance();
        if let Err(err) = engine.operate(access.addr, access.ip, access.cache_hit, &mut sim_host) {
            eprintln!("\n[!] fatal prefetcher error at cycle {}: {err}", sim_host.cycle());
            process::exit(1);
        }
    }

    print_summary(&engine, &sim_host);
}

fn print_summary(engine: &Engine, sim_host: &TraceHost) {
    println!("final active heuristic: {}", engine.active_heuristic());
    println!("total prefetches issued: {}", sim_host.total_issued);
    println!();
    println!("{:<10} {:>10} {:>10} {:>10} {:>10}", "heuristic", "issued", "used", "accuracy", "periods won");
    for id in HeuristicId::ALL {
        let utility = engine.stats().utility(id);
        println!(
            "{:<10} {:>10} {:>10} {:>9.1}% {:>11}",
            id.to_string(),
            utility.prefetches_issued,
            utility.prefetches_used,
            engine.stats().accuracy(id) * 100.0,
            utility.periods_active,
        );
    }
}
