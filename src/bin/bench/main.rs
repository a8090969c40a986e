// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Baseline Benchmark Runner
//
// Monte Carlo comparison of the random-walk baseline against BFS on seeded
// synthetic constellations.
//
// Usage:
//   cargo run --release --bin bench                     # All scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode
//   cargo run --release --bin bench -- DEGRADED         # Filter by name/label/category
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   RUST_LOG=debug cargo run --bin bench                # Per-run records

mod monte_carlo;
mod report;
mod scenarios;

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

use report::*;
use scenarios::*;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { runs: 30, seed: 0, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn write_report(report: &BenchReport) -> std::io::Result<std::path::PathBuf> {
    let dir = std::path::Path::new("benchmark-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", report.timestamp));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| {
                    s.name.to_lowercase().contains(&f_lower)
                        || s.label.to_lowercase().contains(&f_lower)
                        || s.category.to_lowercase().contains(&f_lower)
                })
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  SAGSIN PathKit baseline bench");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!(
        "  {:<32} {:>5} {:>11} {:>10} {:>11} {:>11} {:>7}",
        "Scenario", "Pass%", "Found%", "Stretch", "RWR ms", "BFS ms", "Time"
    );
    println!("  {}", "-".repeat(94));

    let suite_start = Instant::now();
    let mut reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed);
        let status = if report.pass_rate >= 0.933 { "PASS" } else { "FAIL" };

        println!(
            "  {:<32} {:>4}% {:>6.1}±{:<4.1} {:>10.2} {:>11.2} {:>11.2} {:>5.0}ms  {}",
            report.label,
            (report.pass_rate * 100.0) as u32,
            report.success_rate.mean * 100.0,
            report.success_rate.half_width() * 100.0,
            report.stretch.mean,
            report.rwr_latency_ms.mean,
            report.bfs_latency_ms.mean,
            report.elapsed_ms.mean,
            status,
        );

        reports.push(report);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.pass_rate >= 0.933).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(94));
    println!(
        "  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total,
        passed,
        failed,
        suite_start.elapsed().as_secs_f64()
    );

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string();

    let report = BenchReport {
        timestamp,
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: reports,
    };

    match write_report(&report) {
        Ok(path) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => {
            tracing::error!(error = %e, "failed to write benchmark report");
            std::process::exit(2);
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
