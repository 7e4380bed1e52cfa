// Fri Jan 23 2026 - Alex

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use odr_checker::config::Config;
use odr_checker::output::{render_report, summary_line};
use odr_checker::scanner::Scanner;
use odr_checker::utils::logging;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "ODR violation checker for Mach-O object files", long_about = None)]
struct Args {
    /// Object files, static archives, or universal binaries to check
    files: Vec<PathBuf>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Worker thread count (defaults to the CPU count)
    #[arg(long)]
    threads: Option<usize>,

    /// Process everything on the calling thread
    #[arg(long)]
    no_parallel: bool,

    /// Emit die counts and violation totals while running
    #[arg(long)]
    show_progress: bool,

    /// Report violations as warnings and exit 0
    #[arg(long)]
    graceful_exit: bool,

    /// Category to ignore, e.g. subprogram:type (repeatable)
    #[arg(long = "ignore")]
    ignore: Vec<String>,

    /// Report only these categories (repeatable; --ignore wins)
    #[arg(long = "report-only")]
    report_only: Vec<String>,

    /// Trace every registered symbol path
    #[arg(long)]
    print_symbol_paths: bool,
}

fn build_config(args: &Args) -> Config {
    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("{} {}", "[!]".red(), error);
                std::process::exit(1);
            }
        },
        None => Config::load_or_default(Config::get_default_path()),
    };

    if args.verbose {
        config.verbose = true;
    }
    if args.no_parallel {
        config.parallel_processing = false;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if args.show_progress {
        config.show_progress = true;
    }
    if args.graceful_exit {
        config.graceful_exit = true;
    }
    if args.print_symbol_paths {
        config.print_symbol_paths = true;
    }
    config.violation_ignore.extend(args.ignore.iter().cloned());
    config
        .violation_report
        .extend(args.report_only.iter().cloned());
    config.normalize();
    config
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args);

    logging::init_logger(config.verbose);
    config.validate()?;

    if args.files.is_empty() {
        eprintln!("{} no input files", "[!]".yellow());
        return Ok(());
    }

    let start_time = Instant::now();

    let scanner = Scanner::new(config.clone());
    let reports = scanner.process(&args.files);

    let prefix = config.problem_prefix();
    for report in &reports {
        print!("{}", render_report(report, prefix));
        println!();
    }

    let elapsed = start_time.elapsed();
    let counters = scanner.counters();

    println!(
        "{} {}",
        "[+]".green(),
        summary_line(counters, scanner.unique_symbol_count())
    );
    println!(
        "{} {} file(s) checked in {:.2}s",
        "[+]".green(),
        args.files.len(),
        elapsed.as_secs_f64()
    );

    if !reports.is_empty() && !config.graceful_exit {
        std::process::exit(1);
    }

    Ok(())
}
