use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use corpus_split::config::{
    parse_split_count, shard_path, vocab_path, DATA_DIR_VAR, DEFAULT_SUFFIX, SPLIT_COUNT_VAR,
};
use corpus_split::{collect_inputs, plan_splits, PartitionReport, Partitioner, SplitConfig};
use env_logger::Env;
use log::{debug, info};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Consolidate a directory of text files into training shards and a character vocabulary",
    long_about = "Without a subcommand the run is configured purely from the DATA_DIR and \
                  NUMBER_OF_FILES_SPLIT environment variables (a .env file in the working \
                  directory is loaded first)."
)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write train_data_<i>.txt shards and vocab.txt
    Split(SplitArgs),
    /// Show which input lands in which shard without writing anything
    Plan(PlanArgs),
    /// Print the discovered input files
    List(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Directory holding the input files
    #[arg(long, value_name = "DIR", env = DATA_DIR_VAR)]
    data_dir: PathBuf,

    /// Only files whose name ends with this suffix are inputs
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Follow symlinked directories when descending
    #[arg(long)]
    follow_symlinks: bool,

    /// Keep directory enumeration order instead of sorting by name
    #[arg(long)]
    unsorted: bool,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Number of shards to write
    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        env = SPLIT_COUNT_VAR,
        value_parser = parse_split_count
    )]
    splits: usize,

    /// Write outputs here instead of the data directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Number of shards to plan for
    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        env = SPLIT_COUNT_VAR,
        value_parser = parse_split_count
    )]
    splits: usize,

    /// Emit the plan as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    if let Ok(path) = dotenv {
        debug!("loaded environment from {}", path.display());
    }

    match cli.command {
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Plan(args)) => run_plan(args),
        Some(Commands::List(args)) => run_list(args),
        None => run_from_env(),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn input_config(input: &InputArgs, split_count: usize) -> corpus_split::SplitBuilder {
    SplitConfig::builder(&input.data_dir)
        .split_count(split_count)
        .suffix(input.suffix.clone())
        .recursive(input.recursive)
        .follow_symlinks(input.follow_symlinks)
        .sort_inputs(!input.unsorted)
}

fn run_from_env() -> Result<()> {
    let cfg = SplitConfig::from_env().with_context(|| {
        format!("set {DATA_DIR_VAR} and {SPLIT_COUNT_VAR} or pass a subcommand (see --help)")
    })?;
    let report = execute(cfg)?;
    print_summary(&report);
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    let mut builder = input_config(&args.input, args.splits).show_progress(!args.no_progress);
    if let Some(dir) = &args.output_dir {
        builder = builder.output_dir(dir);
    }
    let cfg = builder.build()?;
    let report = execute(cfg)?;
    if args.json {
        println!("{}", report.to_json(args.pretty)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn execute(cfg: SplitConfig) -> Result<PartitionReport> {
    let data_dir = cfg.data_dir.clone();
    let artifacts = Partitioner::new(cfg)
        .run()
        .with_context(|| format!("failed to split corpus in {}", data_dir.display()))?;
    let report = artifacts.report;
    info!(
        "split complete: shards={} lines={} vocab={} duration={:.2?}",
        report.splits.len(),
        report.total_lines(),
        report.vocab_size,
        report.total_duration
    );
    Ok(report)
}

fn print_summary(report: &PartitionReport) {
    for split in &report.splits {
        println!(
            "{}: {} files, {} lines, {} bytes",
            split.output.display(),
            split.files,
            split.lines,
            split.bytes
        );
    }
    println!(
        "{}: {} characters",
        report.vocab_path.display(),
        report.vocab_size
    );
    if !report.unassigned.is_empty() {
        println!(
            "{} of {} input files were not assigned to any shard",
            report.unassigned.len(),
            report.input_files
        );
    }
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let cfg = input_config(&args.input, args.splits).build()?;
    let files = collect_inputs(&cfg)
        .with_context(|| format!("failed to list {}", cfg.data_dir.display()))?;
    let plan = plan_splits(&files, cfg.split_count);

    if args.json {
        let splits: Vec<_> = plan
            .splits
            .iter()
            .enumerate()
            .map(|(index, group)| {
                json!({
                    "output": shard_path(&cfg.output_dir, index),
                    "files": group,
                })
            })
            .collect();
        let value = json!({
            "per_split_size": plan.per_split_size,
            "splits": splits,
            "unassigned": plan.unassigned,
            "vocab": vocab_path(&cfg.output_dir),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} inputs, {} shards, {} files per shard",
        files.len(),
        plan.splits.len(),
        plan.per_split_size
    );
    for (index, group) in plan.splits.iter().enumerate() {
        println!("{}", shard_path(&cfg.output_dir, index).display());
        for file in group {
            println!("  {}", file.display());
        }
    }
    if !plan.unassigned.is_empty() {
        println!("unassigned");
        for file in &plan.unassigned {
            println!("  {}", file.display());
        }
    }
    Ok(())
}

fn run_list(args: InputArgs) -> Result<()> {
    let cfg = input_config(&args, 0).build()?;
    let files = collect_inputs(&cfg)
        .with_context(|| format!("failed to list {}", cfg.data_dir.display()))?;
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}
