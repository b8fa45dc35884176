//! `grindcount` command-line runner
//!
//! `run` fetches the channel, updates the saved totals and publishes them;
//! `show` prints the saved totals.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use grind_adapters::{
    run_pipeline, CsvSnapshot, PipelineOptions, ReportSink, SheetsSink, SlackSource,
    SnapshotStore,
};
use grind_core::{ReportOrder, ReportTable};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::{secret, GrindConfig, ENV_SHEETS_TOKEN, ENV_SLACK_TOKEN};

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to TOML config (default: ./grindcount.toml if present)");

    Command::new("grindcount")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tally channel posts and mentions into a shared table")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Fetch the channel, update totals, save and publish")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("no-publish")
                        .long("no-publish")
                        .action(ArgAction::SetTrue)
                        .help("Save the snapshot but skip the spreadsheet"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Aggregate and print only; write nothing"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print the saved totals without contacting any service")
                .arg(config_arg)
                .arg(
                    Arg::new("stored-order")
                        .long("stored-order")
                        .action(ArgAction::SetTrue)
                        .help("Keep snapshot row order instead of sorting by total"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> anyhow::Result<GrindConfig> {
    let path = args.get_one::<PathBuf>("config");
    GrindConfig::load(path.map(PathBuf::as_path)).context("loading configuration")
}

async fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let dry_run = args.get_flag("dry-run");

    let source = SlackSource::new(secret(ENV_SLACK_TOKEN)?, &config.channel_name)
        .with_history_limit(config.history_limit);
    let snapshot = CsvSnapshot::new(&config.snapshot_path);

    let publish = config.publish && !args.get_flag("no-publish") && !dry_run;
    let sink = match (&config.spreadsheet_id, publish) {
        (Some(id), true) => Some(SheetsSink::new(secret(ENV_SHEETS_TOKEN)?, id, &config.worksheet)),
        (None, true) => {
            tracing::warn!("No spreadsheet_id configured; publishing disabled");
            None
        }
        (_, false) => None,
    };

    let options = if dry_run {
        PipelineOptions::dry_run()
    } else {
        PipelineOptions::new().with_publish(publish)
    };
    let options = options.with_order(config.report_order());

    let report = run_pipeline(
        &source,
        &snapshot,
        sink.as_ref().map(|s| s as &dyn ReportSink),
        options,
    )
    .await
    .context("aggregation run failed; saved totals were not modified")?;

    print!("{}", report.table.to_text());
    tracing::info!(
        "Done: {} new messages, {} already counted, saved={}, published={}",
        report.summary.processed,
        report.summary.skipped,
        report.persisted,
        report.published
    );
    Ok(())
}

async fn show(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let snapshot = CsvSnapshot::new(&config.snapshot_path);
    let order = if args.get_flag("stored-order") {
        ReportOrder::Stored
    } else {
        config.report_order()
    };

    match snapshot
        .load()
        .await
        .with_context(|| format!("reading {}", config.snapshot_path.display()))?
    {
        Some(store) => print!("{}", ReportTable::from_store(&store, order).to_text()),
        None => println!("No totals saved yet at {}", config.snapshot_path.display()),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let matches = cli().get_matches();

    let result = match matches.subcommand() {
        Some(("run", args)) => run(args).await,
        Some(("show", args)) => show(args).await,
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
