//! review-desk: run bulk review actions against a seeded demo collection

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod demo;
mod report;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use desk_batch::{BatchEngine, BatchKind, BatchOptions};
use desk_core::{DeskConfig, ReviewSession, Screen};
use desk_ledger::CreditLedger;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let common = [
        Arg::new("config")
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .help("TOML configuration file"),
        Arg::new("items")
            .long("items")
            .default_value("40")
            .value_parser(value_parser!(usize))
            .help("Number of demo assets to seed"),
        Arg::new("credits")
            .long("credits")
            .value_parser(value_parser!(u64))
            .help("Credit balance (overrides initial_credits)"),
        Arg::new("kind")
            .long("kind")
            .default_value("check")
            .value_parser(["check", "approve", "reject"])
            .help("Bulk action to run"),
        Arg::new("reason")
            .long("reason")
            .help("Rejection reason (required with --kind reject)"),
        Arg::new("fail-every")
            .long("fail-every")
            .value_parser(value_parser!(u64))
            .help("Make roughly one in N checks fail"),
        Arg::new("queue")
            .long("queue")
            .action(ArgAction::SetTrue)
            .help("Act on the approval queue instead of the asset list"),
        Arg::new("exclude")
            .long("exclude")
            .action(ArgAction::Append)
            .help("Deselect an id after selecting everything (repeatable)"),
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as JSON"),
    ];

    Command::new("review-desk")
        .version(desk_core::VERSION)
        .about("Bulk review actions over a creative asset collection")
        .subcommand_required(true)
        .subcommand(
            Command::new("simulate")
                .about("Select every matching asset and run a bulk action")
                .args(common.clone()),
        )
        .subcommand(
            Command::new("plan")
                .about("Preview admission for a bulk action without running it")
                .args(common),
        )
}

/// Options shared by both subcommands
#[derive(Debug, Clone)]
struct Options {
    config: Option<PathBuf>,
    items: usize,
    credits: Option<u64>,
    kind: BatchKind,
    reason: Option<String>,
    fail_every: Option<u64>,
    screen: Screen,
    exclude: Vec<String>,
    json: bool,
}

impl Options {
    fn from_matches(args: &ArgMatches) -> Self {
        let kind = match args.get_one::<String>("kind").map(String::as_str) {
            Some("approve") => BatchKind::Approve,
            Some("reject") => BatchKind::Reject,
            _ => BatchKind::RunCheck,
        };
        Self {
            config: args.get_one::<PathBuf>("config").cloned(),
            items: args.get_one::<usize>("items").copied().unwrap_or(40),
            credits: args.get_one::<u64>("credits").copied(),
            kind,
            reason: args.get_one::<String>("reason").cloned(),
            fail_every: args.get_one::<u64>("fail-every").copied(),
            screen: if args.get_flag("queue") {
                Screen::ApprovalQueue
            } else {
                Screen::AssetList
            },
            exclude: args
                .get_many::<String>("exclude")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            json: args.get_flag("json"),
        }
    }

    fn batch_options(&self) -> BatchOptions {
        match &self.reason {
            Some(reason) => BatchOptions::default().with_reason(reason.clone()),
            None => BatchOptions::default(),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<DeskConfig> {
    match path {
        Some(path) => DeskConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DeskConfig::default()),
    }
}

fn init_tracing(config: &DeskConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Seed the demo collection and open a session with everything selected
fn open_session(
    opts: &Options,
    config: &DeskConfig,
) -> Result<(ReviewSession, Arc<CreditLedger>)> {
    let collection =
        Arc::new(demo::seed_collection(opts.items).context("seeding demo collection")?);
    let ledger = Arc::new(CreditLedger::new(
        opts.credits.unwrap_or(config.initial_credits),
    ));
    let engine = BatchEngine::for_collection(
        collection.clone(),
        ledger.clone(),
        Arc::new(demo::DemoOracle::new(opts.fail_every)),
    )
    .with_config(config.engine.clone());

    let mut session = ReviewSession::new(opts.screen, collection, Arc::new(engine), config);
    session.select_all_matching();
    for id in &opts.exclude {
        session.select(id.as_str(), false);
    }
    Ok((session, ledger))
}

async fn simulate(opts: &Options, config: &DeskConfig) -> Result<String> {
    let (mut session, ledger) = open_session(opts, config)?;
    tracing::info!(
        selected = session.selection_count(),
        kind = %opts.kind,
        "simulating bulk action"
    );

    let options = opts.batch_options();
    let cancel = options.cancel_token().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received; cancelling remaining items");
            cancel.cancel();
        }
    });

    let run = session.run_bulk(opts.kind, options).await;
    interrupt.abort();
    let run = run.context("bulk action rejected")?;
    report::render_run(&run, &ledger, opts.json)
}

fn plan(opts: &Options, config: &DeskConfig) -> Result<String> {
    let (session, _) = open_session(opts, config)?;
    let plan = session
        .plan_bulk(opts.kind, &opts.batch_options())
        .context("bulk action would be rejected")?;
    report::render_plan(&plan, opts.json)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let Some((name, args)) = matches.subcommand() else {
        anyhow::bail!("no subcommand given");
    };

    let opts = Options::from_matches(args);
    let config = load_config(opts.config.as_ref())?;
    init_tracing(&config);

    let output = match name {
        "simulate" => simulate(&opts, &config).await?,
        "plan" => plan(&opts, &config)?,
        other => anyhow::bail!("unknown subcommand: {other}"),
    };
    println!("{output}");
    Ok(())
}
