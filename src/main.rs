use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;

use sos_dashboard::analysis::{filter, filter_options, Dashboard, Filters};
use sos_dashboard::cache::{RefreshCache, TableSnapshot};
use sos_dashboard::config::Config;
use sos_dashboard::feed::FeedClient;
use sos_dashboard::models::Column;

struct Args {
    config_path: Option<PathBuf>,
    json: bool,
    options: Option<Column>,
    filters: Filters,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config_path: None,
        json: false,
        options: None,
        filters: Filters::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--options" => {
                let column = args.next().context("--options needs a column name")?;
                parsed.options = Some(column.parse()?);
            }
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--filter" => {
                let pair = args.next().context("--filter needs column=value")?;
                let (column, value) = pair
                    .split_once('=')
                    .with_context(|| format!("bad filter {:?}, expected column=value", pair))?;
                let column: Column = column.trim().parse()?;
                parsed.filters.accept(column, value.trim());
            }
            other => bail!("unknown argument {:?}", other),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let client = FeedClient::new(&config)?;
    tracing::debug!("Using feed {}", client.url());
    let cache = RefreshCache::new(client, config.cache_ttl());

    let table = match cache.get_table().await {
        TableSnapshot::Ready { table, fetched_at } => {
            tracing::debug!("Table fetched at {}", fetched_at);
            table
        }
        TableSnapshot::Unavailable { error, stale } => {
            eprintln!("SOS data unavailable: {}", error);
            if let Some(stale) = stale {
                eprintln!("(a previous table with {} cases was discarded)", stale.len());
            }
            std::process::exit(if error.is_fetch_failure() { 2 } else { 1 });
        }
    };

    if let Some(column) = &args.options {
        for value in filter_options(&table, column) {
            println!("{}", value);
        }
        return Ok(());
    }

    let filtered = filter(&table, &args.filters);
    let dashboard = Dashboard::build(&filtered, Utc::now(), config.recent_days);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("Total records after filter: {} cases\n", filtered.len());
        print!("{dashboard}");
    }

    Ok(())
}
