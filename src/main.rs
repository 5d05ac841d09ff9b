use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::animation::Clock;
use crate::catalog::{Category, ItemCatalog};
use crate::feed::grid::GridSurface;
use crate::feed::{Feed, Options};
use crate::filter::Filter;

mod animation;
mod catalog;
mod feed;
mod filter;

const FRAME: Duration = Duration::from_millis(16);

const DEFAULT_CONFIG_PATH: &str = "lostfound.kdl";

const DEFAULT_FILTERS: [Filter; 3] = [
    Filter::Category(Category::Electronics),
    Filter::Category(Category::Keys),
    Filter::All,
];

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to config file (default: `lostfound.kdl` in the current
    /// directory, if it exists).
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Cycle the feed through a sequence of filters (the default command).
    Run {
        /// Filters to step through, e.g. `electronics keys all`.
        filters: Vec<String>,
    },
    /// Validate the config file and exit.
    Validate,
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Validate) => {
            info!("config is valid");
            Ok(())
        }
        Some(Command::Run { filters }) => run(&config, &filters),
        None => run(&config, &[]),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<lostfound_config::Config> {
    let path = match path {
        Some(path) => path.to_owned(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                debug!("no config file found, using the default config");
                return Ok(lostfound_config::Config::default());
            }
            default
        }
    };
    debug!("loading config from {path:?}");
    // miette reports carry the annotated snippet in their Debug output.
    lostfound_config::Config::load(&path).map_err(|err| anyhow!("{err:?}"))
}

fn run(config: &lostfound_config::Config, filters: &[String]) -> anyhow::Result<()> {
    let filters: Vec<Filter> = if filters.is_empty() {
        DEFAULT_FILTERS.to_vec()
    } else {
        filters
            .iter()
            .map(|s| s.parse())
            .collect::<Result<_, _>>()?
    };

    let catalog = ItemCatalog::from_json(include_str!("../resources/items.json"))
        .context("loading bundled items")?;
    info!("loaded {} items", catalog.len());

    let clock = Clock::new();
    let options = Rc::new(Options::from_config(config));
    let mut surface = GridSurface::new(&options.feed);
    let mut feed = Feed::new(catalog, clock.clone(), options);
    feed.mount(&mut surface);
    feed.on_batch_settled(|batch| debug!("batch {batch:?} settled"));

    print_feed(&feed);
    for filter in filters {
        info!("applying filter: {filter}");
        feed.set_filter(filter, &mut surface);
        while feed.are_animations_ongoing() {
            thread::sleep(FRAME);
            clock.advance(FRAME);
            feed.advance_animations();
        }
        print_feed(&feed);
    }

    Ok(())
}

fn print_feed(feed: &Feed) {
    if feed.is_empty() {
        println!("No items found in this category.");
        println!();
        return;
    }
    for id in feed.visible_items() {
        if let Some(item) = feed.catalog().get(id) {
            println!(
                "[{}] {} at {} ({})",
                item.status, item.title, item.location, item.time_ago
            );
        }
    }
    println!();
}
