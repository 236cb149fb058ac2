use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use geodata::{CollectionKind, DirectorySource, GeoDataSource, admin_at};
use quiz::QuizModeCatalog;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use scores::{JsonFileScoreStore, format_time_mmss, load_best};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod render;
mod session;

#[derive(Debug, Parser)]
#[command(name = "swissorient", about = "Explore the Swiss cantons, districts and communities, or quiz yourself on them")]
struct Cli {
    /// Directory holding cantons.geojson, districts.geojson and communities.geojson.
    #[arg(long, env = "SWISSORIENT_DATA", default_value = "public/geo")]
    data_dir: PathBuf,

    /// JSON file keeping the best result per quiz mode.
    #[arg(long, env = "SWISSORIENT_SCORES", default_value = "swissorient-scores.json")]
    scores: PathBuf,

    /// Fixed seed for the target order.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Walk the hierarchy interactively.
    Explore,
    /// List the available quiz modes.
    Modes,
    /// Play a quiz mode.
    Quiz { mode_id: String },
    /// Show the stored best result of a mode.
    Best { mode_id: String },
    /// Name the canton, district and community at a position.
    Locate {
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(data_dir = %cli.data_dir.display(), "swissorient starting");
    let source = Arc::new(DirectorySource::new(&cli.data_dir));

    match cli.command {
        Command::Explore => session::explore(source).await?,
        Command::Modes => {
            let catalog = Arc::new(QuizModeCatalog::new(source));
            let listed = catalog.clone();
            tokio::task::spawn_blocking(move || listed.modes().len()).await?;
            let store = JsonFileScoreStore::open(&cli.scores)?;
            for mode in catalog.modes() {
                println!("{}", render::mode_line(mode, load_best(&store, &mode.id)));
            }
        }
        Command::Quiz { mode_id } => {
            let catalog = Arc::new(QuizModeCatalog::new(source.clone()));
            let lookup = catalog.clone();
            let wanted = mode_id.clone();
            let mode = tokio::task::spawn_blocking(move || lookup.mode(&wanted).cloned())
                .await?
                .ok_or_else(|| format!("unknown quiz mode {mode_id}"))?;
            let rng = match cli.seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            let mut store = JsonFileScoreStore::open(&cli.scores)?;
            session::quiz(source, mode, rng, &mut store).await?;
        }
        Command::Best { mode_id } => {
            let store = JsonFileScoreStore::open(&cli.scores)?;
            match load_best(&store, &mode_id) {
                Some(best) => println!(
                    "{mode_id}: {}% in {}",
                    best.percent,
                    format_time_mmss(best.time_sec)
                ),
                None => println!("{mode_id}: no result yet"),
            }
        }
        Command::Locate { lon, lat } => {
            let fetched = tokio::task::spawn_blocking(move || {
                CollectionKind::ALL.map(|kind| match source.fetch(kind) {
                    Ok(fc) => Some(fc),
                    Err(err) => {
                        warn!(collection = %kind, error = %err, "collection unavailable");
                        None
                    }
                })
            })
            .await?;
            let [cantons, districts, communities] = &fetched;
            let found = admin_at(
                lon,
                lat,
                cantons.as_ref(),
                districts.as_ref(),
                communities.as_ref(),
            );
            println!("{}", render::lookup_lines(&found));
        }
    }
    Ok(())
}
