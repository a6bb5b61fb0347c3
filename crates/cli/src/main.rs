use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckrec_core::catalog::{CardCatalog, ClashApiClient};
use deckrec_core::diagnostics::Diagnostics;
use deckrec_core::domain::deck::{AiRequest, BaselineRequest};
use deckrec_core::recommend::Recommender;

#[derive(Debug, Parser)]
#[command(name = "deckrec_cli")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a deck from the fixed loadout table.
    Recommend(Selection),

    /// Ask the configured language model for a deck plus coaching notes.
    RecommendAi {
        #[command(flatten)]
        selection: Selection,

        #[arg(long)]
        favorite_card: Option<String>,

        #[arg(long)]
        hate_card: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Fetch the card catalog and print configuration diagnostics.
    Debug,
}

#[derive(Debug, Args)]
struct Selection {
    /// One of <2000, 2000-4000, 4000-6000, >6000.
    #[arg(long)]
    bracket: String,

    /// attack, defense or balance.
    #[arg(long)]
    style: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_path = dotenvy::dotenv().ok();

    let settings = deckrec_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let cli = Cli::parse();

    let source = ClashApiClient::from_settings(&settings)?;
    let catalog = CardCatalog::load(&source).await;
    let llm = deckrec_core::llm::backend_from_settings(&settings)?;
    let recommender = Recommender::new(Arc::new(catalog), llm);

    let output = match cli.command {
        Command::Recommend(selection) => {
            let req = BaselineRequest {
                bracket: selection.bracket,
                style: selection.style,
            };
            serde_json::to_value(recommender.recommend(&req)?)?
        }
        Command::RecommendAi {
            selection,
            favorite_card,
            hate_card,
            notes,
        } => {
            let req = AiRequest {
                bracket: selection.bracket,
                style: selection.style,
                favorite_card,
                hate_card,
                notes,
            };
            match recommender.recommend_ai(&req).await {
                Ok(rec) => serde_json::to_value(rec)?,
                Err(err) => {
                    let err = anyhow::Error::new(err);
                    sentry_anyhow::capture_anyhow(&err);
                    return Err(err).context("AI recommendation failed");
                }
            }
        }
        Command::Debug => serde_json::to_value(Diagnostics::collect(
            &settings,
            &recommender,
            env_path.as_deref(),
        ))?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_sentry(settings: &deckrec_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
