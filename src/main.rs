use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cinematch::{
    api::{create_router, AppState},
    config::Config,
    services::{ingest, model::Model, normalizer, providers::TmdbProvider},
    storage::ModelStore,
};

/// Content-based movie recommendations
#[derive(Parser, Debug)]
#[command(name = "cinematch")]
#[command(about = "Build and serve a content-based movie recommender", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the model from the TMDB CSV exports and save it to MODEL_DIR
    Build {
        /// Path to the movies CSV
        #[arg(long)]
        movies: PathBuf,

        /// Path to the credits CSV
        #[arg(long)]
        credits: PathBuf,
    },
    /// Load the model from MODEL_DIR and serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Build { movies, credits } => build(&config, movies, credits).await,
        Command::Serve => serve(config).await,
    }
}

async fn build(config: &Config, movies: PathBuf, credits: PathBuf) -> anyhow::Result<()> {
    let store = ModelStore::new(&config.model_dir);

    // The build is CPU bound and single threaded
    let model = tokio::task::spawn_blocking(move || -> anyhow::Result<Model> {
        let records = ingest::read_catalog(&movies, &credits)?;
        let corpus = normalizer::normalize(records);
        Ok(Model::build(corpus)?)
    })
    .await??;

    store.save(&model)?;
    tracing::info!(movies = model.len(), dir = %store.dir().display(), "Build complete");
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let api_key = config.require_tmdb_api_key()?;
    let store = ModelStore::new(&config.model_dir);

    let load_store = store.clone();
    let model = tokio::task::spawn_blocking(move || load_store.load())
        .await?
        .with_context(|| format!("Failed to load model from {}", config.model_dir.display()))?;

    let posters = TmdbProvider::new(api_key, config.tmdb_api_url.clone(), config.tmdb_timeout())?;
    let state = AppState::new(model, store, Arc::new(posters));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
