use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use syndicate_content::{ContentProvider, LlmContentProvider, OfflineContentProvider};
use syndicate_control::Session;
use syndicate_world::{build_initial_state, load_constants, load_state};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

#[derive(Parser)]
#[command(name = "syndicate_daemon", about = "HTTP front end for the syndicate game")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Generate the city with this seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Resume from a saved GameState JSON file. Mutually exclusive with --seed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,
    /// Use the LLM provider configured through LLM_API_KEY / LLM_API_URL / LLM_MODEL.
    #[arg(long)]
    llm: bool,
    /// Per-call budget for end-of-day content, in seconds. The desk refuses
    /// every command until the day commits, so there is always a limit.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    content_timeout: u64,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn open_session(args: &Args) -> Result<(Session, ChaCha8Rng)> {
    let constants = load_constants(&args.content_dir)?;

    let (game, rng) = if let Some(path) = &args.state_file {
        let loaded = load_state(path)?;
        let rng_seed = loaded.meta.seed.wrapping_add(u64::from(loaded.day));
        (loaded, ChaCha8Rng::seed_from_u64(rng_seed))
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let game = build_initial_state(&constants, seed, &mut rng);
        (game, rng)
    };

    let timeout = Duration::from_secs(args.content_timeout);
    Ok((Session::new(game, constants).with_content_timeout(Some(timeout)), rng))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let (session, rng) = open_session(&args)?;
    let provider: Arc<dyn ContentProvider> = if args.llm {
        Arc::new(LlmContentProvider::from_env().context("configuring the LLM provider")?)
    } else {
        Arc::new(OfflineContentProvider::new())
    };
    let cors_origin: HeaderValue = args
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin {}", args.cors_origin))?;

    tracing::info!(
        seed = session.state().meta.seed,
        day = session.state().day,
        llm = args.llm,
        "syndicate daemon starting"
    );

    let app_state = AppState::new(session, rng, provider, args.save_dir.clone());
    let app = routes::make_router_with_cors(app_state, cors_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
