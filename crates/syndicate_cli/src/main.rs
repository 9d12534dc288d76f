use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use syndicate_content::{
    ContentProvider, LlmContentProvider, OfflineContentProvider, ProfileHints,
};
use syndicate_control::{AutoBoss, OrderSource, Session};
use syndicate_core::{format_amount, MetricsFileWriter, SettlementReport};
use syndicate_world::{build_initial_state, load_constants, load_state};
use tracing_subscriber::EnvFilter;

mod play;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "syndicate_cli", about = "Crime syndicate management game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WorldArgs {
    /// Generate the city with this seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Resume from a saved GameState JSON file. Mutually exclusive with --seed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Use the LLM provider configured through LLM_API_KEY / LLM_API_URL / LLM_MODEL.
    #[arg(long)]
    llm: bool,
    /// Per-call budget for end-of-day content, in seconds. 0 waits forever.
    #[arg(long, default_value_t = 30)]
    content_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively on the terminal.
    Play {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(long, default_value = "saves")]
        save_dir: PathBuf,
    },
    /// Let the automatic Boss run the syndicate for a number of days.
    Autoplay {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(long)]
        days: u32,
        /// Members to hire before the first night.
        #[arg(long, default_value_t = 3)]
        crew: usize,
        #[arg(long, default_value_t = 1)]
        print_every: u32,
        /// Disable automatic metrics collection to the runs/ directory.
        #[arg(long)]
        no_metrics: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(world: &WorldArgs) -> Result<(Session, ChaCha8Rng)> {
    let constants = load_constants(&world.content_dir)?;

    let (state, rng) = if let Some(path) = &world.state_file {
        let loaded = load_state(path)?;
        // Offset by day so a resumed game does not replay day one's rolls.
        let rng_seed = loaded.meta.seed.wrapping_add(u64::from(loaded.day));
        (loaded, ChaCha8Rng::seed_from_u64(rng_seed))
    } else {
        let resolved_seed = world.seed.unwrap_or_else(rand::random);
        let mut new_rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        let new_state = build_initial_state(&constants, resolved_seed, &mut new_rng);
        (new_state, new_rng)
    };

    let timeout = (world.content_timeout > 0).then(|| Duration::from_secs(world.content_timeout));
    let session = Session::new(state, constants).with_content_timeout(timeout);
    Ok((session, rng))
}

fn make_provider(llm: bool) -> Result<Arc<dyn ContentProvider>> {
    if llm {
        let provider = LlmContentProvider::from_env().context("configuring the LLM provider")?;
        Ok(Arc::new(provider))
    } else {
        Ok(Arc::new(OfflineContentProvider::new()))
    }
}

fn generate_run_id(seed: u64) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{stamp}_seed{seed}")
}

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(dir: &Path, run_id: &str, seed: u64, days: u32, crew: usize) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "runner": "syndicate_cli",
        "args": {
            "days": days,
            "crew": crew,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub(crate) fn print_status(session: &Session) {
    let stats = session.stats();
    println!(
        "[day={day:03}]  cash=${cash}  alert={alert}%  crew={crew}  loyalty={loyalty}  phase={phase:?}",
        day = stats.day,
        cash = format_amount(stats.cash),
        alert = stats.global_alert,
        crew = stats.active_members,
        loyalty = stats.average_loyalty,
        phase = stats.phase,
    );
}

pub(crate) fn print_report(report: &SettlementReport) {
    println!("--- Day {} settlement ---", report.day);
    println!("{}", report.narration);
    println!(
        "income ${}  expenses ${}  net ${}",
        format_amount(report.income),
        format_amount(report.expenses),
        format_amount(report.net()),
    );
    if report.bankrupt {
        println!("*** The syndicate is bankrupt. GAME OVER. ***");
    }
}

// ---------------------------------------------------------------------------
// Autoplay loop
// ---------------------------------------------------------------------------

/// A save taken with the settlement report still open resumes in
/// `EndOfDay`. Close it so the first day can be ordered.
fn close_open_report(session: &mut Session) -> Result<()> {
    if session.state().report.is_some() && !session.is_over() {
        session
            .dismiss_report()
            .context("closing the report left open in the save")?;
    }
    Ok(())
}

async fn autoplay(
    world: &WorldArgs,
    days: u32,
    crew: usize,
    print_every: u32,
    no_metrics: bool,
) -> Result<()> {
    let (mut session, mut rng) = open_session(world)?;
    let provider = make_provider(world.llm)?;
    close_open_report(&mut session)?;

    let mut metrics_writer: Option<MetricsFileWriter> = None;
    if !no_metrics {
        let seed = session.state().meta.seed;
        let run_id = generate_run_id(seed);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(&run_dir, &run_id, seed, days, crew)?;
        let writer = MetricsFileWriter::new(&run_dir)
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        println!("Run directory: {}", run_dir.display());
        metrics_writer = Some(writer);
    }

    while session.state().roster.len() < crew && session.check_can_recruit().is_ok() {
        let candidate = session
            .draft_recruit(provider.as_ref(), &ProfileHints::default())
            .await
            .context("drafting a recruit")?;
        let name = candidate.profile.name.clone();
        session.confirm_recruit(candidate, &mut rng)?;
        println!("Hired {name}.");
    }

    println!(
        "Starting autoplay: days={days} seed={} sectors={}",
        session.state().meta.seed,
        session.state().sectors.len(),
    );
    println!("{}", "-".repeat(80));

    let mut boss = AutoBoss;
    for _ in 0..days {
        if session.is_over() {
            break;
        }
        let orders = boss.next_orders(session.state(), session.constants());
        for order in &orders {
            session.give_order(order)?;
        }

        let report = session.end_day(Arc::clone(&provider), &mut rng).await?;
        if report.bankrupt || report.day % print_every == 0 {
            print_report(&report);
            print_status(&session);
        }

        if let Some(writer) = metrics_writer.as_mut() {
            let snapshot = syndicate_core::compute_metrics(session.state());
            writer.write_row(&snapshot).context("writing metrics row")?;
        }
        if !session.is_over() {
            session.dismiss_report()?;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done.");
    print_status(&session);

    if let Some(writer) = metrics_writer.as_mut() {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to {}", writer.path().display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Play { world, save_dir } => {
            init_tracing("warn");
            let (session, rng) = open_session(&world)?;
            let provider = make_provider(world.llm)?;
            play::run(session, rng, provider, &save_dir).await?;
        }
        Commands::Autoplay {
            world,
            days,
            crew,
            print_every,
            no_metrics,
        } => {
            init_tracing("info");
            autoplay(&world, days, crew, print_every.max(1), no_metrics).await?;
        }
    }
    Ok(())
}
