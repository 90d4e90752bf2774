// fplscout entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config, copying defaults on first run
// 4. Build the HTTP source and LLM client
// 5. Run one command, or the interactive shell

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use fplscout_app::api::HttpFplSource;
use fplscout_app::render;
use fplscout_app::service::{NewsDigest, RecommendRequest, Scout, ScoutError};
use fplscout_core::cache::TtlCache;
use fplscout_core::config;
use fplscout_core::player::Position;
use fplscout_llm::client::LlmClient;

#[derive(Parser)]
#[command(name = "fplscout")]
#[command(about = "Fantasy Premier League news, shortlists and squad checks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding config/ and defaults/.
    #[arg(long, env = "FPLSCOUT_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// League-wide injury and availability digest.
    News,

    /// Ranked shortlist for a position and price cap.
    Recommend {
        #[arg(short, long)]
        position: Option<Position>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        top_n: Option<usize>,

        /// Also write the shortlist to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Skip the LLM write-up.
        #[arg(long)]
        no_llm: bool,
    },

    /// Show a manager's squad for a gameweek.
    Team {
        #[arg(long)]
        entry: u32,

        /// Defaults to the entry's current gameweek.
        #[arg(long)]
        gameweek: Option<u32>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Fixture difficulty per team over the coming gameweeks.
    Fixtures {
        #[arg(long)]
        horizon: Option<u32>,
    },

    /// Is a transfer worth the points hit?
    Transfer {
        #[arg(long = "out")]
        out_id: u32,

        #[arg(long = "in")]
        in_id: u32,

        #[arg(long, default_value_t = 0)]
        hits: u32,
    },

    /// Read commands from stdin, sharing one news cache.
    Shell,
}

/// One line typed into the shell.
#[derive(Parser)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: file logging disabled: {e:#}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.root {
        Some(root) => config::load_config_in(root),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    info!(base_url = %config.api.base_url, "config loaded");

    let source = HttpFplSource::new(&config.api)?;
    let llm = LlmClient::from_config(&config);
    match &llm {
        LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }

    let mut news_cache = TtlCache::new(Duration::from_secs(config.news.cache_ttl_secs));
    let scout = Scout::new(source, config, llm);

    match cli.command {
        Command::Shell => run_shell(&scout, &mut news_cache).await,
        command => execute(&scout, &mut news_cache, command).await,
    }
}

async fn execute(
    scout: &Scout<HttpFplSource>,
    news_cache: &mut TtlCache<NewsDigest>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::News => {
            let digest = scout.news_digest(news_cache, Instant::now()).await?;
            print!("{}", render::render_digest(&digest));
        }
        Command::Recommend {
            position,
            max_price,
            top_n,
            csv,
            no_llm,
        } => {
            let defaults = RecommendRequest::from_config(&scout.config().recommend);
            let request = RecommendRequest {
                position: position.unwrap_or(defaults.position),
                max_price: max_price.unwrap_or(defaults.max_price),
                top_n: top_n.unwrap_or(defaults.top_n),
                use_llm: !no_llm,
            };
            let reco = scout.recommend(request).await?;
            print!("{}", render::render_recommendation(&reco));
            if let Some(path) = csv {
                let file = create_file(&path)?;
                render::write_shortlist_csv(&reco.shortlist, file)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("\nShortlist written to {}", path.display());
            }
        }
        Command::Team {
            entry,
            gameweek,
            csv,
        } => {
            let view = scout.load_team(entry, gameweek).await?;
            print!(
                "{}",
                render::render_squad(&view, scout.config().news.max_issues)
            );
            if let Some(path) = csv {
                let file = create_file(&path)?;
                render::write_squad_csv(&view, file)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("\nSquad written to {}", path.display());
            }
        }
        Command::Fixtures { horizon } => {
            let outlook = scout.fixture_outlook(horizon).await?;
            print!("{}", render::render_outlook(&outlook));
        }
        Command::Transfer {
            out_id,
            in_id,
            hits,
        } => {
            let report = scout.evaluate_transfer(out_id, in_id, hits).await?;
            print!("{}", render::render_transfer(&report));
        }
        Command::Shell => anyhow::bail!("already in the shell"),
    }
    Ok(())
}

async fn run_shell(
    scout: &Scout<HttpFplSource>,
    news_cache: &mut TtlCache<NewsDigest>,
) -> anyhow::Result<()> {
    println!("fplscout shell. Type `help` for commands, `quit` to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("fplscout> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            _ => {}
        }

        let parsed = match ShellLine::try_parse_from(words.iter().copied()) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help and usage errors both land here.
                let _ = e.print();
                continue;
            }
        };
        if let Err(e) = execute(scout, news_cache, parsed.command).await {
            error!("{e:#}");
            report(&e);
        }
    }
    Ok(())
}

fn create_file(path: &Path) -> anyhow::Result<std::fs::File> {
    std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Print an error for the user, with a hint when one applies.
fn report(e: &anyhow::Error) {
    match e.downcast_ref::<ScoutError>() {
        Some(scout_err) => {
            eprintln!("error: {scout_err}");
            eprintln!("hint: {}", scout_err.hint());
        }
        None => eprintln!("error: {e:#}"),
    }
}

/// Log to a file under the platform data dir (or ./logs) so stdout stays
/// clean for reports.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = directories::ProjectDirs::from("", "", "fplscout")
        .map(|dirs| dirs.data_dir().join("logs"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => {
            let dir = std::env::current_dir()?.join("logs");
            std::fs::create_dir_all(&dir)?;
            dir
        }
    };

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("fplscout.log"))?;

    let default_filter = if verbose {
        "fplscout=debug,warn"
    } else {
        "fplscout=info,warn"
    };
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
