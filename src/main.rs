//! Herald Runtime
//!
//! Entry point for the posting agent. Handles CLI args, config loading,
//! client construction, and the heartbeat daemon lifecycle.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use herald::agent::Agent;
use herald::board::BoardHttpClient;
use herald::config::{get_config_path, load_config, write_default_config, BOARD_TOKEN_ENV};
use herald::generation::create_generator;
use herald::heartbeat::create_heartbeat_daemon;
use herald::scheduler::{RateLimitPolicy, Scheduler};
use herald::types::{HeraldConfig, LogLevel};

const VERSION: &str = "0.1.0";

/// Herald -- Autonomous Board-Posting Agent
#[derive(Parser, Debug)]
#[command(
    name = "herald",
    version = VERSION,
    about = "Autonomous board-posting agent",
    long_about = "Periodically generates posts, gates itself with rate limits and duplicate detection, and publishes to a content board."
)]
struct Cli {
    /// Run the agent under the heartbeat daemon
    #[arg(long)]
    run: bool,

    /// Run exactly one cycle and exit
    #[arg(long)]
    once: bool,

    /// Show the current configuration
    #[arg(long)]
    status: bool,

    /// Write a default config file if none exists
    #[arg(long)]
    init_config: bool,
}

// ---- Status Command ---------------------------------------------------------

/// Display the current configuration, with credentials reduced to
/// presence checks.
fn show_status() {
    let config_path = get_config_path();
    if !config_path.exists() {
        println!("Herald is not configured. Run: herald --init-config");
        return;
    }

    let config = match load_config() {
        Some(config) => config,
        None => {
            eprintln!("Failed to parse {}", config_path.display());
            return;
        }
    };

    let token = if config.board_api_token.is_empty() {
        format!("missing (set {})", BOARD_TOKEN_ENV)
    } else {
        "set".to_string()
    };
    let model = if config.generation_model.is_empty() {
        "(provider default)".to_string()
    } else {
        config.generation_model.clone()
    };

    println!(
        r#"
=== HERALD STATUS ===
Board URL:   {}
Board token: {}
Provider:    {}
Model:       {}
Category:    {}
Heartbeat:   every {}s
Cooldown:    {}m between posts
Quota:       {} comments per {}m
Version:     {}
=====================
"#,
        config.board_api_url,
        token,
        config.generation_provider,
        model,
        config.category,
        config.heartbeat_interval_secs,
        config.post_cooldown_minutes,
        config.comment_quota,
        config.comment_window_minutes,
        config.version,
    );
}

// ---- Agent Assembly ---------------------------------------------------------

fn init_tracing(level: LogLevel) {
    let level = match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

/// Wire the clients, scheduler, and agent together from config.
fn build_agent(config: &HeraldConfig) -> Result<Agent> {
    if config.board_api_token.is_empty() {
        anyhow::bail!(
            "No board API token: set boardApiToken in the config or export {}",
            BOARD_TOKEN_ENV
        );
    }

    let board = Arc::new(BoardHttpClient::new(
        config.board_api_url.clone(),
        config.board_api_token.clone(),
    ));
    let generator = create_generator(config)?;
    let scheduler = Scheduler::new(RateLimitPolicy::new(
        config.post_cooldown_minutes,
        config.comment_quota,
        config.comment_window_minutes,
    ));

    Ok(Agent::new(
        board,
        generator,
        scheduler,
        config.persona.clone(),
        config.category.clone(),
    ))
}

// ---- Main Run ---------------------------------------------------------------

/// Start the daemon and park until a shutdown signal arrives.
async fn run(config: HeraldConfig) -> Result<()> {
    info!("herald v{} starting", VERSION);

    let mut agent = build_agent(&config)?;
    agent.bootstrap().await;

    let mut daemon = create_heartbeat_daemon(config.heartbeat_interval_secs);
    daemon.start(agent);

    wait_for_shutdown().await;

    daemon.stop();
    info!("herald stopped");
    Ok(())
}

/// Run exactly one cycle, for cron-style hosting or smoke testing.
async fn run_once(config: HeraldConfig) -> Result<()> {
    info!("herald v{} running a single cycle", VERSION);

    let mut agent = build_agent(&config)?;
    agent.bootstrap().await;

    let report = agent.run_cycle().await?;
    info!("single cycle finished: {:?}", report);
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM handler");

        tokio::select! {
            _ = ctrl_c => {
                info!("received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("Failed to register Ctrl+C handler");
        info!("received shutdown signal");
    }
}

// ---- Entry Point -----------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.init_config {
        match write_default_config() {
            Ok((path, true)) => {
                println!("Wrote default config to {}", path.display());
                println!("Fill in boardApiToken and a generation API key, then run: herald --run");
            }
            Ok((path, false)) => {
                println!("Config already exists at {}", path.display());
            }
            Err(e) => {
                eprintln!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if cli.status {
        show_status();
        return;
    }

    if cli.run || cli.once {
        let config = match load_config() {
            Some(config) => config,
            None => {
                eprintln!(
                    "No config found at {}. Run: herald --init-config",
                    get_config_path().display()
                );
                std::process::exit(1);
            }
        };
        init_tracing(config.log_level);

        let result = if cli.once {
            run_once(config).await
        } else {
            run(config).await
        };

        if let Err(e) = result {
            eprintln!("Fatal: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Default: show help
    println!("Run \"herald --help\" for usage information.");
    println!("Run \"herald --run\" to start the agent.");
}
