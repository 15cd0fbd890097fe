//! Ring Fighter - headless match runner
//!
//! Runs one best-of-three match between a scripted player and the opponent
//! AI, logging every gameplay event until the match is decided.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ring_fighter::bot::ScriptedBot;
use ring_fighter::config::Config;
use ring_fighter::game::{GameMatch, MatchState, Roster, SpriteSheetTimings};
use ring_fighter::protocol::ServerMsg;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Ring Fighter");

    let roster = match &config.roster_path {
        Some(path) => Roster::load(path)?,
        None => Roster::default(),
    };
    let player_choice = roster.select(config.player_fighter.as_deref(), 0)?;
    let opponent_choice = roster.select(config.opponent_fighter.as_deref(), 1)?;

    let animations = SpriteSheetTimings::shared();
    let seed = config.match_seed.unwrap_or_else(rand::random);
    let state = MatchState::new(
        Uuid::new_v4(),
        seed,
        config.difficulty,
        player_choice.build(animations.clone()),
        opponent_choice.build(animations),
    );

    let (game_match, handle) = GameMatch::new(state, config.time_scale);
    let mut events = handle.subscribe();
    let bot_rx = handle.subscribe();

    let runner = tokio::spawn(game_match.run());
    let bot = tokio::spawn(ScriptedBot::new().run(handle.clone(), bot_rx));

    tokio::select! {
        _ = log_until_match_end(&mut events) => {}
        _ = shutdown_signal() => {
            info!("Received Ctrl+C, stopping match");
        }
    }

    // Dropping every input sender stops the runner
    bot.abort();
    let _ = bot.await;
    drop(handle);

    let summary = runner.await?;
    info!(
        match_id = %summary.match_id,
        winner = ?summary.winner,
        rounds_won = summary.rounds_won,
        rounds_lost = summary.rounds_lost,
        ticks = summary.ticks,
        "Shutdown complete"
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Log broadcast traffic until the match end announcement
async fn log_until_match_end(rx: &mut broadcast::Receiver<ServerMsg>) {
    loop {
        match rx.recv().await {
            Ok(ServerMsg::Event { tick, event }) => info!(tick, ?event, "Game event"),
            Ok(ServerMsg::MatchStarted { player, opponent, difficulty, .. }) => {
                info!(player = %player.name, opponent = %opponent.name, %difficulty, "Fighters ready");
            }
            Ok(ServerMsg::MatchEnd {
                winner,
                rounds_won,
                rounds_lost,
                duration_ms,
            }) => {
                info!(%winner, rounds_won, rounds_lost, duration_ms, "Match decided");
                return;
            }
            Ok(ServerMsg::Snapshot(_)) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log lagging"),
            Err(RecvError::Closed) => return,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
