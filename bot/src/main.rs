use anyhow::{Context, Result, anyhow};
use clap::Parser;
use common::{Difficulty, GameEvent, TRANSPORT_TICK_MS, calculate_autopilot_input};
use session::api::GameApi;
use session::config::normalize_base_url;
use session::{GameSession, GameSummary, HttpGameApi, SessionConfig};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Extra time allowed past the countdown for the session-end call.
const GAME_OVER_GRACE: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(
    name = "bestbefore-bot",
    about = "Play Best Before sessions against a backend with the autopilot"
)]
struct Args {
    /// Base API URL (e.g. http://localhost:8000/api/). Overrides BESTBEFORE_API_URL
    #[arg(long)]
    url: Option<String>,

    /// Player id to report scores under. Overrides BESTBEFORE_PLAYER_ID
    #[arg(long)]
    player: Option<String>,

    /// easy | normal | hard. Overrides BESTBEFORE_DIFFICULTY
    #[arg(long)]
    difficulty: Option<String>,

    /// Spawner seed. Overrides BESTBEFORE_SEED
    #[arg(long)]
    seed: Option<u64>,

    /// Number of bots to run concurrently
    #[arg(long, default_value_t = 1)]
    bots: usize,

    /// Number of games each bot should play sequentially
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Skip printing the leaderboard at the end
    #[arg(long)]
    no_leaderboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let api: Arc<dyn GameApi> = Arc::new(
        HttpGameApi::from_config(&config).context("Failed to build backend client")?,
    );

    info!(
        "Starting {} bot(s) against {} on {:?}, {} game(s) each",
        args.bots, config.api_url, config.difficulty, args.games
    );

    let mut handles = Vec::new();
    for idx in 0..args.bots {
        let api = api.clone();
        let mut config = config.clone();
        if args.bots > 1 {
            config.player_id = format!("{}-{}", config.player_id, idx + 1);
            config.seed = config.seed.map(|seed| seed.wrapping_add(idx as u64));
        }
        let games = args.games;

        let handle = tokio::spawn(async move {
            if let Err(err) = run_bot(idx, games, api, config).await {
                error!("Bot {} failed: {:#}", idx + 1, err);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    if !args.no_leaderboard {
        match api.leaderboard().await {
            Ok(entries) => {
                info!("Leaderboard:");
                for (rank, entry) in entries.iter().take(10).enumerate() {
                    info!("{:>2}. {:<20} {:>5}  {}", rank + 1, entry.player_id, entry.score, entry.date);
                }
            }
            Err(err) => warn!("Failed to fetch leaderboard: {}", err),
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<SessionConfig> {
    let mut config = SessionConfig::from_env()?;
    if let Some(url) = &args.url {
        config.api_url = normalize_base_url(url)?;
    }
    if let Some(player) = &args.player {
        config.player_id = player.clone();
    }
    if let Some(difficulty) = &args.difficulty {
        config.difficulty = difficulty
            .parse::<Difficulty>()
            .with_context(|| format!("Invalid --difficulty '{}'", difficulty))?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

async fn run_bot(idx: usize, total_games: usize, api: Arc<dyn GameApi>, config: SessionConfig) -> Result<()> {
    let (status_tx, status_rx) = watch::channel::<String>(String::from("starting"));
    let logger = tokio::spawn(log_progress(idx, status_rx));

    let mut total_score = 0;
    for game_idx in 1..=total_games {
        send_status(&status_tx, game_idx, total_games, "starting new game");
        match play_single_game(idx, game_idx, total_games, api.clone(), &config, &status_tx).await {
            Ok(summary) => {
                total_score += summary.score;
                info!(
                    "Bot {} game {}/{} finished: score {} in {:.1}s{}",
                    idx + 1,
                    game_idx,
                    total_games,
                    summary.score,
                    summary.time_played,
                    if summary.confirmed { "" } else { " (unconfirmed)" }
                );
                match serde_json::to_string(&summary) {
                    Ok(json) => debug!("Bot {} summary: {}", idx + 1, json),
                    Err(err) => warn!("Bot {} could not serialize summary: {}", idx + 1, err),
                }
                send_status(&status_tx, game_idx, total_games, "completed game");
            }
            Err(err) => {
                send_status(&status_tx, game_idx, total_games, format!("error: {err}"));
                drop(status_tx);
                let _ = logger.await;
                return Err(err);
            }
        }
    }

    drop(status_tx);
    let _ = logger.await;
    info!(
        "Bot {} finished all {} game(s) as {} with {} points",
        idx + 1,
        total_games,
        config.player_id,
        total_score
    );
    Ok(())
}

async fn play_single_game(
    idx: usize,
    game_idx: usize,
    total_games: usize,
    api: Arc<dyn GameApi>,
    config: &SessionConfig,
    status_tx: &watch::Sender<String>,
) -> Result<GameSummary> {
    let session = GameSession::start(api, config)
        .await
        .with_context(|| format!("Bot {} failed to start game {}", idx + 1, game_idx))?;
    let game_id = session.game_id().to_string();
    let time_limit = Duration::from_secs(session.snapshot().await.time_remaining as u64);
    send_status(status_tx, game_idx, total_games, format!("playing game {}", game_id));

    let mut events = session.subscribe();
    let mut summary_rx = session.summary();
    let mut interval = tokio::time::interval(Duration::from_millis(TRANSPORT_TICK_MS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let hang_timer = tokio::time::sleep_until(Instant::now() + time_limit + GAME_OVER_GRACE);
    tokio::pin!(hang_timer);

    let summary = loop {
        tokio::select! {
            biased;

            _ = &mut hang_timer => {
                let msg = format!(
                    "Bot {} game {}/{} stalled waiting for game over (game {})",
                    idx + 1,
                    game_idx,
                    total_games,
                    game_id
                );
                error!("{msg}");
                send_status(status_tx, game_idx, total_games, "stalled waiting for game over");
                return Err(anyhow!(msg));
            }
            changed = summary_rx.changed() => {
                if changed.is_err() {
                    return Err(anyhow!("Bot {} game {} closed without a summary", idx + 1, game_id));
                }
                if let Some(summary) = summary_rx.borrow_and_update().clone() {
                    break summary;
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => handle_game_event(idx, &event, status_tx, game_idx, total_games),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Bot {} skipped {} events", idx + 1, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {}
                }
            }
            _ = interval.tick() => {
                let state = session.snapshot().await;
                if let Some(input) = calculate_autopilot_input(&state) {
                    session.input(input).await;
                }
            }
        }
    };

    session.shutdown().await?;
    Ok(summary)
}

fn handle_game_event(
    idx: usize,
    event: &GameEvent,
    status_tx: &watch::Sender<String>,
    game_idx: usize,
    total_games: usize,
) {
    match event {
        GameEvent::ItemDropped { outcome, .. } => {
            info!("Bot {}: {}", idx + 1, outcome.message);
        }
        GameEvent::ItemWasted { message, .. } | GameEvent::DropBlocked { message, .. } => {
            info!("Bot {}: {}", idx + 1, message);
        }
        GameEvent::TimeTicked { time_remaining } => {
            send_status(status_tx, game_idx, total_games, format!("{}s left", time_remaining));
        }
        GameEvent::ScoreUpdated { score } => {
            debug!("Bot {} score is now {}", idx + 1, score);
        }
        _ => {}
    }
}

fn send_status(
    status_tx: &watch::Sender<String>,
    game_idx: usize,
    total_games: usize,
    status: impl Into<String>,
) {
    let _ = status_tx.send(format!(
        "game {}/{}: {}",
        game_idx,
        total_games,
        status.into()
    ));
}

async fn log_progress(idx: usize, mut status_rx: watch::Receiver<String>) {
    let mut interval = tokio::time::interval(Duration::from_secs(5));
    let mut last = String::new();
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !last.is_empty() {
                    info!("Bot {} status: {}", idx + 1, last);
                }
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                last = status_rx.borrow().clone();
            }
        }
    }
}
