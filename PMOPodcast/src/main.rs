mod cli;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use pmoconfig::{Config, get_config};
use pmoepisodes::{Episode, EpisodeRepository, EpisodesConfigExt, JsonFileEpisodeRepository};
use pmotransport::time_utils::format_hhmmss;
use pmotransport::{
    PodcastPlayer, SimulatedBackend, TransportConfigExt, TransportController, TransportEvent,
    TransportIntent,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, PlayArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config_dir {
        Some(dir) => Arc::new(
            Config::load_config(dir)
                .with_context(|| format!("Cannot load configuration from {}", dir))?,
        ),
        None => get_config(),
    };
    init_tracing(&config);

    let repository: Box<dyn EpisodeRepository> = match &cli.episodes_file {
        Some(path) => Box::new(JsonFileEpisodeRepository::new(path)),
        None => Box::new(config.episode_repository()?),
    };

    match cli.command {
        Command::List => list(repository.as_ref()),
        Command::Play(args) => play(&config, repository.as_ref(), args),
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(config: &Config) {
    if !config.get_log_enable_console().unwrap_or(true) {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .get_log_min_level()
            .unwrap_or_else(|_| "INFO".to_string());
        EnvFilter::new(level.to_lowercase())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn fetch(repository: &dyn EpisodeRepository) -> anyhow::Result<Vec<Episode>> {
    let episodes = repository
        .list_episodes()
        .context("Cannot fetch episodes")?;
    info!("📻 {} episode(s) available", episodes.len());
    Ok(episodes)
}

fn list(repository: &dyn EpisodeRepository) -> anyhow::Result<()> {
    for (index, episode) in fetch(repository)?.iter().enumerate() {
        println!(
            "{:>3}  {}  {}  ({})",
            index,
            format_hhmmss(episode.duration),
            episode.title,
            episode.members
        );
    }
    Ok(())
}

/// Media time played per clock tick at `speed`.
fn media_step(tick: Duration, speed: f64) -> anyhow::Result<Duration> {
    if !speed.is_finite() || speed <= 0.0 {
        bail!("--speed must be a positive number, got {}", speed);
    }
    Duration::try_from_secs_f64(tick.as_secs_f64() * speed)
        .with_context(|| format!("--speed {} is too large for a {:?} tick", speed, tick))
}

fn play(config: &Config, repository: &dyn EpisodeRepository, args: PlayArgs) -> anyhow::Result<()> {
    let tick = config.tick_interval()?;
    let step = media_step(tick, args.speed)?;

    let episodes = fetch(repository)?;
    if episodes.is_empty() {
        bail!("No episode to play");
    }

    let mut store = config.transport_defaults()?.store();
    if args.shuffle && !store.is_shuffling() {
        store.toggle_shuffle();
    }
    if args.looping && !store.is_looping() {
        store.toggle_loop();
    }

    let mut player = PodcastPlayer::with_store(SimulatedBackend::new(), store);
    let events = player.subscribe();
    let mut controller = TransportController::new(&mut player);

    let intent = if args.single {
        let episode = episodes
            .get(args.index)
            .cloned()
            .with_context(|| format!("No episode at index {}", args.index))?;
        TransportIntent::PlayEpisode(episode)
    } else {
        TransportIntent::PlayList {
            episodes,
            index: args.index,
        }
    };
    controller
        .dispatch(intent)
        .context("Cannot start playback")?;

    let mut ticks = 0u64;
    let mut last_printed = None;
    loop {
        for event in events.try_iter() {
            match event {
                TransportEvent::EpisodeChanged {
                    episode_id: Some(_),
                } => {
                    let controls = controller.controls();
                    println!(
                        "▶ {} ({}) [{}]",
                        controls.title.unwrap_or_default(),
                        controls.members.unwrap_or_default(),
                        controls.duration_label
                    );
                    last_printed = None;
                }
                TransportEvent::ProgressChanged {
                    elapsed_seconds, ..
                } if last_printed != Some(elapsed_seconds) => {
                    let controls = controller.controls();
                    println!("  {} / {}", format_hhmmss(elapsed_seconds), controls.duration_label);
                    last_printed = Some(elapsed_seconds);
                }
                TransportEvent::PlaybackFailed { episode_id, reason } => {
                    warn!(episode = %episode_id, reason = %reason, "Skipping episode");
                }
                _ => {}
            }
        }

        if !controller.controls().has_episode {
            info!("✅ Queue finished");
            break;
        }
        if args.max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks, "Tick limit reached");
            break;
        }

        thread::sleep(tick);
        controller.player().backend().advance_clock(step);
        controller.player_mut().pump();
        ticks += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_step_scales_tick() {
        let step = media_step(Duration::from_millis(250), 60.0).unwrap();
        assert_eq!(step, Duration::from_secs(15));
    }

    #[test]
    fn test_media_step_rejects_invalid_speed() {
        let tick = Duration::from_millis(250);
        assert!(media_step(tick, 0.0).is_err());
        assert!(media_step(tick, -2.0).is_err());
        assert!(media_step(tick, f64::NAN).is_err());
    }

    #[test]
    fn test_media_step_overflow_is_an_error() {
        let err = media_step(Duration::from_millis(250), 1e30).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
