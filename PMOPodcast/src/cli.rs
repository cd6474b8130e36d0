use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "pmopodcast",
    version,
    about = "Browse the latest podcast episodes and play them through a simulated player"
)]
pub struct Cli {
    /// Configuration directory (defaults to $PMOPODCAST_CONFIG, ./.pmopodcast or ~/.pmopodcast)
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Read episodes from a JSON file instead of the episodes API
    #[arg(long, global = true)]
    pub episodes_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the latest episodes
    List,
    /// Play the episode list
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Position of the first episode in the list
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Play only the selected episode
    #[arg(long)]
    pub single: bool,

    #[arg(long)]
    pub shuffle: bool,

    /// Repeat the current episode
    #[arg(long = "loop")]
    pub looping: bool,

    /// Media seconds played per wall-clock second
    #[arg(long, default_value_t = 60.0)]
    pub speed: f64,

    /// Stop after this many clock ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,
}
