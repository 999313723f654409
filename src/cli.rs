use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "grabbot")]
#[command(author, version, about = "Telegram bot for downloading video, audio and thumbnails from media links", long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = crate::core::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Download one URL to disk without Telegram and print the file path
    Download {
        /// Media URL to download
        url: String,

        /// What to fetch: video, audio or thumbnail
        #[arg(short, long, default_value = "video")]
        mode: String,

        /// Output directory (defaults to the configured downloads dir)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
