//! Bot construction and the command set.

use reqwest::ClientBuilder;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// The bot type used throughout the crate.
pub type Bot = teloxide::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "What I can do:")]
pub enum Command {
    #[command(description = "show the welcome menu")]
    Start,
}

/// Creates a Bot instance with a long-timeout HTTP client.
///
/// The client timeout is raised well past reqwest's default so large video
/// uploads do not get cut off mid-transfer.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(token, client))
}
