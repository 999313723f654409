//! grabbot — a Telegram bot that downloads video, audio and thumbnails from
//! media links via yt-dlp.
//!
//! Layout:
//! - [`core`] — configuration, errors, logging, shared helpers
//! - [`session`] — per-user session repository
//! - [`download`] — the yt-dlp boundary: request building, progress parsing,
//!   process orchestration, delivery
//! - [`telegram`] — bot construction, handler tree, menus, progress messages

pub mod cli;
pub mod core;
pub mod download;
pub mod session;
pub mod telegram;
