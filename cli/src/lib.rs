//! # snipsearch
//!
//! Command-line front end for the snippet store: CRUD, substring search and
//! semantic search, chat-model analysis and suggestions, with results printed
//! as JSON.

pub mod app;
pub mod cli;
pub mod config;
pub mod output;

pub use app::run;
pub use cli::{Cli, Command};
pub use config::AppConfig;
