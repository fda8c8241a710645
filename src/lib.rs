// Minecraft Server Generator - library entry point
// Render a ready-to-run Purpur/Paper/Spigot server folder from one form

pub mod commands;
pub mod error;
pub mod plugins;
pub mod server;
pub mod settings;

pub use error::{GeneratorError, Result};
pub use server::{Fork, ServerConfig};
