// Command handlers: one async fn per user action, errors as display strings

pub mod generate;
pub mod plugins;

pub use generate::{generate_server, preview_server, GenerateReport, GenerateRequest};
pub use plugins::{install_plugins, list_plugins, InstallReport, InstallRequest};
