// Environment-derived settings

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const OUTPUT_DIR_ENV: &str = "MCGEN_OUTPUT_DIR";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Default token for GitHub release lookups
    pub github_token: Option<String>,
    pub default_output_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, so tests don't touch the process env
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            github_token: non_blank(TOKEN_ENV),
            default_output_dir: non_blank(OUTPUT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(get_default_output_dir),
        }
    }

    /// Explicit token wins over the environment
    pub fn token_or(&self, explicit: Option<String>) -> Option<String> {
        explicit
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| self.github_token.clone())
    }
}

fn get_default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("MinecraftServers")
}

/// `RUST_LOG` if set, otherwise info with the HTTP stack quieted
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"))
}
