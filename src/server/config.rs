use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GeneratorError, Result};
use crate::plugins::PluginId;

/// Smallest heap the generator accepts, in GB
pub const MIN_RAM_GB: u32 = 5;

pub const DEFAULT_SERVER_NAME: &str = "Enhanced-SMP";
pub const DEFAULT_VERSION: &str = "1.21.10";
pub const DEFAULT_RAM_GB: u32 = 24;
pub const DEFAULT_MAX_PLAYERS: u32 = 100;
pub const DEFAULT_VIEW_DISTANCE: u32 = 8;
pub const DEFAULT_SIMULATION_DISTANCE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Fork {
    #[default]
    Purpur,
    Paper,
    Spigot,
}

impl Fork {
    pub const ALL: [Fork; 3] = [Fork::Purpur, Fork::Paper, Fork::Spigot];

    /// Lowercase id, also used as the tmux session name
    pub fn id(self) -> &'static str {
        match self {
            Fork::Purpur => "purpur",
            Fork::Paper => "paper",
            Fork::Spigot => "spigot",
        }
    }

    /// Purpur is a Paper fork and reads paper.yml as well
    pub fn uses_paper_config(self) -> bool {
        matches!(self, Fork::Purpur | Fork::Paper)
    }

    pub fn jar_name(self, version: &str) -> String {
        format!("{}-{}.jar", self.id(), version)
    }

    pub fn jar_download_url(self, version: &str) -> String {
        match self {
            Fork::Purpur => format!("https://api.purpurmc.org/v2/purpur/{}/latest/download", version),
            Fork::Paper => format!(
                "https://api.papermc.io/v2/projects/paper/versions/{v}/builds/latest/downloads/paper-{v}.jar",
                v = version
            ),
            Fork::Spigot => format!("https://download.getbukkit.org/spigot/spigot-{}.jar", version),
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fork::Purpur => "Purpur",
            Fork::Paper => "Paper",
            Fork::Spigot => "Spigot",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Fork {
    type Err = GeneratorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purpur" => Ok(Fork::Purpur),
            "paper" => Ok(Fork::Paper),
            "spigot" => Ok(Fork::Spigot),
            _ => Err(GeneratorError::UnknownFork(s.to_string())),
        }
    }
}

/// Everything the user picked in the form, consumed once per generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub output_directory: PathBuf,
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_ram_gb")]
    pub ram_gb: u32,
    #[serde(default)]
    pub fork: Fork,
    #[serde(default)]
    pub selected_plugins: BTreeSet<PluginId>,
    #[serde(default)]
    pub extra_plugin_urls: Vec<String>,
    /// GitHub token for release lookups; never rendered into any file
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_view_distance")]
    pub view_distance: u32,
    #[serde(default = "default_simulation_distance")]
    pub simulation_distance: u32,
    #[serde(default)]
    pub enable_velocity: bool,
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_ram_gb() -> u32 {
    DEFAULT_RAM_GB
}

fn default_max_players() -> u32 {
    DEFAULT_MAX_PLAYERS
}

fn default_view_distance() -> u32 {
    DEFAULT_VIEW_DISTANCE
}

fn default_simulation_distance() -> u32 {
    DEFAULT_SIMULATION_DISTANCE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::new(),
            server_name: default_server_name(),
            version: default_version(),
            ram_gb: DEFAULT_RAM_GB,
            fork: Fork::default(),
            selected_plugins: PluginId::default_selection().into_iter().collect(),
            extra_plugin_urls: Vec::new(),
            api_token: None,
            max_players: DEFAULT_MAX_PLAYERS,
            view_distance: DEFAULT_VIEW_DISTANCE,
            simulation_distance: DEFAULT_SIMULATION_DISTANCE,
            enable_velocity: false,
        }
    }
}

impl ServerConfig {
    /// Check the form and fill blanks with defaults.
    ///
    /// Returns the cleaned record; `self` is left untouched so a
    /// rejected form can be shown again as typed.
    pub fn validated(&self) -> Result<ServerConfig> {
        if self.ram_gb < MIN_RAM_GB {
            return Err(GeneratorError::InsufficientRam {
                requested: self.ram_gb,
                minimum: MIN_RAM_GB,
            });
        }
        if self.max_players == 0 {
            return Err(GeneratorError::InvalidSetting(
                "Player count must be positive".to_string(),
            ));
        }
        if self.view_distance < 4 || self.simulation_distance < 2 {
            return Err(GeneratorError::InvalidSetting(
                "Distances must be reasonable (>=4 view, >=2 simulation)".to_string(),
            ));
        }
        let version = self.version.trim();
        if !version.chars().all(is_version_char) {
            return Err(GeneratorError::InvalidSetting(format!(
                "Version '{}' may only contain letters, digits, '.', '_', '+' and '-'",
                version
            )));
        }
        if self.server_name.chars().any(char::is_control) {
            return Err(GeneratorError::InvalidSetting(
                "Server name must not contain control characters".to_string(),
            ));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(GeneratorError::MissingOutputDirectory);
        }

        let mut cleaned = self.clone();
        cleaned.server_name = non_blank_or(&self.server_name, DEFAULT_SERVER_NAME);
        cleaned.version = non_blank_or(&self.version, DEFAULT_VERSION);
        cleaned.extra_plugin_urls = clean_urls(&self.extra_plugin_urls);
        cleaned.api_token = self
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        if cleaned.selected_plugins.is_empty() && cleaned.extra_plugin_urls.is_empty() {
            tracing::warn!("No plugins selected; generating a bare server");
        }
        Ok(cleaned)
    }

    /// Folder name derived from the server name
    pub fn slug(&self) -> String {
        slugify(&self.server_name)
    }

    /// Directory the generated tree lands in
    pub fn target_dir(&self) -> PathBuf {
        target_dir_for(&self.output_directory, &self.slug())
    }

    pub fn jar_name(&self) -> String {
        self.fork.jar_name(&self.version)
    }

    pub fn jar_download_url(&self) -> String {
        self.fork.jar_download_url(&self.version)
    }

    pub fn has_plugin(&self, id: PluginId) -> bool {
        self.selected_plugins.contains(&id)
    }

    /// True when the plugins/ folder has anything to hold
    pub fn wants_plugins_dir(&self) -> bool {
        !self.selected_plugins.is_empty() || !self.extra_plugin_urls.is_empty()
    }
}

/// Version strings end up inside the jar name of every launcher script
fn is_version_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '+' | '-')
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trim URLs and drop blank lines
pub fn clean_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn slugify(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    let slug = safe.trim_matches('-');
    if slug.is_empty() {
        "minecraft-server".to_string()
    } else {
        slug.to_string()
    }
}

fn target_dir_for(output_directory: &Path, slug: &str) -> PathBuf {
    output_directory.join(format!("{}-server", slug))
}
