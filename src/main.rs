// Minecraft Server Generator - command line entry point

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use minecraft_server_generator_lib::commands::{self, GenerateRequest, InstallRequest};
use minecraft_server_generator_lib::plugins::PluginId;
use minecraft_server_generator_lib::server::config::{
    DEFAULT_MAX_PLAYERS, DEFAULT_RAM_GB, DEFAULT_SERVER_NAME, DEFAULT_SIMULATION_DISTANCE,
    DEFAULT_VERSION, DEFAULT_VIEW_DISTANCE,
};
use minecraft_server_generator_lib::settings::{self, Settings};
use minecraft_server_generator_lib::{Fork, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "mcgen", author, version, about, long_about = None)]
struct Cli {
    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a complete server folder
    Generate {
        #[command(flatten)]
        form: FormArgs,
        /// Download the server jar as well
        #[arg(long)]
        download_jar: bool,
    },
    /// Print every file that `generate` would write
    Preview {
        #[command(flatten)]
        form: FormArgs,
    },
    /// List the plugin catalog
    Plugins,
    /// Add plugins to an existing server folder
    Install {
        #[arg(long)]
        server: PathBuf,
        #[arg(long = "plugin")]
        plugins: Vec<PluginId>,
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Fetch artifacts now instead of only writing the scripts
        #[arg(long)]
        download_now: bool,
        /// GitHub token (defaults to $GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Args, Debug)]
struct FormArgs {
    /// Parent directory (defaults to $MCGEN_OUTPUT_DIR or ~/MinecraftServers)
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_SERVER_NAME)]
    name: String,
    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,
    /// Heap size in GB
    #[arg(long, default_value_t = DEFAULT_RAM_GB)]
    ram: u32,
    #[arg(long, default_value_t = Fork::Purpur)]
    fork: Fork,
    /// Plugin to include (repeatable); added to the defaults
    #[arg(long = "plugin")]
    plugins: Vec<PluginId>,
    /// Start from an empty plugin selection
    #[arg(long)]
    no_default_plugins: bool,
    /// Extra plugin download URL (repeatable)
    #[arg(long = "url")]
    urls: Vec<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_PLAYERS)]
    max_players: u32,
    #[arg(long, default_value_t = DEFAULT_VIEW_DISTANCE)]
    view_distance: u32,
    #[arg(long, default_value_t = DEFAULT_SIMULATION_DISTANCE)]
    simulation_distance: u32,
    /// Prepare the backend for a Velocity proxy
    #[arg(long)]
    velocity: bool,
}

impl FormArgs {
    fn into_config(self, settings: &Settings) -> ServerConfig {
        let mut selected: BTreeSet<PluginId> = if self.no_default_plugins {
            BTreeSet::new()
        } else {
            PluginId::default_selection().into_iter().collect()
        };
        selected.extend(self.plugins);

        ServerConfig {
            output_directory: self
                .output
                .unwrap_or_else(|| settings.default_output_dir.clone()),
            server_name: self.name,
            version: self.version,
            ram_gb: self.ram,
            fork: self.fork,
            selected_plugins: selected,
            extra_plugin_urls: self.urls,
            api_token: settings.github_token.clone(),
            max_players: self.max_players,
            view_distance: self.view_distance,
            simulation_distance: self.simulation_distance,
            enable_velocity: self.velocity,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(settings::log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Generate { form, download_jar } => {
            let request = GenerateRequest {
                config: form.into_config(&settings),
                download_jar,
            };
            let report = commands::generate_server(request)
                .await
                .map_err(anyhow::Error::msg)?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("Server generated in {}", report.target.display());
                for file in &report.files {
                    println!("  {}", file.path);
                }
                if let Some(jar) = &report.server_jar {
                    for file in &jar.files {
                        println!("Server jar saved to {}", file.display());
                    }
                }
            }
        }
        Command::Preview { form } => {
            let text = commands::preview_server(form.into_config(&settings))
                .await
                .map_err(anyhow::Error::msg)?;
            if cli.json {
                print_json(&text)?;
            } else {
                print!("{}", text);
            }
        }
        Command::Plugins => {
            let catalog = commands::list_plugins().await.map_err(anyhow::Error::msg)?;
            if cli.json {
                print_json(&catalog)?;
            } else {
                for plugin in &catalog {
                    let marker = if plugin.default_selected { "*" } else { " " };
                    println!("{} {:<18} {}", marker, plugin.name, plugin.description);
                }
            }
        }
        Command::Install {
            server,
            plugins,
            urls,
            download_now,
            token,
        } => {
            let request = InstallRequest {
                server_path: server,
                plugins: plugins.into_iter().collect(),
                manual_urls: urls,
                download_now,
                github_token: settings.token_or(token),
            };
            let report = commands::install_plugins(request)
                .await
                .map_err(anyhow::Error::msg)?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("Download scripts written to {}", report.plugins_dir.display());
                for artifact in &report.downloaded {
                    for file in &artifact.files {
                        println!("  {}", file.display());
                    }
                }
            }
        }
    }

    Ok(())
}
