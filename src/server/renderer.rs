use serde::Serialize;

use crate::error::Result;
use crate::plugins::configs::plugin_config_files;
use crate::plugins::scripts::{download_steps, render_ps1, render_sh};
use crate::server::config::{Fork, ServerConfig};
use crate::server::files;
use crate::server::jvm::JvmFlags;
use crate::server::scripts;

/// One file of the generated server tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    /// Relative to the server directory, `/`-separated
    pub path: String,
    pub description: String,
    pub contents: String,
    pub executable: bool,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<String>,
        description: impl Into<String>,
        contents: String,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            contents,
            executable: false,
        }
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

const PLUGINS_README: &str = "# Plugins\n\nRun `./download_plugins.sh` (Linux) or `download_plugins.ps1` (Windows) from this folder.\nSet GITHUB_TOKEN to avoid GitHub API rate limits.\n";

/// Build every file of the server tree, in output order.
///
/// Pure: the same config always yields the same list, byte for byte.
pub fn build_file_map(config: &ServerConfig) -> Result<Vec<GeneratedFile>> {
    let flags = JvmFlags::for_ram(config.ram_gb);
    let mut out = vec![
        GeneratedFile::new(
            "start.sh",
            "tmux launcher with auto-restart and tuned JVM flags",
            scripts::start_sh(config, &flags)?,
        )
        .executable(),
        GeneratedFile::new(
            "start.ps1",
            "PowerShell launcher with auto-restart",
            scripts::start_ps1(config, &flags)?,
        ),
        GeneratedFile::new(
            "start.bat",
            "Double-click launcher for Windows",
            scripts::start_bat(config, &flags)?,
        ),
        GeneratedFile::new(
            "backup.sh",
            "tar.gz backups, keeps 7 days",
            scripts::backup_sh()?,
        )
        .executable(),
        GeneratedFile::new(
            "backup.ps1",
            "ZIP backups for Windows, keeps 7 days",
            scripts::backup_ps1()?,
        ),
        GeneratedFile::new(
            "setup.sh",
            "Ubuntu provisioning: firewall, fail2ban, swap, Java 21",
            files::setup_sh(config)?,
        )
        .executable(),
        GeneratedFile::new(
            "server.properties",
            "Core gameplay and network settings",
            files::server_properties(config)?,
        ),
    ];

    if config.fork.uses_paper_config() {
        out.push(GeneratedFile::new(
            "paper.yml",
            "Paper tuning: anti-xray, entity limits, distances",
            files::paper_yml(config)?,
        ));
    }
    if config.fork == Fork::Purpur {
        out.push(GeneratedFile::new(
            "purpur.yml",
            "Purpur gameplay and performance tweaks",
            files::purpur_yml()?,
        ));
    }

    out.push(GeneratedFile::new(
        "JAR_DOWNLOAD.txt",
        format!("Where to get {}", config.jar_name()),
        files::jar_placeholder(config)?,
    ));
    out.push(GeneratedFile::new(
        "REQUIRED DOWNLOAD!!!.txt",
        "Java 21 install notice for Windows",
        files::java_notice()?,
    ));

    if config.wants_plugins_dir() {
        let steps = download_steps(&config.selected_plugins, &config.extra_plugin_urls);
        out.push(
            GeneratedFile::new(
                "plugins/download_plugins.sh",
                "Fetches every selected plugin (Linux)",
                render_sh(&steps),
            )
            .executable(),
        );
        out.push(GeneratedFile::new(
            "plugins/download_plugins.ps1",
            "Fetches every selected plugin (Windows)",
            render_ps1(&steps),
        ));
        out.push(GeneratedFile::new(
            "plugins/README.md",
            "How to run the plugin downloaders",
            PLUGINS_README.to_string(),
        ));
        out.extend(plugin_config_files(config)?);
    }

    let listed: Vec<(String, String)> = out
        .iter()
        .map(|file| (file.path.clone(), file.description.clone()))
        .collect();
    out.push(GeneratedFile::new(
        "README.md",
        "Deployment guide",
        files::readme(config, &listed)?,
    ));

    Ok(out)
}

/// Every file as a `## path` heading followed by its contents
pub fn preview(config: &ServerConfig) -> Result<String> {
    let blocks: Vec<String> = build_file_map(config)?
        .into_iter()
        .map(|file| format!("## {}\n{}", file.path, file.contents))
        .collect();
    Ok(blocks.join("\n"))
}
