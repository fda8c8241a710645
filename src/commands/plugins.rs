use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::GeneratorError;
use crate::plugins::scripts::{download_steps, render_ps1, render_sh};
use crate::plugins::{list_catalog, DownloadedArtifact, PluginFetcher, PluginId, PluginInfo};
use crate::server::config::clean_urls;
use crate::server::{write_files, GeneratedFile};

#[derive(Debug, Clone, Deserialize)]
pub struct InstallRequest {
    pub server_path: PathBuf,
    #[serde(default)]
    pub plugins: BTreeSet<PluginId>,
    #[serde(default)]
    pub manual_urls: Vec<String>,
    #[serde(default)]
    pub download_now: bool,
    #[serde(default)]
    pub github_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InstallReport {
    pub plugins_dir: PathBuf,
    pub scripts: Vec<PathBuf>,
    pub downloaded: Vec<DownloadedArtifact>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_plugins() -> Result<Vec<PluginInfo>, String> {
    Ok(list_catalog())
}

/// Add plugins to an already generated server.
///
/// Writes the download scripts into `<server>/plugins/`; with
/// `download_now` the artifacts are fetched right away as well.
pub async fn install_plugins(request: InstallRequest) -> Result<InstallReport, String> {
    if !request.server_path.is_dir() {
        return Err(GeneratorError::ServerDirectoryNotFound(request.server_path).to_string());
    }
    let urls = clean_urls(&request.manual_urls);
    if request.plugins.is_empty() && urls.is_empty() {
        return Err(GeneratorError::NothingToInstall.to_string());
    }

    let plugins_dir = request.server_path.join("plugins");
    tracing::info!(
        "Installing {} plugins and {} URLs into {:?}",
        request.plugins.len(),
        urls.len(),
        plugins_dir
    );

    let steps = download_steps(&request.plugins, &urls);
    let scripts = vec![
        GeneratedFile::new(
            "download_plugins.sh",
            "Plugin downloader (Linux)",
            render_sh(&steps),
        )
        .executable(),
        GeneratedFile::new(
            "download_plugins.ps1",
            "Plugin downloader (Windows)",
            render_ps1(&steps),
        ),
    ];
    let scripts = write_files(&plugins_dir, &scripts).map_err(|e| e.to_string())?;

    let mut downloaded = Vec::new();
    if request.download_now {
        let fetcher = PluginFetcher::new(request.github_token.clone()).map_err(|e| e.to_string())?;
        for id in &request.plugins {
            let artifact = fetcher
                .download_plugin(*id, &plugins_dir)
                .await
                .map_err(|e| e.to_string())?;
            downloaded.push(artifact);
        }
        for (index, url) in urls.iter().enumerate() {
            let fallback = format!("manual-plugin-{}.jar", index + 1);
            let artifact = fetcher
                .download_url(url, &plugins_dir, &fallback)
                .await
                .map_err(|e| e.to_string())?;
            downloaded.push(artifact);
        }
    }

    Ok(InstallReport {
        plugins_dir,
        scripts,
        downloaded,
        finished_at: chrono::Utc::now(),
    })
}
