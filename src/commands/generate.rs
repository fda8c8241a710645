use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::plugins::{DownloadedArtifact, PluginFetcher};
use crate::server::{build_file_map, preview, write_files, ServerConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub config: ServerConfig,
    /// Also fetch the server jar instead of leaving only JAR_DOWNLOAD.txt
    #[serde(default)]
    pub download_jar: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedEntry {
    pub path: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub target: PathBuf,
    pub files: Vec<GeneratedEntry>,
    pub server_jar: Option<DownloadedArtifact>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

pub async fn generate_server(request: GenerateRequest) -> Result<GenerateReport, String> {
    let config = request.config.validated().map_err(|e| e.to_string())?;
    let target = config.target_dir();
    tracing::info!(
        "Generating {} ({} {}, {} GB) into {:?}",
        config.server_name,
        config.fork,
        config.version,
        config.ram_gb,
        target
    );

    let files = build_file_map(&config).map_err(|e| e.to_string())?;
    write_files(&target, &files).map_err(|e| e.to_string())?;

    let server_jar = if request.download_jar {
        let fetcher = PluginFetcher::new(config.api_token.clone()).map_err(|e| e.to_string())?;
        Some(
            fetcher
                .download_server_jar(&config, &target)
                .await
                .map_err(|e| e.to_string())?,
        )
    } else {
        None
    };

    Ok(GenerateReport {
        target,
        files: files
            .into_iter()
            .map(|file| GeneratedEntry {
                path: file.path,
                description: file.description,
            })
            .collect(),
        server_jar,
        finished_at: chrono::Utc::now(),
    })
}

pub async fn preview_server(config: ServerConfig) -> Result<String, String> {
    let config = config.validated().map_err(|e| e.to_string())?;
    preview(&config).map_err(|e| e.to_string())
}
