// Plugin Fetcher - resolves and downloads plugin artifacts over HTTP

use futures_util::stream::StreamExt;
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::{GeneratorError, Result};
use crate::plugins::archive::extract_zip;
use crate::plugins::catalog::{file_name_from_url, is_zip, PluginId, PluginSource};
use crate::server::config::ServerConfig;

const GITHUB_API: &str = "https://api.github.com";

/// A concrete artifact: where to fetch it and what to call it on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub file_name: String,
    pub url: String,
}

/// What a download left on disk
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedArtifact {
    pub label: String,
    /// The jar itself, or the extracted contents of a zip
    pub files: Vec<PathBuf>,
    pub bytes: u64,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    #[serde(default)]
    versioning: Option<MavenVersioning>,
}

#[derive(Debug, Deserialize)]
struct MavenVersioning {
    #[serde(default)]
    release: Option<String>,
    #[serde(default)]
    latest: Option<String>,
    #[serde(default)]
    versions: Option<MavenVersions>,
}

#[derive(Debug, Deserialize)]
struct MavenVersions {
    #[serde(default)]
    version: Vec<String>,
}

pub struct PluginFetcher {
    client: Client,
    token: Option<String>,
    github_api: String,
}

impl PluginFetcher {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_github_api(token, GITHUB_API)
    }

    /// Same as `new`, but release lookups go to `github_api` instead of api.github.com
    pub(crate) fn with_github_api(token: Option<String>, github_api: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mcgen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            github_api: github_api.trim_end_matches('/').to_string(),
        })
    }

    /// Turn a catalog source into a downloadable artifact
    pub async fn resolve(&self, source: &PluginSource, fallback_name: &str) -> Result<ResolvedArtifact> {
        match *source {
            PluginSource::Direct { url } => Ok(ResolvedArtifact {
                file_name: file_name_from_url(url, fallback_name),
                url: url.to_string(),
            }),
            PluginSource::GithubRelease {
                owner,
                repo,
                asset_pattern,
            } => self.github_asset(owner, repo, asset_pattern).await,
            PluginSource::Maven {
                base_url,
                group,
                artifact,
            } => self.maven_artifact(base_url, group, artifact).await,
        }
    }

    async fn github_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_pattern: &str,
    ) -> Result<ResolvedArtifact> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.github_api, owner, repo);
        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if matches!(
            response.status(),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) {
            return Err(GeneratorError::RateLimited(format!("{}/{}", owner, repo)));
        }
        let release: GithubRelease = response.error_for_status()?.json().await?;

        pick_asset(&release, asset_pattern)?.ok_or_else(|| GeneratorError::AssetNotFound {
            repo: format!("{}/{}", owner, repo),
            pattern: asset_pattern.to_string(),
        })
    }

    async fn maven_artifact(
        &self,
        base_url: &str,
        group: &str,
        artifact: &str,
    ) -> Result<ResolvedArtifact> {
        let artifact_url = format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            group.replace('.', "/"),
            artifact
        );
        let xml = self
            .client
            .get(format!("{}/maven-metadata.xml", artifact_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let version = pick_maven_version(&xml)?
            .ok_or_else(|| GeneratorError::MavenVersionNotFound(format!("{}:{}", group, artifact)))?;
        let file_name = format!("{}-{}.jar", artifact, version);
        Ok(ResolvedArtifact {
            url: format!("{}/{}/{}", artifact_url, version, file_name),
            file_name,
        })
    }

    /// Stream `url` into `dest`, returning the byte count.
    ///
    /// The body goes to `<dest>.part` first; `dest` only appears once the
    /// whole body has arrived.
    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let partial = partial_path(dest);
        match self.stream_into(url, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, dest)
                    .await
                    .map_err(|e| GeneratorError::io(dest, e))?;
                Ok(bytes)
            }
            Err(e) => {
                if tokio::fs::remove_file(&partial).await.is_ok() {
                    tracing::debug!("Removed incomplete download {:?}", partial);
                }
                Err(e)
            }
        }
    }

    async fn stream_into(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| GeneratorError::io(path, e))?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| GeneratorError::io(path, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| GeneratorError::io(path, e))?;
        Ok(written)
    }

    async fn fetch(&self, label: &str, artifact: ResolvedArtifact, dir: &Path) -> Result<DownloadedArtifact> {
        let path = dir.join(&artifact.file_name);
        tracing::info!("Downloading {} from {}", label, artifact.url);
        let bytes = self.download_to(&artifact.url, &path).await?;
        tracing::debug!("Saved {:?} ({} bytes)", path, bytes);

        let files = if is_zip(&artifact.file_name) {
            let extracted = extract_zip(&path, dir)?;
            std::fs::remove_file(&path).map_err(|e| GeneratorError::io(&path, e))?;
            tracing::info!("Extracted {} files from {}", extracted.len(), artifact.file_name);
            extracted
        } else {
            vec![path]
        };

        Ok(DownloadedArtifact {
            label: label.to_string(),
            files,
            bytes,
        })
    }

    pub async fn download_plugin(&self, id: PluginId, dir: &Path) -> Result<DownloadedArtifact> {
        let artifact = self.resolve(&id.source(), &id.fallback_file_name()).await?;
        self.fetch(id.name(), artifact, dir).await
    }

    /// Download an arbitrary URL, naming the file after the URL or `fallback_name`
    pub async fn download_url(&self, url: &str, dir: &Path, fallback_name: &str) -> Result<DownloadedArtifact> {
        let artifact = ResolvedArtifact {
            file_name: file_name_from_url(url, fallback_name),
            url: url.to_string(),
        };
        self.fetch(url, artifact, dir).await
    }

    pub async fn download_server_jar(&self, config: &ServerConfig, dir: &Path) -> Result<DownloadedArtifact> {
        let artifact = ResolvedArtifact {
            file_name: config.jar_name(),
            url: config.jar_download_url(),
        };
        self.fetch(&format!("{} {}", config.fork, config.version), artifact, dir)
            .await
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn pick_asset(release: &GithubRelease, asset_pattern: &str) -> Result<Option<ResolvedArtifact>> {
    let regex = Regex::new(asset_pattern)
        .map_err(|e| GeneratorError::InvalidSetting(format!("asset pattern {}: {}", asset_pattern, e)))?;
    Ok(release
        .assets
        .iter()
        .find(|asset| regex.is_match(&asset.name))
        .map(|asset| ResolvedArtifact {
            file_name: asset.name.clone(),
            url: asset.browser_download_url.clone(),
        }))
}

/// `release`, then `latest`, then the last listed version
fn pick_maven_version(xml: &str) -> Result<Option<String>> {
    let metadata: MavenMetadata = quick_xml::de::from_str(xml)?;
    let Some(versioning) = metadata.versioning else {
        return Ok(None);
    };
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(non_blank(versioning.release)
        .or_else(|| non_blank(versioning.latest))
        .or_else(|| non_blank(versioning.versions.and_then(|v| v.version.last().cloned()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::archive::zip_bytes;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one HTTP exchange on localhost with a canned raw response.
    /// The handle yields the request head as received.
    async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base, handle)
    }

    fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    const RELEASE_JSON: &str = r#"{"tag_name":"2.21.0","assets":[
        {"name":"EssentialsXChat-2.21.0.jar","browser_download_url":"https://github.com/dl/EssentialsXChat-2.21.0.jar"},
        {"name":"EssentialsX-2.21.0.jar","browser_download_url":"https://github.com/dl/EssentialsX-2.21.0.jar"}]}"#;

    fn release(names: &[&str]) -> GithubRelease {
        GithubRelease {
            assets: names
                .iter()
                .map(|name| GithubAsset {
                    name: name.to_string(),
                    browser_download_url: format!("https://github.com/dl/{}", name),
                })
                .collect(),
        }
    }

    #[test]
    fn test_pick_asset_matches_pattern() {
        let rel = release(&[
            "EssentialsXChat-2.21.0.jar",
            "EssentialsX-2.21.0.jar",
            "EssentialsXSpawn-2.21.0.jar",
        ]);
        let found = pick_asset(&rel, r"^EssentialsX-.*\.jar$").unwrap().unwrap();
        assert_eq!(found.file_name, "EssentialsX-2.21.0.jar");
        assert_eq!(found.url, "https://github.com/dl/EssentialsX-2.21.0.jar");
        assert!(pick_asset(&rel, r"^Nope-.*\.jar$").unwrap().is_none());
    }

    #[test]
    fn test_release_json_without_assets() {
        let rel: GithubRelease = serde_json::from_str(r#"{"tag_name":"v1"}"#).unwrap();
        assert!(rel.assets.is_empty());
    }

    #[test]
    fn test_maven_prefers_release() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>com.sk89q.worldedit</groupId>
  <artifactId>worldedit-bukkit</artifactId>
  <versioning>
    <latest>7.4.0-SNAPSHOT</latest>
    <release>7.3.9</release>
    <versions>
      <version>7.3.8</version>
      <version>7.3.9</version>
    </versions>
    <lastUpdated>20241101000000</lastUpdated>
  </versioning>
</metadata>"#;
        assert_eq!(pick_maven_version(xml).unwrap().as_deref(), Some("7.3.9"));
    }

    #[test]
    fn test_maven_falls_back_to_last_version() {
        let xml = r#"<metadata>
  <versioning>
    <versions>
      <version>1.0</version>
      <version>1.1</version>
    </versions>
  </versioning>
</metadata>"#;
        assert_eq!(pick_maven_version(xml).unwrap().as_deref(), Some("1.1"));
    }

    #[test]
    fn test_maven_without_versioning() {
        assert_eq!(pick_maven_version("<metadata></metadata>").unwrap(), None);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/srv/plugins/Foo.jar")),
            PathBuf::from("/srv/plugins/Foo.jar.part")
        );
    }

    #[tokio::test]
    async fn test_direct_source_resolves_offline() {
        let fetcher = PluginFetcher::new(None).unwrap();
        let artifact = fetcher
            .resolve(&PluginId::Spark.source(), &PluginId::Spark.fallback_file_name())
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "Spark.jar");
        assert_eq!(artifact.url, "https://download.lucko.me/spark/latest/bukkit");
    }

    #[tokio::test]
    async fn test_github_forbidden_is_rate_limited() {
        let (base, server) = serve_once(http_response("403 Forbidden", b"{}")).await;
        let fetcher = PluginFetcher::with_github_api(None, &base).unwrap();
        let err = fetcher
            .github_asset("EssentialsX", "Essentials", r"^EssentialsX-.*\.jar$")
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::RateLimited(ref repo) if repo == "EssentialsX/Essentials"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_github_too_many_requests_is_rate_limited() {
        let (base, server) = serve_once(http_response("429 Too Many Requests", b"")).await;
        let fetcher = PluginFetcher::with_github_api(None, &base).unwrap();
        let err = fetcher.github_asset("a", "b", ".*").await.unwrap_err();
        assert!(matches!(err, GeneratorError::RateLimited(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_github_lookup_sends_token_and_picks_asset() {
        let (base, server) = serve_once(http_response("200 OK", RELEASE_JSON.as_bytes())).await;
        let fetcher = PluginFetcher::with_github_api(Some("ghp_test".to_string()), &base).unwrap();
        let artifact = fetcher
            .github_asset("EssentialsX", "Essentials", r"^EssentialsX-.*\.jar$")
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "EssentialsX-2.21.0.jar");
        assert_eq!(artifact.url, "https://github.com/dl/EssentialsX-2.21.0.jar");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /repos/essentialsx/essentials/releases/latest "));
        assert!(request.contains("authorization: bearer ghp_test\r\n"));
        assert!(request.contains("accept: application/vnd.github+json\r\n"));
    }

    #[tokio::test]
    async fn test_github_lookup_without_token_sends_no_auth() {
        let (base, server) = serve_once(http_response("200 OK", RELEASE_JSON.as_bytes())).await;
        let fetcher = PluginFetcher::with_github_api(Some("  ".to_string()), &base).unwrap();
        fetcher
            .github_asset("EssentialsX", "Essentials", r"^EssentialsXChat-.*\.jar$")
            .await
            .unwrap();
        assert!(!server.await.unwrap().to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_github_missing_asset() {
        let (base, server) = serve_once(http_response("200 OK", RELEASE_JSON.as_bytes())).await;
        let fetcher = PluginFetcher::with_github_api(None, &base).unwrap();
        let err = fetcher
            .github_asset("EssentialsX", "Essentials", r"^EssentialsXSpawn-.*\.jar$")
            .await
            .unwrap_err();
        match err {
            GeneratorError::AssetNotFound { repo, pattern } => {
                assert_eq!(repo, "EssentialsX/Essentials");
                assert_eq!(pattern, r"^EssentialsXSpawn-.*\.jar$");
            }
            other => panic!("expected AssetNotFound, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_maven_lookup_builds_artifact_url() {
        let xml = b"<metadata><versioning><release>7.3.9</release></versioning></metadata>";
        let (base, server) = serve_once(http_response("200 OK", xml)).await;
        let fetcher = PluginFetcher::new(None).unwrap();
        let artifact = fetcher
            .maven_artifact(&format!("{}/repo/", base), "com.sk89q.worldedit", "worldedit-bukkit")
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "worldedit-bukkit-7.3.9.jar");
        assert_eq!(
            artifact.url,
            format!("{}/repo/com/sk89q/worldedit/worldedit-bukkit/7.3.9/worldedit-bukkit-7.3.9.jar", base)
        );
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /repo/com/sk89q/worldedit/worldedit-bukkit/maven-metadata.xml "));
    }

    #[tokio::test]
    async fn test_maven_without_version_is_an_error() {
        let (base, server) = serve_once(http_response("200 OK", b"<metadata></metadata>")).await;
        let fetcher = PluginFetcher::new(None).unwrap();
        let err = fetcher.maven_artifact(&base, "g.h", "art").await.unwrap_err();
        assert!(matches!(err, GeneratorError::MavenVersionNotFound(ref id) if id == "g.h:art"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_download_saves_jar() {
        let dir = tempfile::tempdir().unwrap();
        let (base, server) = serve_once(http_response("200 OK", b"jar-bytes")).await;
        let fetcher = PluginFetcher::new(None).unwrap();
        let downloaded = fetcher
            .download_url(&format!("{}/dl/Foo.jar", base), dir.path(), "manual-plugin-1.jar")
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(downloaded.bytes, 9);
        assert_eq!(downloaded.files, vec![dir.path().join("Foo.jar")]);
        assert_eq!(std::fs::read(dir.path().join("Foo.jar")).unwrap(), b"jar-bytes");
        assert!(!dir.path().join("Foo.jar.part").exists());
    }

    #[tokio::test]
    async fn test_truncated_download_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut response = b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n".to_vec();
        response.extend_from_slice(b"0123456789");
        let (base, server) = serve_once(response).await;
        let fetcher = PluginFetcher::new(None).unwrap();

        let result = fetcher
            .download_url(&format!("{}/dl/Foo.jar", base), dir.path(), "manual-plugin-1.jar")
            .await;
        server.await.unwrap();

        assert!(result.is_err());
        assert!(!dir.path().join("Foo.jar").exists());
        assert!(!dir.path().join("Foo.jar.part").exists());
    }

    #[tokio::test]
    async fn test_http_error_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let (base, server) = serve_once(http_response("404 Not Found", b"missing")).await;
        let fetcher = PluginFetcher::new(None).unwrap();
        let result = fetcher
            .download_url(&format!("{}/dl/Foo.jar", base), dir.path(), "x.jar")
            .await;
        server.await.unwrap();

        assert!(matches!(result, Err(GeneratorError::Http(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_zip_download_is_extracted_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = zip_bytes(&[("GriefDefender.jar", b"gd"), ("GriefDefender/global.conf", b"x")]);
        let (base, server) = serve_once(http_response("200 OK", &archive)).await;
        let fetcher = PluginFetcher::new(None).unwrap();

        let downloaded = fetcher
            .download_url(&format!("{}/dl/GriefDefender.zip", base), dir.path(), "x.jar")
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(
            downloaded.files,
            vec![
                dir.path().join("GriefDefender.jar"),
                dir.path().join("GriefDefender/global.conf"),
            ]
        );
        assert_eq!(downloaded.bytes, archive.len() as u64);
        assert!(!dir.path().join("GriefDefender.zip").exists());
        assert_eq!(std::fs::read(dir.path().join("GriefDefender.jar")).unwrap(), b"gd");
    }
}
