// download_plugins.sh / download_plugins.ps1 generation
//
// GitHub-release and Maven plugins are resolved when the script runs, so
// generating the scripts never touches the network.

use std::collections::BTreeSet;

use crate::plugins::catalog::{file_name_from_url, is_zip, PluginId, PluginSource};
use crate::server::scripts::ps_quote;

/// One download performed by the generated scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStep {
    Direct {
        label: String,
        url: String,
        file: String,
    },
    GithubRelease {
        label: String,
        owner: &'static str,
        repo: &'static str,
        asset_pattern: &'static str,
        manual_url: String,
    },
    Maven {
        label: String,
        base_url: &'static str,
        group: &'static str,
        artifact: &'static str,
        manual_url: String,
    },
}

/// Steps for the selected catalog plugins (catalog order), then extra URLs
pub fn download_steps(plugins: &BTreeSet<PluginId>, extra_urls: &[String]) -> Vec<DownloadStep> {
    let mut steps: Vec<DownloadStep> = plugins
        .iter()
        .map(|&id| {
            let label = id.name().to_string();
            let source = id.source();
            match source {
                PluginSource::Direct { url } => DownloadStep::Direct {
                    label,
                    url: url.to_string(),
                    file: file_name_from_url(url, &id.fallback_file_name()),
                },
                PluginSource::GithubRelease {
                    owner,
                    repo,
                    asset_pattern,
                } => DownloadStep::GithubRelease {
                    label,
                    owner,
                    repo,
                    asset_pattern,
                    manual_url: source.display_url(),
                },
                PluginSource::Maven {
                    base_url,
                    group,
                    artifact,
                } => DownloadStep::Maven {
                    label,
                    base_url,
                    group,
                    artifact,
                    manual_url: source.display_url(),
                },
            }
        })
        .collect();

    for (index, url) in extra_urls.iter().enumerate() {
        let fallback = format!("manual-plugin-{}.jar", index + 1);
        steps.push(DownloadStep::Direct {
            label: format!("manual plugin {}", index + 1),
            url: url.clone(),
            file: file_name_from_url(url, &fallback),
        });
    }
    steps
}

fn group_path(group: &str) -> String {
    group.replace('.', "/")
}

/// Asset-name regex turned into one matched against the whole download URL
fn url_pattern(asset_pattern: &str) -> String {
    format!("/{}", asset_pattern.trim_start_matches('^'))
}

const SH_GITHUB_HELPER: &str = r#"github_asset() {
  curl -fsSL ${GITHUB_TOKEN:+-H "Authorization: Bearer $GITHUB_TOKEN"} "https://api.github.com/repos/$1/releases/latest" \
    | grep -o '"browser_download_url": *"[^"]*"' \
    | sed -E 's/.*"([^"]*)"$/\1/' \
    | grep -E "$2" | head -n 1
}"#;

const SH_MAVEN_HELPER: &str = r#"maven_release() {
  curl -fsSL "$1/maven-metadata.xml" \
    | grep -o '<release>[^<]*</release>' \
    | sed -E 's#</?release>##g' | head -n 1
}"#;

pub fn render_sh(steps: &[DownloadStep]) -> String {
    let q = |s: &str| shell_words::quote(s).into_owned();
    let mut lines: Vec<String> = vec![
        "#!/bin/bash".to_string(),
        "set -euo pipefail".to_string(),
        "cd \"$(dirname \"$0\")\"".to_string(),
    ];

    if steps.iter().any(|s| matches!(s, DownloadStep::GithubRelease { .. })) {
        lines.push(SH_GITHUB_HELPER.to_string());
    }
    if steps.iter().any(|s| matches!(s, DownloadStep::Maven { .. })) {
        lines.push(SH_MAVEN_HELPER.to_string());
    }

    for step in steps {
        match step {
            DownloadStep::Direct { label, url, file } => {
                lines.push(format!("echo {}", q(&format!("Downloading {}...", label))));
                if is_zip(file) {
                    lines.push(format!(
                        "wget -O {f} {u} && unzip -o {f} && rm {f}",
                        f = q(file),
                        u = q(url)
                    ));
                } else {
                    lines.push(format!("wget -O {} {}", q(file), q(url)));
                }
            }
            DownloadStep::GithubRelease {
                label,
                owner,
                repo,
                asset_pattern,
                manual_url,
            } => {
                lines.push(format!("echo {}", q(&format!("Downloading {}...", label))));
                lines.push(format!(
                    "URL=$(github_asset {} {} || true)",
                    q(&format!("{}/{}", owner, repo)),
                    q(&url_pattern(asset_pattern))
                ));
                lines.push(format!(
                    "if [ -n \"$URL\" ]; then wget -O \"$(basename \"$URL\")\" \"$URL\"; else echo {}; fi",
                    q(&format!("Manual download required for {}: {}", label, manual_url))
                ));
            }
            DownloadStep::Maven {
                label,
                base_url,
                group,
                artifact,
                manual_url,
            } => {
                let artifact_url = format!(
                    "{}/{}/{}",
                    base_url.trim_end_matches('/'),
                    group_path(group),
                    artifact
                );
                lines.push(format!("echo {}", q(&format!("Downloading {}...", label))));
                lines.push(format!("VERSION=$(maven_release {} || true)", q(&artifact_url)));
                lines.push(format!(
                    "if [ -n \"$VERSION\" ]; then wget -O \"{a}-$VERSION.jar\" {base}\"/$VERSION/{a}-$VERSION.jar\"; else echo {msg}; fi",
                    a = artifact,
                    base = q(&artifact_url),
                    msg = q(&format!("Manual download required for {}: {}", label, manual_url))
                ));
            }
        }
    }

    lines.join("\n") + "\n"
}

pub fn render_ps1(steps: &[DownloadStep]) -> String {
    let mut lines: Vec<String> = vec![
        "$ErrorActionPreference = \"Stop\"".to_string(),
        "$scriptDir = Split-Path -Parent $MyInvocation.MyCommand.Definition".to_string(),
        "Set-Location $scriptDir".to_string(),
    ];

    if steps.iter().any(|s| matches!(s, DownloadStep::GithubRelease { .. })) {
        lines.push("$headers = @{ Accept = 'application/vnd.github+json' }".to_string());
        lines.push(
            "if ($env:GITHUB_TOKEN) { $headers['Authorization'] = \"Bearer $($env:GITHUB_TOKEN)\" }"
                .to_string(),
        );
    }

    for step in steps {
        match step {
            DownloadStep::Direct { label, url, file } => {
                lines.push(format!("Write-Host {}", ps_quote(&format!("Downloading {}...", label))));
                lines.push(format!(
                    "Invoke-WebRequest -Uri {} -OutFile {} -UseBasicParsing",
                    ps_quote(url),
                    ps_quote(file)
                ));
                if is_zip(file) {
                    lines.push(format!(
                        "Expand-Archive -LiteralPath {} -DestinationPath . -Force",
                        ps_quote(file)
                    ));
                    lines.push(format!("Remove-Item {} -Force", ps_quote(file)));
                }
            }
            DownloadStep::GithubRelease {
                label,
                owner,
                repo,
                asset_pattern,
                manual_url,
            } => {
                lines.push(format!("Write-Host {}", ps_quote(&format!("Downloading {}...", label))));
                lines.push(format!(
                    "$release = Invoke-RestMethod -Uri {} -Headers $headers",
                    ps_quote(&format!(
                        "https://api.github.com/repos/{}/{}/releases/latest",
                        owner, repo
                    ))
                ));
                lines.push(format!(
                    "$asset = $release.assets | Where-Object {{ $_.name -match {} }} | Select-Object -First 1",
                    ps_quote(asset_pattern)
                ));
                lines.push(format!(
                    "if ($asset) {{ Invoke-WebRequest -Uri $asset.browser_download_url -OutFile $asset.name -UseBasicParsing }} else {{ Write-Host {} }}",
                    ps_quote(&format!("Manual download required for {}: {}", label, manual_url))
                ));
            }
            DownloadStep::Maven {
                label,
                base_url,
                group,
                artifact,
                manual_url,
            } => {
                let artifact_url = format!(
                    "{}/{}/{}",
                    base_url.trim_end_matches('/'),
                    group_path(group),
                    artifact
                );
                lines.push(format!("Write-Host {}", ps_quote(&format!("Downloading {}...", label))));
                lines.push(format!(
                    "[xml]$metadata = (Invoke-WebRequest -Uri {} -UseBasicParsing).Content",
                    ps_quote(&format!("{}/maven-metadata.xml", artifact_url))
                ));
                lines.push("$version = $metadata.metadata.versioning.release".to_string());
                lines.push(
                    "if (-not $version) { $version = $metadata.metadata.versioning.latest }".to_string(),
                );
                lines.push(format!(
                    "if ($version) {{ Invoke-WebRequest -Uri ({} -f $version) -OutFile ({} -f $version) -UseBasicParsing }} else {{ Write-Host {} }}",
                    ps_quote(&format!("{}/{{0}}/{}-{{0}}.jar", artifact_url, artifact)),
                    ps_quote(&format!("{}-{{0}}.jar", artifact)),
                    ps_quote(&format!("Manual download required for {}: {}", label, manual_url))
                ));
            }
        }
    }

    lines.join("\n") + "\n"
}
