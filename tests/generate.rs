use std::collections::BTreeSet;
use std::path::Path;

use minecraft_server_generator_lib::commands::{
    generate_server, install_plugins, list_plugins, preview_server, GenerateRequest, InstallRequest,
};
use minecraft_server_generator_lib::plugins::PluginId;
use minecraft_server_generator_lib::server::build_file_map;
use minecraft_server_generator_lib::{Fork, ServerConfig};

fn form(output: &Path) -> ServerConfig {
    ServerConfig {
        output_directory: output.to_path_buf(),
        server_name: "Test SMP".to_string(),
        version: "1.21.4".to_string(),
        ram_gb: 16,
        ..ServerConfig::default()
    }
}

fn request(config: ServerConfig) -> GenerateRequest {
    GenerateRequest {
        config,
        download_jar: false,
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn generate_writes_complete_tree() {
    let dir = tempfile::tempdir().unwrap();
    let report = generate_server(request(form(dir.path()))).await.unwrap();

    let target = dir.path().join("Test-SMP-server");
    assert_eq!(report.target, target);
    for name in [
        "start.sh",
        "start.ps1",
        "start.bat",
        "backup.sh",
        "backup.ps1",
        "setup.sh",
        "server.properties",
        "paper.yml",
        "purpur.yml",
        "JAR_DOWNLOAD.txt",
        "REQUIRED DOWNLOAD!!!.txt",
        "README.md",
        "plugins/download_plugins.sh",
        "plugins/download_plugins.ps1",
        "plugins/LuckPerms/yaml-storage/groups/admin.yml",
        "plugins/Essentials/config.yml",
    ] {
        assert!(target.join(name).is_file(), "missing {}", name);
    }

    let start = read(&target.join("start.sh"));
    assert!(start.contains("-Xms16G"));
    assert!(start.contains("-Xmx16G"));
    assert!(start.contains("-XX:G1NewSizePercent=40"));
    assert!(read(&target.join("README.md")).contains("# Test SMP Deployment Guide"));
    assert!(report.server_jar.is_none());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(target.join("start.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[tokio::test]
async fn regenerating_produces_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("Test-SMP-server");

    generate_server(request(form(dir.path()))).await.unwrap();
    let first: Vec<(String, Vec<u8>)> = build_file_map(&form(dir.path()))
        .unwrap()
        .into_iter()
        .map(|f| {
            let bytes = std::fs::read(target.join(&f.path)).unwrap();
            (f.path, bytes)
        })
        .collect();

    generate_server(request(form(dir.path()))).await.unwrap();
    for (path, bytes) in first {
        assert_eq!(std::fs::read(target.join(&path)).unwrap(), bytes, "{} changed", path);
    }
}

#[tokio::test]
async fn zero_plugins_leaves_only_jar_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        selected_plugins: BTreeSet::new(),
        fork: Fork::Spigot,
        ..form(dir.path())
    };
    let report = generate_server(request(config)).await.unwrap();

    assert!(!report.target.join("plugins").exists());
    assert!(report.target.join("JAR_DOWNLOAD.txt").is_file());
    assert!(!report.target.join("paper.yml").exists());
    assert!(report.files.iter().all(|f| !f.path.starts_with("plugins/")));
}

#[tokio::test]
async fn low_ram_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        ram_gb: 4,
        ..form(dir.path())
    };
    let err = generate_server(request(config)).await.unwrap_err();
    assert!(err.contains("at least 5 GB"), "{}", err);
    assert!(!dir.path().join("Test-SMP-server").exists());
}

#[tokio::test]
async fn preview_matches_generated_files() {
    let dir = tempfile::tempdir().unwrap();
    let text = preview_server(form(dir.path())).await.unwrap();
    assert!(text.contains("## start.bat\n@echo off\r\n"));
    assert!(text.contains("## plugins/download_plugins.sh\n"));
    assert!(!dir.path().join("Test-SMP-server").exists());
}

#[tokio::test]
async fn catalog_lists_every_plugin() {
    let catalog = list_plugins().await.unwrap();
    assert_eq!(catalog.len(), PluginId::ALL.len());
    assert_eq!(catalog[0].name, "LuckPerms");
    assert!(!catalog.last().unwrap().default_selected);
}

#[tokio::test]
async fn install_into_missing_server_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = install_plugins(InstallRequest {
        server_path: dir.path().join("nope"),
        plugins: [PluginId::Spark].into_iter().collect(),
        manual_urls: Vec::new(),
        download_now: false,
        github_token: None,
    })
    .await
    .unwrap_err();
    assert!(err.contains("does not exist"), "{}", err);
}

#[tokio::test]
async fn install_requires_something_to_install() {
    let dir = tempfile::tempdir().unwrap();
    let err = install_plugins(InstallRequest {
        server_path: dir.path().to_path_buf(),
        plugins: BTreeSet::new(),
        manual_urls: vec!["   ".to_string()],
        download_now: false,
        github_token: None,
    })
    .await
    .unwrap_err();
    assert!(err.contains("at least one plugin"), "{}", err);
}

#[tokio::test]
async fn install_writes_download_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let report = install_plugins(InstallRequest {
        server_path: dir.path().to_path_buf(),
        plugins: [PluginId::Vault, PluginId::WorldEdit].into_iter().collect(),
        manual_urls: vec!["https://example.com/dl/Cool-1.0.jar".to_string()],
        download_now: false,
        github_token: Some("ghp_secret".to_string()),
    })
    .await
    .unwrap();

    assert_eq!(report.plugins_dir, dir.path().join("plugins"));
    assert_eq!(report.scripts.len(), 2);
    assert!(report.downloaded.is_empty());

    let sh = read(&dir.path().join("plugins/download_plugins.sh"));
    assert!(sh.contains("Vault.jar"));
    assert!(sh.contains("maven_release"));
    assert!(sh.contains("Cool-1.0.jar"));
    assert!(!sh.contains("ghp_secret"));
}
