// Launcher and backup scripts for Linux (bash), Windows PowerShell and cmd

use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::server::jvm::JvmFlags;
use crate::server::template::{render, Variables};

const START_SH: &str = r#"#!/bin/bash
set -euo pipefail
cd "$(dirname "$0")"
SESSION_NAME={{SESSION}}
JAR_FILE={{JAR_FILE}}
if ! command -v tmux >/dev/null 2>&1; then
  echo "tmux is required. Install via 'sudo apt install -y tmux'."
  exit 1
fi
while true; do
  TIMESTAMP=$(date '+%Y-%m-%d %H:%M:%S')
  echo "[$TIMESTAMP] Starting server..."
  tmux new-session -d -s "$SESSION_NAME" "exec java \
    {{JAVA_ARGS}} \
    -jar \"$JAR_FILE\" nogui"
  tmux attach -t "$SESSION_NAME" || true
  echo "Server stopped. Restarting in 10 seconds..."
  tmux kill-session -t "$SESSION_NAME" >/dev/null 2>&1 || true
  sleep 10
done
"#;

const START_PS1: &str = r#"$ErrorActionPreference = "Stop"
$scriptDir = Split-Path -Parent $MyInvocation.MyCommand.Definition
Set-Location $scriptDir
$jarFile = {{JAR_FILE}}
while ($true) {
  $timestamp = Get-Date -Format "yyyy-MM-dd HH:mm:ss"
  Write-Host "[$timestamp] Starting server..."
  $arguments = @(
{{JAVA_ARGS}}
    '-jar',
    $jarFile,
    'nogui'
  )
  & java @arguments
  $exitCode = $LASTEXITCODE
  Write-Host "Server exited with code $exitCode. Restarting in 10 seconds..."
  Start-Sleep -Seconds 10
}
"#;

const START_BAT: &str = r#"@echo off
setlocal
cd /d "%~dp0"
set "JAR_FILE={{JAR_FILE}}"
set "JAVA_FLAGS={{JAVA_ARGS}}"
:loop
echo [%date% %time%] Starting server...
java %JAVA_FLAGS% -jar "%JAR_FILE%" nogui
echo Server exited with code %ERRORLEVEL%. Restarting in 10 seconds...
timeout /t 10 /nobreak >nul
goto loop
"#;

const BACKUP_SH: &str = r#"#!/bin/bash
set -euo pipefail
BASE_DIR="$(cd "$(dirname "$0")" && pwd)"
BACKUP_DIR="$BASE_DIR/backups"
mkdir -p "$BACKUP_DIR"
TIMESTAMP=$(date +"%Y-%m-%d_%H-%M")
ARCHIVE="$BACKUP_DIR/server_$TIMESTAMP.tar.gz"
tar --exclude="./backups" --exclude="./plugins/dynmap/web/tiles" -czf "$ARCHIVE" -C "$BASE_DIR" .
find "$BACKUP_DIR" -type f -name 'server_*.tar.gz' -mtime +7 -delete
echo "Backup complete: $ARCHIVE"
"#;

const BACKUP_PS1: &str = r#"$ErrorActionPreference = "Stop"
$baseDir = Split-Path -Parent $MyInvocation.MyCommand.Definition
$backupDir = Join-Path $baseDir "backups"
if (-not (Test-Path $backupDir)) {
  New-Item -ItemType Directory -Path $backupDir | Out-Null
}
$timestamp = Get-Date -Format "yyyy-MM-dd_HH-mm"
$archivePath = Join-Path $backupDir ("server_{0}.zip" -f $timestamp)
$items = Get-ChildItem -LiteralPath $baseDir -Force | Where-Object { $_.Name -ne "backups" }
if ($items.Count -eq 0) {
  Write-Host "No files to back up."
  exit 0
}
Compress-Archive -Path ($items | ForEach-Object { $_.FullName }) -DestinationPath $archivePath -Force
$threshold = (Get-Date).AddDays(-7)
Get-ChildItem -Path $backupDir -File -Filter "server_*.zip" | Where-Object { $_.LastWriteTime -lt $threshold } | Remove-Item -Force
Write-Host ("Backup complete: {0}" -f $archivePath)
"#;

/// Quote a value as a PowerShell single-quoted literal
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Make a value safe inside `set "NAME=value"` in a batch file
pub fn batch_escape(value: &str) -> String {
    value.replace('"', "").replace('%', "%%")
}

/// Convert to CRLF; cmd.exe mis-parses labels in LF-only batch files
fn crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

pub fn start_sh(config: &ServerConfig, flags: &JvmFlags) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("SESSION", shell_words::quote(config.fork.id()).into_owned());
    vars.insert("JAR_FILE", shell_words::quote(&config.jar_name()).into_owned());
    // one flag per continuation line inside the double-quoted tmux command
    vars.insert("JAVA_ARGS", flags.args().join(" \\\n    "));
    render("start.sh", START_SH, &vars)
}

pub fn start_ps1(config: &ServerConfig, flags: &JvmFlags) -> Result<String> {
    let args = flags
        .args()
        .iter()
        .map(|arg| format!("    {},", ps_quote(arg)))
        .collect::<Vec<_>>()
        .join("\n");
    let mut vars = Variables::new();
    vars.insert("JAR_FILE", ps_quote(&config.jar_name()));
    vars.insert("JAVA_ARGS", args);
    render("start.ps1", START_PS1, &vars)
}

pub fn start_bat(config: &ServerConfig, flags: &JvmFlags) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("JAR_FILE", batch_escape(&config.jar_name()));
    vars.insert("JAVA_ARGS", flags.joined());
    Ok(crlf(&render("start.bat", START_BAT, &vars)?))
}

pub fn backup_sh() -> Result<String> {
    render("backup.sh", BACKUP_SH, &Variables::new())
}

pub fn backup_ps1() -> Result<String> {
    render("backup.ps1", BACKUP_PS1, &Variables::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::Fork;
    use crate::server::template::leftover_placeholders;

    fn config(version: &str) -> ServerConfig {
        ServerConfig {
            output_directory: "/tmp/out".into(),
            version: version.to_string(),
            fork: Fork::Paper,
            ram_gb: 10,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_start_sh_uses_fork_session_and_heap() {
        let cfg = config("1.21.4");
        let script = start_sh(&cfg, &JvmFlags::for_ram(cfg.ram_gb)).unwrap();
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("SESSION_NAME=paper\n"));
        assert!(script.contains("JAR_FILE=paper-1.21.4.jar\n"));
        assert!(script.contains("-Xms10G \\\n    -Xmx10G"));
        assert!(leftover_placeholders(&script).is_empty());
    }

    #[test]
    fn test_start_sh_inner_command_names_validated_jar() {
        let cfg = config("1.21.4-pre1").validated().unwrap();
        let script = start_sh(&cfg, &JvmFlags::for_ram(cfg.ram_gb)).unwrap();
        assert!(script.contains("JAR_FILE=paper-1.21.4-pre1.jar\n"));
        assert!(script.contains("    -jar \\\"$JAR_FILE\\\" nogui\"\n"));
        let bat = start_bat(&cfg, &JvmFlags::for_ram(cfg.ram_gb)).unwrap();
        assert!(bat.contains("set \"JAR_FILE=paper-1.21.4-pre1.jar\"\r\n"));
    }

    #[test]
    fn test_start_ps1_lists_each_flag() {
        let cfg = config("1.21.4");
        let script = start_ps1(&cfg, &JvmFlags::for_ram(cfg.ram_gb)).unwrap();
        assert!(script.contains("$jarFile = 'paper-1.21.4.jar'"));
        assert!(script.contains("    '-Xmx10G',\n"));
        assert!(script.contains("& java @arguments"));
        assert!(leftover_placeholders(&script).is_empty());
    }

    #[test]
    fn test_start_bat_is_crlf() {
        let cfg = config("1.21.4");
        let script = start_bat(&cfg, &JvmFlags::for_ram(cfg.ram_gb)).unwrap();
        assert!(script.starts_with("@echo off\r\n"));
        assert!(!script.replace("\r\n", "").contains('\n'));
        assert!(script.contains("set \"JAVA_FLAGS=-Xms10G -Xmx10G "));
    }

    #[test]
    fn test_escaping_helpers() {
        assert_eq!(ps_quote("it's"), "'it''s'");
        assert_eq!(batch_escape("100%\"x"), "100%%x");
    }

    #[test]
    fn test_backup_scripts_keep_a_week() {
        assert!(backup_sh().unwrap().contains("-mtime +7 -delete"));
        assert!(backup_ps1().unwrap().contains("AddDays(-7)"));
    }
}
