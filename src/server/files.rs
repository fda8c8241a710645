// Server config files, README and VPS helper texts

use crate::error::Result;
use crate::plugins::PluginId;
use crate::server::config::ServerConfig;
use crate::server::template::{render, Variables};

const SERVER_PROPERTIES: &str = r#"#Minecraft server properties
enable-jmx-monitoring=false
rcon.port=25575
level-seed=
gamemode=survival
enable-command-block=false
enable-query=true
generator-settings={}
level-name=world
motd={{MOTD}}
query.port=25565
pvp=true
difficulty=hard
network-compression-threshold=256
require-resource-pack=false
max-tick-time=60000
use-native-transport=true
max-players={{MAX_PLAYERS}}
online-mode={{ONLINE_MODE}}
enable-status=true
allow-flight=false
broadcast-rcon-to-ops=false
view-distance={{VIEW_DISTANCE}}
simulation-distance={{SIMULATION_DISTANCE}}
server-ip=
allow-nether=true
server-port=25565
enable-rcon=false
sync-chunk-writes=false
op-permission-level=4
prevent-proxy-connections=false
resource-pack=
entity-broadcast-range-percentage=75
player-idle-timeout=0
text-filtering-config=
spawn-protection=0
force-gamemode=false
rate-limit=0
hardcore=false
white-list=false
enforce-whitelist=false
broadcast-console-to-ops=true
spawn-npcs=true
spawn-animals=true
spawn-monsters=true
function-permission-level=2
level-type=minecraft\:normal
"#;

const PURPUR_YML: &str = r#"settings:
  check-for-updates: false
  bStats: true
world-settings:
  default:
    redstone:
      optimize: true
      use-vanilla-logic: false
    alt-item-drops: true
    armor-stand:
      tick: false
    bat-go-to-sleep: true
    block-fall-time: 2
    disable-teleporting-dropping-items: true
    experience:
      merge-radius: 4.0
    item:
      merge-radius: 4.0
    block-ticking:
      max-tile-ticks-per-tick: 1000
    entity-tracking-range:
      players: 64
      animals: 48
      monsters: 48
      misc: 32
    entity-activation-range:
      animals: 24
      monsters: 32
      raiders: 48
      misc: 16
    mob-spawning:
      animal-cap: 32
      monster-cap: 70
      ambient-cap: 10
      water-animal-cap: 15
      water-ambient-cap: 20
    hopper:
      disable-move-event: true
      cooldown-when-full: true
    player:
      use-alternate-keepalive: true
      portal-search-radius: 64
    villager:
      search-radius: 40
      work-immunity-after: 20
      activate-brain-ticks: 1
    tnt:
      allow-multi-ignite: false
      detonate-on-player-interact: false
"#;

const PAPER_YML: &str = r#"timings:
  enabled: false
settings:
  velocity-support:
    enabled: {{VELOCITY}}
    online-mode: true
    secret: change-me-for-velocity
world-settings:
  default:
    view-distance: {{VIEW_DISTANCE}}
    simulation-distance: {{SIMULATION_DISTANCE}}
    enable-treasure-maps: false
    despawn-ranges:
      monster: 48
      creature: 32
      ambient: 24
      axolotls: 24
    entity-per-chunk-save-limit:
      area_effect_cloud: 16
      arrow: 32
      lightning_bolt: 1
    hopper:
      cooldown-when-full: true
      disable-move-event: true
    fixed-chunk-inhabitants: true
    chunks-per-tick: 6
    max-auto-save-chunks-per-tick: 12
    anti-xray:
      enabled: true
      engine-mode: 2
      hidden-blocks:
        - copper_ore
        - iron_ore
        - gold_ore
        - diamond_ore
        - deepslate_diamond_ore
        - ancient_debris
    use-faster-eigencraft-redstone: true
    tick-rates:
      behavior: 3
      sensor: 2
    mob-spawn-limits:
      monsters: 55
      animals: 30
      water-animals: 10
      water-ambient: 20
      ambient: 5
"#;

const README_MD: &str = r#"# {{SERVER_NAME}} Deployment Guide

{{FORK}} {{VERSION}} server with a {{RAM}} GB heap, generated for up to {{MAX_PLAYERS}} players.

## Requirements
- Ubuntu 24.04 LTS VPS (8c/16t CPU, 32 GB RAM, 200 GB NVMe, 1 Gbps)
- Java 21 (Eclipse Temurin) installed system-wide

## Quick Start (Linux)
- Upload this folder to `/opt/minecraft/server` (owner `mc` user).
- Run `./setup.sh` once on a fresh VPS for firewall, swap and Java install.
- Download the server jar listed in `JAR_DOWNLOAD.txt` and save it as `{{JAR_FILE}}`.
{{LINUX_PLUGIN_STEP}}- Start the server with `./start.sh` (tmux auto-restart). Use `tmux attach -t {{SESSION}}` to view the console.
- In-game: `/op YourName`{{LUCKPERMS_ADMIN}}.

## Quick Start (Windows 10/11)
- Install Java 21 and make sure it is on PATH (see `REQUIRED DOWNLOAD!!!.txt`).
{{WINDOWS_PLUGIN_STEP}}- Run `powershell -ExecutionPolicy Bypass -File .\start.ps1` for auto-restarts, or double-click `start.bat`.
- Use `powershell -ExecutionPolicy Bypass -File .\backup.ps1` or Task Scheduler for periodic ZIP backups.
- Type `stop` in the console to shut down cleanly before closing the window.

## Included Files
{{FILE_LIST}}
## Backups & Restarts
- Cron: `0 * * * * /opt/minecraft/server/backup.sh` and `0 */6 * * * tmux send-keys -t {{SESSION}} "stop" ENTER`.

## Monitoring
- `tail -f logs/latest.log`, `htop`, `df -h`.
{{PLUGIN_TIPS}}{{VELOCITY_SECTION}}"#;

const VELOCITY_SECTION: &str = r#"
## Scaling with Velocity/Bungee
- Deploy a Velocity proxy and copy its `forwarding-secret` into `paper.yml`.
- Set `online-mode=false` in `server.properties` on backend servers when proxying.
- Move lobby/resource worlds onto dedicated servers and share permissions through a LuckPerms database.
"#;

const SETUP_SH: &str = r#"#!/bin/bash
set -euo pipefail
echo "Updating system packages..."
apt update && apt -y upgrade
echo "Installing base utilities..."
apt install -y curl wget git unzip htop screen tmux ufw fail2ban
if ! command -v java >/dev/null 2>&1; then
  echo "Installing Eclipse Temurin 21..."
  apt install -y wget apt-transport-https gpg
  wget -O- https://packages.adoptium.net/artifactory/api/gpg/key/public | gpg --dearmor | tee /etc/apt/keyrings/adoptium.gpg >/dev/null
  echo "deb [signed-by=/etc/apt/keyrings/adoptium.gpg] https://packages.adoptium.net/artifactory/deb noble main" > /etc/apt/sources.list.d/adoptium.list
  apt update && apt install -y temurin-21-jdk
fi
echo "Configuring firewall..."
ufw default deny incoming
ufw default allow outgoing
ufw allow 22/tcp
ufw allow 25565/tcp
ufw allow 25565/udp
{{EXTRA_PORTS}}ufw --force enable
echo "Enabling fail2ban..."
systemctl enable --now fail2ban
if ! swapon --show | grep -q swapfile; then
  fallocate -l 8G /swapfile
  chmod 600 /swapfile
  mkswap /swapfile
  swapon /swapfile
  echo '/swapfile none swap sw 0 0' >> /etc/fstab
fi
echo "Setup complete. Review /etc/fail2ban/jail.local and secure SSH keys."
"#;

const JAVA_NOTICE: &str = r#"REQUIRED DOWNLOAD!!!

Please install Java 21 LTS before launching the server on Windows.
Download the official Eclipse Temurin installer from:
https://adoptium.net/temurin/releases/?version=21&os=windows
"#;

const JAR_PLACEHOLDER: &str = r#"Download the {{FORK}} server jar from:
{{JAR_URL}}
Save it as {{JAR_FILE}} in this folder.
"#;

pub fn server_properties(config: &ServerConfig) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("MOTD", format!("{} | Economy - Claims - Skills", config.server_name));
    vars.insert("MAX_PLAYERS", config.max_players.to_string());
    vars.insert("VIEW_DISTANCE", config.view_distance.to_string());
    vars.insert("SIMULATION_DISTANCE", config.simulation_distance.to_string());
    // backends behind a Velocity proxy let the proxy authenticate
    vars.insert("ONLINE_MODE", (!config.enable_velocity).to_string());
    render("server.properties", SERVER_PROPERTIES, &vars)
}

pub fn purpur_yml() -> Result<String> {
    render("purpur.yml", PURPUR_YML, &Variables::new())
}

pub fn paper_yml(config: &ServerConfig) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("VELOCITY", config.enable_velocity.to_string());
    vars.insert("VIEW_DISTANCE", config.view_distance.to_string());
    vars.insert("SIMULATION_DISTANCE", config.simulation_distance.to_string());
    render("paper.yml", PAPER_YML, &vars)
}

pub fn setup_sh(config: &ServerConfig) -> Result<String> {
    let mut vars = Variables::new();
    let extra = if config.has_plugin(PluginId::Dynmap) {
        "ufw allow 8123/tcp\n".to_string()
    } else {
        String::new()
    };
    vars.insert("EXTRA_PORTS", extra);
    render("setup.sh", SETUP_SH, &vars)
}

pub fn java_notice() -> Result<String> {
    render("REQUIRED DOWNLOAD!!!.txt", JAVA_NOTICE, &Variables::new())
}

pub fn jar_placeholder(config: &ServerConfig) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("FORK", config.fork.to_string());
    vars.insert("JAR_URL", config.jar_download_url());
    vars.insert("JAR_FILE", config.jar_name());
    render("JAR_DOWNLOAD.txt", JAR_PLACEHOLDER, &vars)
}

/// Deployment guide. `files` is the (path, description) list of every
/// other generated file, in output order.
pub fn readme(config: &ServerConfig, files: &[(String, String)]) -> Result<String> {
    let mut vars = Variables::new();
    vars.insert("SERVER_NAME", config.server_name.clone());
    vars.insert("FORK", config.fork.to_string());
    vars.insert("VERSION", config.version.clone());
    vars.insert("RAM", config.ram_gb.to_string());
    vars.insert("MAX_PLAYERS", config.max_players.to_string());
    vars.insert("JAR_FILE", config.jar_name());
    vars.insert("SESSION", config.fork.id().to_string());

    let (linux_step, windows_step) = if config.wants_plugins_dir() {
        (
            "- Download plugins: `cd plugins && ./download_plugins.sh`.\n",
            "- Run `powershell -ExecutionPolicy Bypass -File .\\plugins\\download_plugins.ps1`.\n",
        )
    } else {
        ("", "")
    };
    vars.insert("LINUX_PLUGIN_STEP", linux_step.to_string());
    vars.insert("WINDOWS_PLUGIN_STEP", windows_step.to_string());

    let admin = if config.has_plugin(PluginId::LuckPerms) {
        ", `/lp user YourName parent set admin`"
    } else {
        ""
    };
    vars.insert("LUCKPERMS_ADMIN", admin.to_string());

    let mut list = String::new();
    for (path, description) in files {
        list.push_str(&format!("- `{}`: {}\n", path, description));
    }
    list.push_str("- `README.md`: this file.\n");
    vars.insert("FILE_LIST", list);

    vars.insert("PLUGIN_TIPS", plugin_tips(config));
    let velocity = if config.enable_velocity {
        VELOCITY_SECTION.to_string()
    } else {
        String::new()
    };
    vars.insert("VELOCITY_SECTION", velocity);

    render("README.md", README_MD, &vars)
}

fn plugin_tips(config: &ServerConfig) -> String {
    let mut tips = String::new();
    if config.has_plugin(PluginId::Spark) {
        tips.push_str("- `/spark profiler --timeout 60` then `/spark tps`.\n");
    }
    if config.has_plugin(PluginId::Chunky) {
        tips.push_str(
            "\n## World Pre-Generation\n- Run `/chunky world world`, `/chunky radius 5000`, `/chunky start` after first join.\n",
        );
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn config() -> ServerConfig {
        ServerConfig {
            output_directory: "/tmp/out".into(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_server_properties_uses_form_values() {
        let cfg = ServerConfig {
            server_name: "Cozy".to_string(),
            max_players: 42,
            view_distance: 10,
            simulation_distance: 4,
            ..config()
        };
        let text = server_properties(&cfg).unwrap();
        assert!(text.contains("motd=Cozy | Economy - Claims - Skills\n"));
        assert!(text.contains("max-players=42\n"));
        assert!(text.contains("view-distance=10\n"));
        assert!(text.contains("simulation-distance=4\n"));
        assert!(text.contains("online-mode=true\n"));
    }

    #[test]
    fn test_velocity_flips_online_mode_and_paper_support() {
        let cfg = ServerConfig {
            enable_velocity: true,
            ..config()
        };
        assert!(server_properties(&cfg).unwrap().contains("online-mode=false\n"));
        assert!(paper_yml(&cfg).unwrap().contains("    enabled: true\n"));
        assert!(readme(&cfg, &[]).unwrap().contains("## Scaling with Velocity/Bungee"));
    }

    #[test]
    fn test_readme_without_plugins_skips_plugin_steps() {
        let cfg = ServerConfig {
            selected_plugins: BTreeSet::new(),
            ..config()
        };
        let text = readme(&cfg, &[("start.sh".to_string(), "launcher".to_string())]).unwrap();
        assert!(!text.contains("download_plugins"));
        assert!(!text.contains("/lp user"));
        assert!(text.contains("- `start.sh`: launcher\n"));
    }

    #[test]
    fn test_setup_opens_dynmap_port_only_when_selected() {
        assert!(setup_sh(&config()).unwrap().contains("ufw allow 8123/tcp"));
        let bare = ServerConfig {
            selected_plugins: BTreeSet::new(),
            ..config()
        };
        assert!(!setup_sh(&bare).unwrap().contains("8123"));
    }

    #[test]
    fn test_jar_placeholder() {
        let text = jar_placeholder(&config()).unwrap();
        assert!(text.contains("https://api.purpurmc.org/v2/purpur/1.21.10/latest/download"));
        assert!(text.contains("Save it as purpur-1.21.10.jar"));
    }
}
