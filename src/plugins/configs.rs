// Starter config files for plugins that need more than their defaults

use crate::error::Result;
use crate::plugins::PluginId;
use crate::server::config::ServerConfig;
use crate::server::renderer::GeneratedFile;
use crate::server::template::{render, Variables};

/// A LuckPerms group with its permission nodes, each owned by a plugin
pub struct Rank {
    pub name: &'static str,
    pub weight: u32,
    pub inherits: Option<&'static str>,
    /// Grants `*` instead of listing nodes
    pub wildcard: bool,
    pub permissions: &'static [(PluginId, &'static str)],
}

/// default -> vip -> mod -> admin, each inheriting the previous
pub const RANKS: [Rank; 4] = [
    Rank {
        name: "default",
        weight: 1,
        inherits: None,
        wildcard: false,
        permissions: &[
            (PluginId::EssentialsX, "essentials.home"),
            (PluginId::EssentialsX, "essentials.spawn"),
            (PluginId::EssentialsX, "essentials.msg"),
            (PluginId::EssentialsX, "essentials.balance"),
            (PluginId::GriefDefender, "griefdefender.claim.basic"),
            (PluginId::McMmo, "mcmmo.skills.*"),
            (PluginId::Shopkeepers, "shopkeepers.trade"),
            (PluginId::Dynmap, "dynmap.webchat"),
            (PluginId::PlayerWarps, "playerwarps.use"),
            (PluginId::Chunky, "chunky.use"),
        ],
    },
    Rank {
        name: "vip",
        weight: 10,
        inherits: Some("default"),
        wildcard: false,
        permissions: &[
            (PluginId::EssentialsX, "essentials.sethome.multiple.vip"),
            (PluginId::EssentialsX, "essentials.kits.vip"),
            (PluginId::EssentialsX, "essentials.repair"),
            (PluginId::GriefDefender, "griefdefender.claim.blocks.extra.5000"),
            (PluginId::McMmo, "mcmmo.ability.doublexp"),
            (PluginId::Dynmap, "dynmap.marker.create"),
        ],
    },
    Rank {
        name: "mod",
        weight: 50,
        inherits: Some("vip"),
        wildcard: false,
        permissions: &[
            (PluginId::EssentialsX, "essentials.kick"),
            (PluginId::EssentialsX, "essentials.tempban"),
            (PluginId::AdvancedBan, "advancedban.tempban"),
            (PluginId::LiteBans, "litebans.tempban"),
            (PluginId::CoreProtect, "coreprotect.inspect"),
            (PluginId::CoreProtect, "coreprotect.rollback"),
            (PluginId::GriefDefender, "griefdefender.claim.manage"),
            (PluginId::WorldGuard, "worldguard.region.info"),
            (PluginId::Matrix, "matrix.notify"),
            (PluginId::Spark, "spark.viewer"),
        ],
    },
    Rank {
        name: "admin",
        weight: 100,
        inherits: Some("mod"),
        wildcard: true,
        permissions: &[],
    },
];

const LUCKPERMS_GROUP: &str = r#"name: {{NAME}}
weight: {{WEIGHT}}
inheritances:
{{INHERITS}}
permissions:
{{PERMISSIONS}}
"#;

const ESSENTIALS_CONFIG: &str = r#"settings:
  locale: en_US
  debug: false
  starting-balance: 500
  currency-symbol: "$"
newbies:
  kit: starter
spawnpoint:
  world: world
  x: 0.5
  y: 100
  z: 0.5
kits:
  starter:
    delay: 86400
    items:
      - "stone_sword 1"
      - "bread 16"
  vip:
    delay: 43200
    items:
      - "diamond_sword 1 sharpness:2"
      - "golden_apple 3"
chat:
  format: "&7[{GROUP}] &f{DISPLAYNAME}&7: &f{MESSAGE}"
  radius: 0
homes:
  per-group:
{{HOMES}}
teleport-cooldown: 3
teleport-delay: 3
"#;

const GRIEFDEFENDER_CONFIG: &str = r#"claim-management:
  initial-claim-blocks: 2000
  accrual-blocks-per-hour: 150
  max-accrual-blocks: 12000
  abandons-restore-nature: true
options:
  player-command-enter-claim: true
  claim-auto-extend-min-size: 10
  grief-defender-says: "&6[Claims]&f"
flags:
  block-break: deny
  block-place: deny
  entity-damage: allow
storage:
  provider: file
"#;

const DYNMAP_CONFIG: &str = r#"update-interval: 300
webserver-bindaddress: 0.0.0.0
webserver-port: 8123
defaultzoom: 2
enable-web-login: false
use-chunk-timestamps: true
processed-tiles-per-tick: 32
render-triggers:
  - blockplaced
  - blockbreak
  - playerjoin
  - playerquit
  - chunkgenerated
"#;

const MCMMO_CONFIG: &str = r#"experience:
  base-multiplier: 1.0
  mob-spawners: 0.2
  fishing: 0.8
skills:
  enable-pvp-skill-damage: false
  ability-length-modifier: 1.0
cooldowns:
  tree-feller: 240
  serrated-strikes: 240
  giga-drill-breaker: 240
"#;

/// Homes per rank for EssentialsX
const HOMES_PER_RANK: [(&str, u32); 3] = [("default", 1), ("vip", 5), ("mod", 10)];

fn yaml_list(items: &[String]) -> String {
    if items.is_empty() {
        "  []".to_string()
    } else {
        items
            .iter()
            .map(|item| format!("  - {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render one LuckPerms group, keeping only nodes of selected plugins
pub fn luckperms_group(rank: &Rank, config: &ServerConfig) -> Result<String> {
    let inherits: Vec<String> = rank.inherits.iter().map(|s| s.to_string()).collect();
    let permissions: Vec<String> = if rank.wildcard {
        vec!["'*'".to_string()]
    } else {
        rank.permissions
            .iter()
            .filter(|(plugin, _)| config.has_plugin(*plugin))
            .map(|(_, node)| node.to_string())
            .collect()
    };

    let mut vars = Variables::new();
    vars.insert("NAME", rank.name.to_string());
    vars.insert("WEIGHT", rank.weight.to_string());
    vars.insert("INHERITS", yaml_list(&inherits));
    vars.insert("PERMISSIONS", yaml_list(&permissions));
    render(&format!("{}.yml", rank.name), LUCKPERMS_GROUP, &vars)
}

pub fn essentials_config() -> Result<String> {
    let homes = HOMES_PER_RANK
        .iter()
        .map(|(rank, count)| format!("    {}: {}", rank, count))
        .collect::<Vec<_>>()
        .join("\n");
    let mut vars = Variables::new();
    vars.insert("HOMES", homes);
    render("Essentials/config.yml", ESSENTIALS_CONFIG, &vars)
}

/// Config files for the selected plugins, in catalog order
pub fn plugin_config_files(config: &ServerConfig) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();

    if config.has_plugin(PluginId::LuckPerms) {
        for rank in &RANKS {
            files.push(GeneratedFile::new(
                format!("plugins/LuckPerms/yaml-storage/groups/{}.yml", rank.name),
                format!("LuckPerms `{}` rank (weight {})", rank.name, rank.weight),
                luckperms_group(rank, config)?,
            ));
        }
    }
    if config.has_plugin(PluginId::EssentialsX) {
        files.push(GeneratedFile::new(
            "plugins/Essentials/config.yml",
            "EssentialsX kits, $ economy, spawn and homes",
            essentials_config()?,
        ));
    }
    if config.has_plugin(PluginId::GriefDefender) {
        files.push(GeneratedFile::new(
            "plugins/GriefDefender/global.conf",
            "GriefDefender: 2,000 starting claim blocks, 150/hour accrual",
            render("GriefDefender/global.conf", GRIEFDEFENDER_CONFIG, &Variables::new())?,
        ));
    }
    if config.has_plugin(PluginId::Dynmap) {
        files.push(GeneratedFile::new(
            "plugins/Dynmap/configuration.txt",
            "Dynmap web map on 0.0.0.0:8123",
            render("Dynmap/configuration.txt", DYNMAP_CONFIG, &Variables::new())?,
        ));
    }
    if config.has_plugin(PluginId::McMmo) {
        files.push(GeneratedFile::new(
            "plugins/mcMMO/config.yml",
            "mcMMO settings tuned for SMP",
            render("mcMMO/config.yml", MCMMO_CONFIG, &Variables::new())?,
        ));
    }

    Ok(files)
}
