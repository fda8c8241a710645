use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeneratorError;

/// Every plugin the generator knows how to download and pre-configure.
///
/// Declaration order is the catalog order; `Ord` follows it so a
/// `BTreeSet<PluginId>` always iterates in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PluginId {
    LuckPerms,
    Vault,
    EssentialsX,
    EssentialsXChat,
    EssentialsXSpawn,
    WorldEdit,
    WorldGuard,
    GriefDefender,
    CoreProtect,
    Matrix,
    AdvancedBan,
    Shopkeepers,
    #[serde(rename = "mcMMO")]
    McMmo,
    Dynmap,
    Spark,
    Chunky,
    ViaVersion,
    ViaBackwards,
    ViaRewind,
    #[serde(rename = "EconomyShopGUI")]
    EconomyShopGui,
    PlayerWarps,
    BetterSleeping3,
    LiteBans,
}

/// Where a plugin artifact comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSource {
    Direct {
        url: &'static str,
    },
    /// Latest GitHub release, first asset whose name matches `asset_pattern`
    GithubRelease {
        owner: &'static str,
        repo: &'static str,
        asset_pattern: &'static str,
    },
    /// Latest release listed in the artifact's maven-metadata.xml
    Maven {
        base_url: &'static str,
        group: &'static str,
        artifact: &'static str,
    },
}

impl PluginSource {
    /// Human-facing URL for tooltips and manual download hints
    pub fn display_url(&self) -> String {
        match self {
            PluginSource::Direct { url } => url.to_string(),
            PluginSource::GithubRelease { owner, repo, .. } => {
                format!("https://github.com/{}/{}/releases/latest", owner, repo)
            }
            PluginSource::Maven {
                base_url,
                group,
                artifact,
            } => format!(
                "{}/{}/{}/",
                base_url.trim_end_matches('/'),
                group.replace('.', "/"),
                artifact
            ),
        }
    }
}

const ENGINEHUB_MAVEN: &str = "https://maven.enginehub.org/repo";

impl PluginId {
    pub const ALL: [PluginId; 23] = [
        PluginId::LuckPerms,
        PluginId::Vault,
        PluginId::EssentialsX,
        PluginId::EssentialsXChat,
        PluginId::EssentialsXSpawn,
        PluginId::WorldEdit,
        PluginId::WorldGuard,
        PluginId::GriefDefender,
        PluginId::CoreProtect,
        PluginId::Matrix,
        PluginId::AdvancedBan,
        PluginId::Shopkeepers,
        PluginId::McMmo,
        PluginId::Dynmap,
        PluginId::Spark,
        PluginId::Chunky,
        PluginId::ViaVersion,
        PluginId::ViaBackwards,
        PluginId::ViaRewind,
        PluginId::EconomyShopGui,
        PluginId::PlayerWarps,
        PluginId::BetterSleeping3,
        PluginId::LiteBans,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PluginId::LuckPerms => "LuckPerms",
            PluginId::Vault => "Vault",
            PluginId::EssentialsX => "EssentialsX",
            PluginId::EssentialsXChat => "EssentialsXChat",
            PluginId::EssentialsXSpawn => "EssentialsXSpawn",
            PluginId::WorldEdit => "WorldEdit",
            PluginId::WorldGuard => "WorldGuard",
            PluginId::GriefDefender => "GriefDefender",
            PluginId::CoreProtect => "CoreProtect",
            PluginId::Matrix => "Matrix",
            PluginId::AdvancedBan => "AdvancedBan",
            PluginId::Shopkeepers => "Shopkeepers",
            PluginId::McMmo => "mcMMO",
            PluginId::Dynmap => "Dynmap",
            PluginId::Spark => "Spark",
            PluginId::Chunky => "Chunky",
            PluginId::ViaVersion => "ViaVersion",
            PluginId::ViaBackwards => "ViaBackwards",
            PluginId::ViaRewind => "ViaRewind",
            PluginId::EconomyShopGui => "EconomyShopGUI",
            PluginId::PlayerWarps => "PlayerWarps",
            PluginId::BetterSleeping3 => "BetterSleeping3",
            PluginId::LiteBans => "LiteBans",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PluginId::LuckPerms => "Permissions & ranks",
            PluginId::Vault => "Economy API",
            PluginId::EssentialsX => "Core commands",
            PluginId::EssentialsXChat => "Chat formatting",
            PluginId::EssentialsXSpawn => "Spawn control",
            PluginId::WorldEdit => "Building tools",
            PluginId::WorldGuard => "Region protection",
            PluginId::GriefDefender => "Claims & anti-grief",
            PluginId::CoreProtect => "Block logging",
            PluginId::Matrix => "Anti-cheat",
            PluginId::AdvancedBan => "Moderation",
            PluginId::Shopkeepers => "Player shops",
            PluginId::McMmo => "Skills system",
            PluginId::Dynmap => "Live map",
            PluginId::Spark => "Profiling",
            PluginId::Chunky => "World pregen",
            PluginId::ViaVersion => "Allow newer clients",
            PluginId::ViaBackwards => "Allow older clients",
            PluginId::ViaRewind => "Legacy mobs",
            PluginId::EconomyShopGui => "GUI shops",
            PluginId::PlayerWarps => "Player warp system",
            PluginId::BetterSleeping3 => "Skip nights",
            PluginId::LiteBans => "Punishment management",
        }
    }

    /// Whether the plugin starts checked in a fresh form
    pub fn default_selected(self) -> bool {
        !matches!(self, PluginId::LiteBans)
    }

    pub fn source(self) -> PluginSource {
        match self {
            PluginId::LuckPerms => PluginSource::Direct {
                url: "https://download.luckperms.net/latest/bukkit",
            },
            PluginId::Vault => PluginSource::Direct {
                url: "https://github.com/MilkBowl/Vault/releases/latest/download/Vault.jar",
            },
            PluginId::EssentialsX => PluginSource::GithubRelease {
                owner: "EssentialsX",
                repo: "Essentials",
                asset_pattern: r"^EssentialsX-.*\.jar$",
            },
            PluginId::EssentialsXChat => PluginSource::GithubRelease {
                owner: "EssentialsX",
                repo: "Essentials",
                asset_pattern: r"^EssentialsXChat-.*\.jar$",
            },
            PluginId::EssentialsXSpawn => PluginSource::GithubRelease {
                owner: "EssentialsX",
                repo: "Essentials",
                asset_pattern: r"^EssentialsXSpawn-.*\.jar$",
            },
            PluginId::WorldEdit => PluginSource::Maven {
                base_url: ENGINEHUB_MAVEN,
                group: "com.sk89q.worldedit",
                artifact: "worldedit-bukkit",
            },
            PluginId::WorldGuard => PluginSource::Maven {
                base_url: ENGINEHUB_MAVEN,
                group: "com.sk89q.worldguard",
                artifact: "worldguard-bukkit",
            },
            PluginId::GriefDefender => PluginSource::Direct {
                url: "https://github.com/bloodmc/GriefDefender/releases/latest/download/GriefDefender.zip",
            },
            PluginId::CoreProtect => PluginSource::Direct {
                url: "https://ci.lucko.me/job/CoreProtect/lastSuccessfulBuild/artifact/target/CoreProtect-21.6.jar",
            },
            PluginId::Matrix => PluginSource::Direct {
                url: "https://matrix.rico-gamer.de/latest/Matrix-latest.jar",
            },
            PluginId::AdvancedBan => PluginSource::Direct {
                url: "https://github.com/DevLeoko/AdvancedBan/releases/latest/download/AdvancedBan.jar",
            },
            PluginId::Shopkeepers => PluginSource::Direct {
                url: "https://github.com/Shopkeepers/Shopkeepers/releases/latest/download/Shopkeepers.jar",
            },
            PluginId::McMmo => PluginSource::Direct {
                url: "https://ci.minebench.de/job/mcMMO/lastStableBuild/artifact/target/mcMMO-2.2.20.jar",
            },
            PluginId::Dynmap => PluginSource::Direct {
                url: "https://github.com/webbukkit/dynmap/releases/latest/download/Dynmap-3.7-beta-6-spigot.jar",
            },
            PluginId::Spark => PluginSource::Direct {
                url: "https://download.lucko.me/spark/latest/bukkit",
            },
            PluginId::Chunky => PluginSource::Direct {
                url: "https://github.com/pop4959/Chunky/releases/latest/download/Chunky-Bukkit-1.4.28.jar",
            },
            PluginId::ViaVersion => PluginSource::Direct {
                url: "https://ci.viaversion.com/job/ViaVersion/lastSuccessfulBuild/artifact/build/libs/ViaVersion-5.0.1.jar",
            },
            PluginId::ViaBackwards => PluginSource::Direct {
                url: "https://ci.viaversion.com/job/ViaBackwards/lastSuccessfulBuild/artifact/build/libs/ViaBackwards-5.0.1.jar",
            },
            PluginId::ViaRewind => PluginSource::Direct {
                url: "https://ci.viaversion.com/job/ViaRewind/lastSuccessfulBuild/artifact/build/libs/ViaRewind-4.0.5.jar",
            },
            PluginId::EconomyShopGui => PluginSource::Direct {
                url: "https://github.com/Gypopo/EconomyShopGUI-Plugin/releases/latest/download/EconomyShopGUI-6.8.0.jar",
            },
            PluginId::PlayerWarps => PluginSource::Direct {
                url: "https://github.com/OmerBenGera/PlayerWarps/releases/latest/download/PlayerWarps.jar",
            },
            PluginId::BetterSleeping3 => PluginSource::Direct {
                url: "https://github.com/Nuytemans-Dieter/BetterSleeping3/releases/latest/download/BetterSleeping3.jar",
            },
            PluginId::LiteBans => PluginSource::Direct {
                url: "https://github.com/ruany/LiteBans/releases/latest/download/LiteBans.jar",
            },
        }
    }

    /// File name used when the source URL doesn't carry one
    pub fn fallback_file_name(self) -> String {
        format!("{}.jar", self.name())
    }

    pub fn default_selection() -> Vec<PluginId> {
        Self::ALL
            .iter()
            .copied()
            .filter(|id| id.default_selected())
            .collect()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PluginId {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GeneratorError::UnknownPlugin(wanted.to_string()))
    }
}

/// File name for a downloaded artifact: the URL's last path segment when it
/// names a `.jar` or `.zip`, otherwise `fallback`.
pub fn file_name_from_url(url: &str, fallback: &str) -> String {
    let last = reqwest::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.last().map(str::to_string))
    });
    let decoded = last
        .as_deref()
        .and_then(|segment| urlencoding::decode(segment).ok())
        .map(|name| name.into_owned());

    match decoded {
        Some(name) if is_safe_artifact_name(&name) => name,
        _ => fallback.to_string(),
    }
}

fn is_safe_artifact_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    (lower.ends_with(".jar") || lower.ends_with(".zip"))
        && !name.starts_with('.')
        && !name.contains(['/', '\\', ':'])
}

pub fn is_zip(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".zip")
}

/// Catalog entry as shown to the user (checkbox label + tooltip)
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub id: PluginId,
    pub name: String,
    pub description: String,
    pub default_selected: bool,
    pub download_url: String,
}

impl From<PluginId> for PluginInfo {
    fn from(id: PluginId) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            description: id.description().to_string(),
            default_selected: id.default_selected(),
            download_url: id.source().display_url(),
        }
    }
}

pub fn list_catalog() -> Vec<PluginInfo> {
    PluginId::ALL.iter().copied().map(PluginInfo::from).collect()
}
