// Plugin catalog, starter configs, download scripts and the HTTP fetcher

pub mod archive;
pub mod catalog;
pub mod configs;
pub mod fetcher;
pub mod scripts;

pub use catalog::{file_name_from_url, is_zip, list_catalog, PluginId, PluginInfo, PluginSource};
pub use fetcher::{DownloadedArtifact, PluginFetcher};
