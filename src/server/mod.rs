// Server tree generation: form record, templates, rendering and writing

pub mod config;
pub mod files;
pub mod jvm;
pub mod renderer;
pub mod scripts;
pub mod template;
pub mod writer;

pub use config::{Fork, ServerConfig, MIN_RAM_GB};
pub use renderer::{build_file_map, preview, GeneratedFile};
pub use writer::write_files;
