//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level renderer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Rendering settings.
    pub render: RenderConfig,
    /// GPU memory pool settings.
    pub memory: MemoryConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Which graphics backend family drives the renderer.
///
/// Consumed once at startup; everything past the backend seam is
/// backend-agnostic. The selection also fixes the clip-space convention
/// the visibility tests run with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendSelection {
    /// The Vulkan-family backend (clip-space Y down).
    Vulkan,
    /// The OpenGL-family backend (clip-space Y up).
    OpenGl,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Graphics backend to initialize.
    pub backend: BackendSelection,
    /// Target frame rate (0 = unlimited / vsync).
    pub target_fps: u32,
}

/// GPU memory pool configuration. Pool sizes are fixed for the process
/// lifetime; the arenas they create never resize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Device-local pool (textures, static geometry) in MiB.
    pub device_pool_mb: u64,
    /// Host-visible pool (per-frame instance data) in MiB.
    pub host_pool_mb: u64,
}

impl MemoryConfig {
    /// Device pool capacity in bytes.
    pub fn device_pool_bytes(&self) -> u64 {
        self.device_pool_mb * 1024 * 1024
    }

    /// Host pool capacity in bytes.
    pub fn host_pool_bytes(&self) -> u64 {
        self.host_pool_mb * 1024 * 1024
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log per-frame visibility and arena stats.
    pub show_stats: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for BackendSelection {
    fn default() -> Self {
        BackendSelection::Vulkan
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendSelection::default(),
            target_fps: 0,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            device_pool_mb: 256,
            host_pool_mb: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_stats: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
