//! src/config.rs
//! ============================================================================
//! # Config: Gallery Configuration Loader and Saver
//!
//! Manages the user-editable configuration for the gallery widget set.
//! Loads and saves settings as TOML from the proper cross-platform config path
//! using the [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Robust defaulting if no config file exists
//! - Async load/save for smooth integration with Tokio
//!
//! ## Example
//! ```rust,ignore
//! let config = GalleryConfig::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::view::components::items_grid::GridOptions;

/// Toast notification tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastConfig {
    /// How long a toast stays visible before fading.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Maximum number of toasts kept on screen at once.
    pub max_visible: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(4),
            max_visible: 3,
        }
    }
}

/// Toolbar tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolbarConfig {
    /// Reserved width (cells) for the "more actions" overflow button.
    pub overflow_button_width: u16,

    /// Gap (cells) between toolbar items.
    pub item_gap: u16,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            overflow_button_width: 5,
            item_gap: 1,
        }
    }
}

/// Main configuration struct for the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Enables the folder panel and folder-scoped loading.
    pub folders_allowed: bool,

    /// Enables the preview action and the open-to-preview gesture.
    pub preview_allowed: bool,

    #[serde(default)]
    pub grid: GridOptions,

    #[serde(default)]
    pub toolbar: ToolbarConfig,

    #[serde(default)]
    pub toast: ToastConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            folders_allowed: false,
            preview_allowed: true,
            grid: GridOptions::default(),
            toolbar: ToolbarConfig::default(),
            toast: ToastConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Loads config from the TOML file at the XDG-compliant app config dir,
    /// or writes and returns the defaults when no file exists yet.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to the TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "example", "Gallery")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let cfg = GalleryConfig::default();
        assert!(!cfg.folders_allowed);
        assert!(cfg.preview_allowed);
        assert_eq!(cfg.toast.ttl, Duration::from_secs(4));
    }

    #[test]
    fn toml_round_trip() {
        let cfg = GalleryConfig {
            folders_allowed: true,
            ..GalleryConfig::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: GalleryConfig = toml::from_str(&text).unwrap();
        assert!(back.folders_allowed);
        assert_eq!(back.toolbar.overflow_button_width, 5);
    }

    #[test]
    fn missing_sections_default() {
        let back: GalleryConfig =
            toml::from_str("folders_allowed = true\npreview_allowed = false\n").unwrap();
        assert!(back.folders_allowed);
        assert!(!back.preview_allowed);
        assert_eq!(back.toast.max_visible, 3);
    }
}
