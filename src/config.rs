//! Mount configuration.
//!
//! Built in code with [`MountConfig::new`] or read from TOML:
//!
//! ```toml
//! mount = "app"
//! render_mode = "fullscreen"
//! tick_ms = 16
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// How the terminal host draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Alternate screen, whole terminal.
    Fullscreen,
    /// Below the cursor, in the normal buffer.
    #[default]
    Inline,
}

/// Startup configuration for mounting an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Lookup key of the container node.
    pub mount: String,
    pub render_mode: RenderMode,
    /// Input poll timeout of the terminal host, in milliseconds.
    pub tick_ms: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount: "app".to_string(),
            render_mode: RenderMode::default(),
            tick_ms: 16,
        }
    }
}

impl MountConfig {
    /// Defaults with a custom mount key.
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            mount: mount.into(),
            ..Self::default()
        }
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
