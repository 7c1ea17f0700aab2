//! Session-level settings.

use kin_core::config::GraphConfig;
use serde::Deserialize;

/// Configuration for an `EditorSession`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Passed through to the family graph.
    pub graph: GraphConfig,

    /// Image shown for people without a photo.
    pub default_photo: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            default_photo: Some("/default.png".to_string()),
        }
    }
}
