use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuration from board.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
}

/// Which status-update backend to reconcile against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Validate updates against the local board, no network
    #[default]
    Local,
    /// POST to `url`
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            kind: BackendKind::Local,
            url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Movement (per axis) a touch must exceed before it becomes a drag
    #[serde(default = "default_touch_threshold")]
    pub touch_threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        DragConfig {
            touch_threshold: default_touch_threshold(),
        }
    }
}

fn default_touch_threshold() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Terminal rows per card
    #[serde(default = "default_card_height")]
    pub card_height: u16,
    /// `[ui.colors]` overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: IndexMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            card_height: default_card_height(),
            colors: IndexMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_card_height() -> u16 {
    3
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "cardshift=debug"
    #[serde(default)]
    pub level: Option<String>,
    /// Log file for the TUI, relative to the kanban/ directory
    #[serde(default)]
    pub file: Option<String>,
}
