use std::fs;
use std::path::Path;

use crate::io::board_io::{BoardIoError, CONFIG_FILE};
use crate::model::config::BoardConfig;

const BOARD_TOML_TEMPLATE: &str = r##"[board]
name = "{name}"

# --- Backend ---
# Where status updates are confirmed after a card is dropped in a new column.
#   kind = "local"  validate against this board only (no network)
#   kind = "http"   POST {"task_id", "status"} as JSON to `url`
[backend]
kind = "local"
# url = "http://localhost:5000/api/update_task_status"
timeout_ms = 5000

[drag]
# A touch must move farther than this (on either axis) to become a drag
touch_threshold = 10.0

[ui]
show_key_hints = true
card_height = 3

[log]
# Overridden by CARDSHIFT_LOG. Examples: "info", "cardshift=debug"
# level = "warn"
# TUI log file, relative to kanban/. Without it the TUI does not log.
# file = "cardshift.log"
"##;

/// Read and parse `kanban/board.toml`
pub fn read_config(kanban_dir: &Path) -> Result<BoardConfig, BoardIoError> {
    let path = kanban_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|source| BoardIoError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Fresh board.toml with commented defaults
pub fn render_config(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    BOARD_TOML_TEMPLATE.replace("{name}", &escaped)
}
