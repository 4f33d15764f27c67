use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BoardIoError, CONFIG_FILE, KANBAN_DIR};
use crate::io::config_io;
use crate::model::board::Board;

const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("todo", "To Do"),
    ("in_progress", "In Progress"),
    ("done", "Done"),
];

/// Column keys double as task statuses, so keep them plain identifiers.
fn validate_column_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("column key cannot be empty".to_string());
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(format!(
            "invalid column key \"{}\": use lowercase letters, digits, '_' or '-' (e.g. \"in_progress\")",
            key
        ));
    }
    Ok(())
}

/// Infer a board name from a directory name: split on '-' and '_', title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pair up the flat `--column KEY NAME` values clap collects
fn parse_column_pairs(args: &[String]) -> Vec<(&str, &str)> {
    args.chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect()
}

pub fn cmd_init(args: InitArgs, start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let kanban_dir = start.join(KANBAN_DIR);
    let config_path = kanban_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(BoardIoError::AlreadyExists(config_path).into());
    }

    if let Some(parent) = start.parent()
        && let Ok(parent_root) = board_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(KANBAN_DIR).display()
        );
        eprintln!("Creating new board in ./{}/", KANBAN_DIR);
    }

    let mut columns = parse_column_pairs(&args.column);
    if columns.is_empty() {
        columns = DEFAULT_COLUMNS.to_vec();
    }
    for (key, _) in &columns {
        validate_column_key(key)?;
    }
    if let Some(dup) = board_io::duplicate_column_keys(columns.iter().map(|(k, _)| *k)).first() {
        return Err(format!("duplicate column key \"{}\"", dup).into());
    }

    let name = args.name.unwrap_or_else(|| {
        start
            .file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Board".to_string())
    });

    fs::create_dir_all(&kanban_dir)?;
    fs::write(&config_path, config_io::render_config(&name))?;
    let board = Board::with_columns(columns.iter().copied());
    board_io::save_board(&kanban_dir, &board)?;

    println!("Initialized board: {}", name);
    for (key, column_name) in &columns {
        println!("  column: {} ({})", column_name, key);
    }
    Ok(())
}
