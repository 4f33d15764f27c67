use std::path::Path;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::drag::gesture::{Point, PointerInput, PointerPhase};
use crate::io::board_io::KANBAN_DIR;
use crate::model::board::{Board, Card};
use crate::model::config::{BoardConfig, BoardInfo};
use crate::model::status::StatusUpdate;
use crate::model::workspace::Workspace;
use crate::tui::app::App;
use crate::tui::layout::BoardLayout;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A workspace rooted at `root` with default settings
pub fn workspace_in(root: &Path, board: Board) -> Workspace {
    Workspace {
        root: root.to_path_buf(),
        kanban_dir: root.join(KANBAN_DIR),
        config: BoardConfig {
            board: BoardInfo {
                name: "Sample".into(),
            },
            backend: Default::default(),
            drag: Default::default(),
            ui: Default::default(),
            log: Default::default(),
        },
        board,
    }
}

/// "todo": #1 Write docs, #2 Fix login. "done": #3 Ship it.
pub fn sample_board() -> Board {
    let mut board = Board::with_columns([("todo", "To Do"), ("done", "Done")]);
    board.columns["todo"].cards.push(Card::new(1, "Write docs"));
    board.columns["todo"].cards.push(Card::new(2, "Fix login"));
    board.columns["done"].cards.push(Card::new(3, "Ship it"));
    board
}

/// App over [`sample_board`] with the layout a TERM_W x TERM_H frame gets:
/// "todo" spans x 0..40 and "done" x 40..80; cards start at row 2, three
/// rows each.
pub fn sample_app() -> App {
    let mut app = App::new(workspace_in(Path::new("/tmp/cardshift-test"), sample_board()));
    app.layout = BoardLayout::compute(
        app.manager.board(),
        Rect::new(0, 1, TERM_W, TERM_H - 2),
        app.config.ui.card_height,
    );
    app
}

/// Feed one mouse event through the drag manager
pub fn pointer(app: &mut App, phase: PointerPhase, x: f64, y: f64) -> Option<StatusUpdate> {
    let input = PointerInput {
        phase,
        pos: Point::new(x, y),
        target: None,
    };
    let effect = app.manager.pointer(&app.layout, input);
    app.handle_effect(effect)
}

/// Press at `from`, move to `to` and release there
pub fn drag_card(app: &mut App, from: (f64, f64), to: (f64, f64)) -> Option<StatusUpdate> {
    let down = pointer(app, PointerPhase::Down, from.0, from.1);
    let moved = pointer(app, PointerPhase::Move, to.0, to.1);
    let up = pointer(app, PointerPhase::Up, to.0, to.1);
    down.or(moved).or(up)
}
