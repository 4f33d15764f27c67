use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use crate::drag::manager::{DragEffect, DragManager};
use crate::drag::notice::{NoticeKind, NoticeLog, Notifier};
use crate::io::backend::backend_from_config;
use crate::io::board_io::{self, discover_workspace, load_workspace};
use crate::io::dispatch::{Completion, Dispatcher};
use crate::io::watcher::BoardWatcher;
use crate::logging;
use crate::model::config::{BackendKind, BoardConfig};
use crate::model::status::StatusUpdate;
use crate::model::workspace::Workspace;

use super::input;
use super::layout::BoardLayout;
use super::render;
use super::theme::Theme;

/// How long to wait on exit for replies still in flight
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Main application state
pub struct App {
    pub kanban_dir: PathBuf,
    pub config: BoardConfig,
    pub theme: Theme,
    pub manager: DragManager,
    pub notices: NoticeLog,
    /// Geometry from the last frame; mouse events are hit-tested against it
    pub layout: BoardLayout,
    pub should_quit: bool,
    /// board.json changed on disk while a drag or update was in progress
    pub reload_pending: bool,
    /// A reload swapped the board; the local backend's snapshot is old
    pub backend_stale: bool,
}

impl App {
    pub fn new(workspace: Workspace) -> Self {
        let Workspace {
            kanban_dir,
            config,
            board,
            ..
        } = workspace;
        let theme = Theme::from_config(&config.ui);
        let manager = DragManager::new(board, config.drag.touch_threshold);
        App {
            kanban_dir,
            config,
            theme,
            manager,
            notices: NoticeLog::default(),
            layout: BoardLayout::default(),
            should_quit: false,
            reload_pending: false,
            backend_stale: false,
        }
    }

    /// React to what a drag event did. Returns the update to send, if any.
    pub fn handle_effect(&mut self, effect: DragEffect) -> Option<StatusUpdate> {
        match effect {
            DragEffect::Dispatch(update) => Some(update),
            DragEffect::Reordered { .. } => {
                self.save();
                None
            }
            DragEffect::Cancelled { task_id } => {
                self.notices
                    .notify(&format!("Move of task {} cancelled", task_id), NoticeKind::Info);
                None
            }
            DragEffect::Rejected(err) => {
                warn!(error = %err, "drag rejected");
                self.notices.notify(&err.to_string(), NoticeKind::Error);
                None
            }
            DragEffect::Ignored
            | DragEffect::Started { .. }
            | DragEffect::Hover(_)
            | DragEffect::NoOp { .. } => None,
        }
    }

    /// Apply a backend reply: commit or roll back, then persist
    pub fn settle(&mut self, completion: Completion) {
        match self
            .manager
            .settle(completion.task_id, completion.outcome, &mut self.notices)
        {
            Ok(settlement) => {
                debug!(
                    task_id = settlement.task_id(),
                    committed = settlement.is_committed(),
                    "settled"
                );
                self.save();
            }
            Err(e) => warn!(task_id = completion.task_id, error = %e, "reply for unknown move"),
        }
    }

    /// Write the board without moves the backend has not confirmed yet;
    /// failures become an error notice
    pub fn save(&mut self) {
        let board = self.manager.confirmed_board();
        if let Err(e) = board_io::save_board(&self.kanban_dir, &board) {
            warn!(error = %e, "could not save board");
            self.notices
                .notify(&format!("Could not save board: {}", e), NoticeKind::Error);
        }
    }

    /// Reload board.json if nothing is in motion; otherwise remember to.
    /// Returns true when a different board was swapped in.
    pub fn reload(&mut self) -> bool {
        if !self.manager.is_idle() {
            self.reload_pending = true;
            return false;
        }
        self.reload_pending = false;
        let board = match board_io::load_board(&self.kanban_dir) {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "could not reload board");
                self.notices
                    .notify(&format!("Could not reload board: {}", e), NoticeKind::Error);
                return false;
            }
        };
        if &board == self.manager.board() {
            return false;
        }
        let replaced = self.manager.replace_board(board);
        if replaced {
            self.backend_stale = true;
            info!("board reloaded from disk");
            self.notices.notify("Board reloaded", NoticeKind::Info);
        }
        replaced
    }

    /// True once after each reload that swapped the board
    pub fn take_backend_stale(&mut self) -> bool {
        std::mem::take(&mut self.backend_stale)
    }
}

/// Run the TUI application
pub fn run(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = discover_workspace(start)?;
    let workspace = load_workspace(&root)?;
    logging::init_tui_logging(&workspace.kanban_dir, &workspace.config.log);

    let backend = backend_from_config(&workspace.config.backend, &workspace.board)?;
    let mut dispatcher = Dispatcher::new(backend);
    let watcher = match BoardWatcher::start(&workspace.kanban_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watching unavailable");
            None
        }
    };

    let mut app = App::new(workspace);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &mut dispatcher, watcher.as_ref());

    // Let in-flight updates land so the saved board reflects them
    for completion in dispatcher.wait(SHUTDOWN_GRACE) {
        app.settle(completion);
    }
    if dispatcher.in_flight() > 0 {
        warn!(
            in_flight = dispatcher.in_flight(),
            "exiting with status updates unanswered"
        );
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &mut Dispatcher,
    watcher: Option<&BoardWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Some(update) = input::handle_event(app, event::read()?)
        {
            dispatcher.dispatch(update);
        }

        for completion in dispatcher.poll() {
            app.settle(completion);
        }

        let changed_on_disk = watcher.is_some_and(|w| w.poll());
        if changed_on_disk || app.reload_pending {
            app.reload();
        }
        // Covers reloads from the `r` key as well as the watcher
        if app.take_backend_stale() {
            refresh_local_backend(app, dispatcher);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// The local backend validates against a snapshot of the board; renew it
/// after a reload so tasks added on disk are accepted.
fn refresh_local_backend(app: &App, dispatcher: &mut Dispatcher) {
    if app.config.backend.kind != BackendKind::Local {
        return;
    }
    match backend_from_config(&app.config.backend, app.manager.board()) {
        Ok(backend) => dispatcher.set_backend(backend),
        Err(e) => warn!(error = %e, "could not rebuild local backend"),
    }
}
