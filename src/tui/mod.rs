mod app;
mod board;
mod event;

use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use log::warn;
use ratatui::prelude::*;

use crate::board::Board;
use crate::db::SqliteStore;
use crate::persist;
use crate::suggest::TaskSuggester;
use crate::watch::StoreWatcher;
use app::App;
use event::KeyAction;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(
    db_path: &str,
    store: Rc<SqliteStore>,
    board: Board,
    suggester: Option<Arc<dyn TaskSuggester>>,
) -> Result<()> {
    let mut app = App::new(board, suggester);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, db_path, &store);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db_path: &str,
    store: &SqliteStore,
) -> Result<()> {
    let watcher = StoreWatcher::new(db_path)?;

    loop {
        terminal.draw(|frame| board::render(frame, app))?;

        if ct_event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    let result = match event::handle_key(app, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::SubmitAdd => app.submit_add(),
                        KeyAction::Step(step) => app.step_selected(step),
                        KeyAction::ConfirmDelete => app.confirm_delete(),
                        KeyAction::Generate => {
                            app.start_generation();
                            Ok(())
                        }
                        KeyAction::Continue => Ok(()),
                    };
                    if let Err(e) = result {
                        app.notice = Some(format!("{e:#}"));
                    }
                }
            }
        }

        if let Err(e) = app.poll_generation() {
            app.notice = Some(format!("{e:#}"));
        }
        app.tick = app.tick.wrapping_add(1);

        // Our own saves trigger this too; reloading them is harmless.
        if watcher.changed() {
            match persist::load(store) {
                Ok(Some(state)) => app.reload(state),
                Ok(None) => {}
                Err(e) => warn!("ignoring unreadable board update: {e:#}"),
            }
        }
    }
}
