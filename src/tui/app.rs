use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::board::{Board, Outcome, Step};
use crate::filter::BoardView;
use crate::generation::{self, Generation, GenerationState, Settlement};
use crate::model::{BoardState, NewTask, Priority, Status, Task, COLUMN_COUNT};
use crate::suggest::TaskSuggester;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Title,
    Description,
    Priority,
    Status,
}

pub struct AddForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub focused: AddField,
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let i = all.iter().position(|&x| x == current).unwrap_or(0);
    let n = all.len();
    let j = if forward { (i + 1) % n } else { (i + n - 1) % n };
    all[j]
}

impl AddForm {
    pub fn new() -> Self {
        let draft = NewTask::default();
        Self {
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            focused: AddField::Title,
        }
    }

    /// Text buffer under the cursor, if the focused field is free text.
    pub fn focused_buf_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            AddField::Title => Some(&mut self.title),
            AddField::Description => Some(&mut self.description),
            AddField::Priority | AddField::Status => None,
        }
    }

    /// Step the focused choice field through its values.
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focused {
            AddField::Priority => self.priority = cycle(&Priority::ALL, self.priority, forward),
            AddField::Status => self.status = cycle(&Status::ALL, self.status, forward),
            AddField::Title | AddField::Description => {}
        }
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            AddField::Title => AddField::Description,
            AddField::Description => AddField::Priority,
            AddField::Priority => AddField::Status,
            AddField::Status => AddField::Title,
        };
    }

    pub fn prev_field(&mut self) {
        self.focused = match self.focused {
            AddField::Title => AddField::Status,
            AddField::Description => AddField::Title,
            AddField::Priority => AddField::Description,
            AddField::Status => AddField::Priority,
        };
    }

    /// The creation payload, or `None` while the title is blank.
    pub fn draft(&self) -> Option<NewTask> {
        if self.title.trim().is_empty() {
            return None;
        }
        Some(NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
        })
    }
}

impl Default for AddForm {
    fn default() -> Self {
        Self::new()
    }
}

pub enum Mode {
    Normal,
    Search,
    Add(AddForm),
    /// Asking for the project description to send to the AI helper.
    Prompt(String),
    ConfirmDelete { id: String, title: String },
    Help,
}

pub struct App {
    pub board: Board,
    pub query: String,
    pub column: usize,
    pub rows: [usize; COLUMN_COUNT],
    pub mode: Mode,
    pub notice: Option<String>,
    pub generation: Generation,
    pub suggester: Option<Arc<dyn TaskSuggester>>,
    pub tick: usize,
}

impl App {
    pub fn new(board: Board, suggester: Option<Arc<dyn TaskSuggester>>) -> Self {
        Self {
            board,
            query: String::new(),
            column: 0,
            rows: [0; COLUMN_COUNT],
            mode: Mode::Normal,
            notice: None,
            generation: Generation::new(),
            suggester,
            tick: 0,
        }
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView::build(self.board.state(), &self.query)
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.column]
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.view()
            .column(self.selected_status())
            .tasks
            .get(self.rows[self.column])
            .copied()
    }

    pub fn is_generating(&self) -> bool {
        self.generation.state() == GenerationState::Generating
    }

    /// Keep every column's row cursor inside its (filtered) column.
    pub fn clamp_cursor(&mut self) {
        let view = BoardView::build(self.board.state(), &self.query);
        for (row, column) in self.rows.iter_mut().zip(&view.columns) {
            *row = (*row).min(column.tasks.len().saturating_sub(1));
        }
    }

    pub fn move_left(&mut self) {
        self.column = self.column.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.column + 1 < COLUMN_COUNT {
            self.column += 1;
        }
    }

    pub fn move_up(&mut self) {
        let row = &mut self.rows[self.column];
        *row = row.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.view().count(self.selected_status());
        let row = &mut self.rows[self.column];
        if *row + 1 < len {
            *row += 1;
        }
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
        self.clamp_cursor();
    }

    pub fn enter_add_mode(&mut self) {
        self.mode = Mode::Add(AddForm::new());
    }

    pub fn enter_prompt_mode(&mut self) {
        if self.is_generating() {
            return;
        }
        self.mode = Mode::Prompt(self.board.state().project_name.clone());
    }

    pub fn enter_confirm_delete(&mut self) {
        let Some((id, title)) = self.selected_task().map(|t| (t.id.clone(), t.title.clone())) else {
            return;
        };
        self.mode = Mode::ConfirmDelete { id, title };
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Normal,
            _ => Mode::Help,
        };
    }

    /// Submit the add dialog. A blank title leaves the dialog open.
    pub fn submit_add(&mut self) -> Result<()> {
        let Mode::Add(form) = &self.mode else {
            return Ok(());
        };
        let Some(draft) = form.draft() else {
            return Ok(());
        };
        self.mode = Mode::Normal;
        let id = self.board.add_task(draft)?;
        info!("added task {id}");
        self.clamp_cursor();
        Ok(())
    }

    pub fn step_selected(&mut self, step: Step) -> Result<()> {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return Ok(());
        };
        if self.board.step_task(&id, step)? == Outcome::Applied {
            // Follow the card into its new column.
            match step {
                Step::Forward => self.move_right(),
                Step::Back => self.move_left(),
            }
            let view = self.view();
            let pos = view
                .column(self.selected_status())
                .tasks
                .iter()
                .position(|t| t.id == id);
            if let Some(pos) = pos {
                self.rows[self.column] = pos;
            }
        }
        self.clamp_cursor();
        Ok(())
    }

    pub fn confirm_delete(&mut self) -> Result<()> {
        let Mode::ConfirmDelete { id, .. } = &self.mode else {
            return Ok(());
        };
        let id = id.clone();
        self.mode = Mode::Normal;
        self.board.delete_task(&id)?;
        self.clamp_cursor();
        Ok(())
    }

    /// Start an AI request for the description typed in the prompt dialog.
    pub fn start_generation(&mut self) {
        let Mode::Prompt(description) = &self.mode else {
            return;
        };
        let description = description.clone();
        self.mode = Mode::Normal;
        if description.trim().is_empty() {
            return;
        }
        let Some(suggester) = self.suggester.clone() else {
            self.notice = Some("AI helper unavailable: set GEMINI_API_KEY".into());
            return;
        };
        self.notice = None;
        self.generation.start(suggester, description);
    }

    /// Apply a finished AI request, if any.
    pub fn poll_generation(&mut self) -> Result<()> {
        let Some(result) = self.generation.poll() else {
            return Ok(());
        };
        match generation::settle(&mut self.board, result)? {
            Settlement::Added(ids) if ids.is_empty() => {}
            Settlement::Added(_) => {
                self.column = Status::Backlog.index();
                self.clamp_cursor();
            }
            Settlement::Failed(notice) => self.notice = Some(notice.to_string()),
        }
        Ok(())
    }

    /// Adopt a snapshot written by another process.
    pub fn reload(&mut self, state: BoardState) {
        self.board.reload(state);
        self.clamp_cursor();
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::suggest::Suggestion;

    fn app() -> App {
        App::new(Board::new(BoardState::seeded(0)), None)
    }

    fn select(app: &mut App, status: Status) {
        app.column = status.index();
    }

    #[test]
    fn selection_follows_columns() {
        let mut app = app();
        select(&mut app, Status::ToDo);
        assert_eq!(app.selected_task().unwrap().id, "2");
        select(&mut app, Status::Backlog);
        assert!(app.selected_task().is_none());
        app.move_left();
        assert_eq!(app.column, 0);
        for _ in 0..10 {
            app.move_right();
        }
        assert_eq!(app.selected_status(), Status::Done);
    }

    #[test]
    fn blank_title_keeps_dialog_open() {
        let mut app = app();
        app.enter_add_mode();
        if let Mode::Add(form) = &mut app.mode {
            form.title = "   ".into();
        }
        app.submit_add().unwrap();
        assert!(matches!(app.mode, Mode::Add(_)));
        assert_eq!(app.board.state().tasks.len(), 3);
    }

    #[test]
    fn submit_adds_with_form_values() {
        let mut app = app();
        app.enter_add_mode();
        if let Mode::Add(form) = &mut app.mode {
            form.title = "Write outline".into();
            form.focused = AddField::Priority;
            form.cycle_choice(true);
            form.focused = AddField::Status;
            form.cycle_choice(false);
        }
        app.submit_add().unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        let task = app.board.state().tasks.last().unwrap();
        assert_eq!(task.title, "Write outline");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::Backlog);
    }

    #[test]
    fn choice_cycling_wraps() {
        let mut form = AddForm::new();
        form.focused = AddField::Status;
        form.status = Status::Done;
        form.cycle_choice(true);
        assert_eq!(form.status, Status::Backlog);
        form.cycle_choice(false);
        assert_eq!(form.status, Status::Done);
        form.focused = AddField::Title;
        assert!(form.focused_buf_mut().is_some());
        form.focused = AddField::Priority;
        assert!(form.focused_buf_mut().is_none());
    }

    #[test]
    fn step_moves_card_and_cursor() {
        let mut app = app();
        select(&mut app, Status::ToDo);
        app.step_selected(Step::Forward).unwrap();
        assert_eq!(app.board.state().get("2").unwrap().status, Status::InProgress);
        assert_eq!(app.selected_status(), Status::InProgress);
        assert_eq!(app.selected_task().unwrap().id, "2");
    }

    #[test]
    fn step_at_edge_keeps_column() {
        let mut app = app();
        select(&mut app, Status::Done);
        app.step_selected(Step::Forward).unwrap();
        assert_eq!(app.selected_status(), Status::Done);
        assert_eq!(app.board.state().get("3").unwrap().status, Status::Done);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        select(&mut app, Status::Done);
        app.enter_confirm_delete();
        assert!(matches!(app.mode, Mode::ConfirmDelete { .. }));
        app.confirm_delete().unwrap();
        assert!(!app.board.state().contains("3"));
        assert!(app.selected_task().is_none());
    }

    #[test]
    fn search_clamps_cursor() {
        let mut app = app();
        select(&mut app, Status::ToDo);
        app.set_query("newsletter".into());
        assert!(app.selected_task().is_none());
        assert_eq!(app.view().total(), 1);
        app.set_query(String::new());
        assert_eq!(app.selected_task().unwrap().id, "2");
    }

    #[test]
    fn prompt_prefilled_with_project_name() {
        let mut app = app();
        app.enter_prompt_mode();
        assert!(matches!(&app.mode, Mode::Prompt(p) if p == "Marketing Campaign Q4"));
    }

    #[test]
    fn generation_without_key_shows_notice() {
        let mut app = app();
        app.enter_prompt_mode();
        app.start_generation();
        assert!(!app.is_generating());
        assert!(app.notice.is_some());
    }

    struct Offline;

    impl TaskSuggester for Offline {
        fn suggest(&self, _description: &str) -> Result<Vec<Suggestion>> {
            bail!("timed out")
        }
    }

    #[test]
    fn failed_generation_sets_generic_notice() {
        let mut app = App::new(Board::new(BoardState::seeded(0)), Some(Arc::new(Offline)));
        app.enter_prompt_mode();
        app.start_generation();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while app.is_generating() {
            app.poll_generation().unwrap();
            assert!(std::time::Instant::now() < deadline);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(app.notice.as_deref(), Some(generation::FAILURE_NOTICE));
        assert_eq!(app.board.state().tasks.len(), 3);
    }
}
