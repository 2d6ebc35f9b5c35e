use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};
use crate::board::Step;

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    SubmitAdd,
    Step(Step),
    ConfirmDelete,
    Generate,
    Continue,
}

/// Handle a key press. Returns an action indicating what the event loop should do.
pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match app.mode {
        Mode::Normal => handle_normal(app, key),
        Mode::Search => handle_search(app, key),
        Mode::Add(_) => handle_add(app, key),
        Mode::Prompt(_) => handle_prompt(app, key),
        Mode::ConfirmDelete { .. } => handle_confirm(app, key),
        Mode::Help => {
            app.mode = Mode::Normal;
            KeyAction::Continue
        }
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) -> KeyAction {
    app.notice = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('h') | KeyCode::Left => app.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.move_right(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('>') | KeyCode::Char('L') => return KeyAction::Step(Step::Forward),
        KeyCode::Char('<') | KeyCode::Char('H') => return KeyAction::Step(Step::Back),
        KeyCode::Char('a') => app.enter_add_mode(),
        KeyCode::Char('d') => app.enter_confirm_delete(),
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Char('g') => app.enter_prompt_mode(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
    KeyAction::Continue
}

/// Search filters live as the query is typed.
fn handle_search(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter => app.mode = Mode::Normal,
        KeyCode::Esc => {
            app.set_query(String::new());
            app.mode = Mode::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.query.clone();
            query.pop();
            app.set_query(query);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.set_query(String::new());
        }
        KeyCode::Char(c) => {
            let mut query = app.query.clone();
            query.push(c);
            app.set_query(query);
        }
        _ => {}
    }
    KeyAction::Continue
}

fn handle_add(app: &mut App, key: KeyEvent) -> KeyAction {
    let Mode::Add(form) = &mut app.mode else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => return KeyAction::SubmitAdd,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => {
            if let Some(buf) = form.focused_buf_mut() {
                buf.pop();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(buf) = form.focused_buf_mut() {
                buf.clear();
            }
        }
        KeyCode::Char(c) => match form.focused_buf_mut() {
            Some(buf) => buf.push(c),
            None if c == ' ' => form.cycle_choice(true),
            None => {}
        },
        _ => {}
    }
    KeyAction::Continue
}

fn handle_prompt(app: &mut App, key: KeyEvent) -> KeyAction {
    let Mode::Prompt(text) = &mut app.mode else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => return KeyAction::Generate,
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => text.clear(),
        KeyCode::Char(c) => text.push(c),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_confirm(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => KeyAction::ConfirmDelete,
        _ => {
            app.mode = Mode::Normal;
            KeyAction::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::model::{BoardState, Status};

    fn app() -> App {
        App::new(Board::new(BoardState::seeded(0)), None)
    }

    fn press(app: &mut App, code: KeyCode) -> KeyAction {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn quit_keys() {
        let mut a = app();
        assert_eq!(press(&mut a, KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(
            handle_key(&mut a, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn navigation_and_steps() {
        let mut a = app();
        press(&mut a, KeyCode::Char('l'));
        assert_eq!(a.selected_status(), Status::ToDo);
        assert_eq!(press(&mut a, KeyCode::Char('>')), KeyAction::Step(Step::Forward));
        assert_eq!(press(&mut a, KeyCode::Char('<')), KeyAction::Step(Step::Back));
    }

    #[test]
    fn search_filters_while_typing_and_esc_clears() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        type_str(&mut a, "auth");
        assert_eq!(a.query, "auth");
        assert_eq!(a.view().total(), 1);
        press(&mut a, KeyCode::Backspace);
        assert_eq!(a.query, "aut");
        press(&mut a, KeyCode::Esc);
        assert!(a.query.is_empty());
        assert!(matches!(a.mode, Mode::Normal));
    }

    #[test]
    fn add_dialog_typing_and_submit() {
        let mut a = app();
        press(&mut a, KeyCode::Char('a'));
        type_str(&mut a, "New card");
        press(&mut a, KeyCode::Tab);
        type_str(&mut a, "details");
        press(&mut a, KeyCode::Tab);
        press(&mut a, KeyCode::Right);
        match &a.mode {
            Mode::Add(form) => {
                assert_eq!(form.title, "New card");
                assert_eq!(form.description, "details");
                assert_eq!(form.priority, crate::model::Priority::High);
            }
            _ => panic!("expected add dialog"),
        }
        assert_eq!(press(&mut a, KeyCode::Enter), KeyAction::SubmitAdd);
    }

    #[test]
    fn delete_confirmation_can_be_declined() {
        let mut a = app();
        press(&mut a, KeyCode::Char('l'));
        press(&mut a, KeyCode::Char('d'));
        assert!(matches!(a.mode, Mode::ConfirmDelete { .. }));
        assert_eq!(press(&mut a, KeyCode::Char('n')), KeyAction::Continue);
        assert!(matches!(a.mode, Mode::Normal));
    }

    #[test]
    fn prompt_edits_then_generates() {
        let mut a = app();
        press(&mut a, KeyCode::Char('g'));
        handle_key(&mut a, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        type_str(&mut a, "podcast");
        assert!(matches!(&a.mode, Mode::Prompt(p) if p == "podcast"));
        assert_eq!(press(&mut a, KeyCode::Enter), KeyAction::Generate);
    }

    #[test]
    fn any_key_closes_help() {
        let mut a = app();
        press(&mut a, KeyCode::Char('?'));
        assert!(matches!(a.mode, Mode::Help));
        press(&mut a, KeyCode::Char('x'));
        assert!(matches!(a.mode, Mode::Normal));
    }
}
