use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{AddField, AddForm, App, Mode};
use crate::filter::ColumnView;
use crate::model::{Priority, Task};
use crate::output::format_date;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::Green),
        Priority::Medium => Style::default().fg(Color::Blue),
        Priority::High => Style::default().fg(Color::Yellow),
        Priority::Urgent => Style::default().fg(Color::Red).bold(),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_columns(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    match &app.mode {
        Mode::Add(form) => render_add_dialog(frame, form),
        Mode::Prompt(text) => render_prompt(frame, text),
        Mode::ConfirmDelete { title, .. } => render_confirm(frame, title),
        Mode::Help => render_help(frame),
        Mode::Normal | Mode::Search => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        app.board.state().project_name.clone(),
        Style::default().bold(),
    )];
    if app.is_generating() {
        let spin = SPINNER[app.tick % SPINNER.len()];
        spans.push(Span::styled(
            format!("   {spin} Generating tasks..."),
            Style::default().fg(Color::Magenta),
        ));
    }
    if !app.query.is_empty() || matches!(app.mode, Mode::Search) {
        let cursor = if matches!(app.mode, Mode::Search) { "_" } else { "" };
        spans.push(Span::styled(
            format!("   Search: {}{cursor}", app.query),
            Style::default().fg(Color::Cyan),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn card(task: &Task) -> ListItem<'static> {
    let mut meta = format_date(task.created_at);
    if !task.tags.is_empty() {
        meta.push_str("  #");
        meta.push_str(&task.tags.join(" #"));
    }
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:<6} ", task.priority.as_str()), priority_style(task.priority)),
        Span::styled(task.title.clone(), Style::default().bold()),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::styled(task.description.clone(), Style::default().fg(Color::Gray)));
    }
    lines.push(Line::styled(meta, Style::default().fg(Color::DarkGray)));
    lines.push(Line::raw(""));
    ListItem::new(lines)
}

fn render_column(frame: &mut Frame, column: &ColumnView, selected: Option<usize>, area: Rect) {
    let border = if selected.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ({}) ", column.status, column.tasks.len()));

    if column.tasks.is_empty() {
        frame.render_widget(
            Paragraph::new("Empty column")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = column.tasks.iter().map(|t| card(t)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_columns(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let n = view.columns.len() as u32;
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..n).map(|_| Constraint::Ratio(1, n)))
        .split(area);
    for (i, (column, col_area)) in view.columns.iter().zip(areas.iter()).enumerate() {
        let selected = (i == app.column).then(|| app.rows[i]);
        render_column(frame, column, selected, *col_area);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.notice {
        Some(notice) => (notice.clone(), Style::default().fg(Color::Red)),
        None => (
            "a: add  </>: move  d: delete  /: search  g: AI helper  ?: help  q: quit".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn dialog(frame: &mut Frame, title: &str, width: u16, height: u16) -> Rect {
    let term = frame.area();
    let width = width.min(term.width.saturating_sub(4));
    let height = height.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default()
    }
}

fn render_add_dialog(frame: &mut Frame, form: &AddForm) {
    let inner = dialog(frame, "Add New Task", 60, 11);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title label
            Constraint::Length(1), // title input
            Constraint::Length(1), // description label
            Constraint::Length(1), // description input
            Constraint::Length(1), // priority
            Constraint::Length(1), // status
            Constraint::Length(1), // spacer
            Constraint::Length(1), // hint
            Constraint::Min(0),
        ])
        .split(inner);

    let text_field = |label: &str, value: &str, field: AddField, row: usize, frame: &mut Frame| {
        let focused = form.focused == field;
        frame.render_widget(
            Paragraph::new(label.to_string()).style(label_style(focused)),
            chunks[row],
        );
        let cursor = if focused { "_" } else { "" };
        frame.render_widget(Paragraph::new(format!("  {value}{cursor}")), chunks[row + 1]);
    };
    text_field("Title:", &form.title, AddField::Title, 0, frame);
    text_field("Description:", &form.description, AddField::Description, 2, frame);

    let choice = |label: &str, value: &str, field: AddField| {
        let focused = form.focused == field;
        let shown = if focused {
            format!("< {value} >")
        } else {
            value.to_string()
        };
        Line::from(vec![
            Span::styled(format!("{label:<13}"), label_style(focused)),
            Span::raw(shown),
        ])
    };
    frame.render_widget(
        Paragraph::new(choice("Priority:", form.priority.as_str(), AddField::Priority)),
        chunks[4],
    );
    frame.render_widget(
        Paragraph::new(choice("Status:", form.status.as_str(), AddField::Status)),
        chunks[5],
    );
    frame.render_widget(
        Paragraph::new("Enter: create  Tab: next field  Left/Right: change  Esc: cancel")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[7],
    );
}

fn render_prompt(frame: &mut Frame, text: &str) {
    let inner = dialog(frame, "AI Helper", 64, 7);
    let lines = vec![
        Line::raw("Briefly describe your project/goal to get AI-generated tasks:"),
        Line::raw(""),
        Line::styled(format!("{text}_"), Style::default().fg(Color::White)),
        Line::raw(""),
        Line::styled(
            "Enter: generate  C-u: clear  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_confirm(frame: &mut Frame, title: &str) {
    let inner = dialog(frame, "Delete", 50, 5);
    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(title.to_string(), Style::default().bold()),
            Span::raw("?"),
        ]),
        Line::raw(""),
        Line::styled("y: delete  any other key: cancel", Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_help(frame: &mut Frame) {
    let inner = dialog(frame, "Help", 46, 14);
    let key = |k: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!("{k:<10}"), Style::default().fg(Color::Cyan)),
            Span::raw(what.to_string()),
        ])
    };
    let lines = vec![
        key("h/l", "Previous/next column"),
        key("j/k", "Move down/up"),
        key("> or L", "Move task forward"),
        key("< or H", "Move task back"),
        key("a", "Add task"),
        key("d", "Delete task"),
        key("/", "Search titles and descriptions"),
        key("g", "Generate tasks with AI"),
        key("?", "Toggle help"),
        key("q/Esc", "Quit"),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
