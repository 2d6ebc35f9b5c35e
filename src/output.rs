use std::fmt::Write as _;

use crate::filter::BoardView;
use crate::model::Task;

/// Ids are UUIDs; eight characters are enough to tell tasks apart on screen.
const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Creation date as `YYYY-MM-DD` (UTC).
pub fn format_date(created_at: i64) -> String {
    chrono::DateTime::from_timestamp_millis(created_at)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn tag_suffix(task: &Task) -> String {
    if task.tags.is_empty() {
        String::new()
    } else {
        format!("  #{}", task.tags.join(" #"))
    }
}

pub fn format_task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Id:          {}", task.id);
    let _ = writeln!(out, "Title:       {}", task.title);
    let _ = writeln!(out, "Status:      {}", task.status);
    let _ = writeln!(out, "Priority:    {}", task.priority);
    if !task.description.is_empty() {
        let _ = writeln!(out, "Description: {}", task.description);
    }
    if !task.tags.is_empty() {
        let _ = writeln!(out, "Tags:        {}", task.tags.join(", "));
    }
    let _ = writeln!(out, "Created:     {}", format_date(task.created_at));
    out
}

pub fn format_task_list(tasks: &[&Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        let _ = writeln!(
            out,
            "{:<8}  {:<11}  {:<6}  {}{}",
            short_id(&task.id),
            task.status.as_str(),
            task.priority.as_str(),
            task.title,
            tag_suffix(task)
        );
    }
    out
}

pub fn format_board(view: &BoardView, project_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{project_name}");
    for column in &view.columns {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", column.status, column.tasks.len());
        if column.tasks.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for task in &column.tasks {
            let _ = writeln!(
                out,
                "  [{}] {}  {}{}",
                task.priority,
                short_id(&task.id),
                task.title,
                tag_suffix(task)
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoardState, Priority, Status};

    fn make_task(id: &str, title: &str, status: Status, tags: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority: Priority::High,
            created_at: 1_700_000_000_000,
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn short_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("1"), "1");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date(1_700_000_000_000), "2023-11-14");
        assert_eq!(format_date(0), "1970-01-01");
    }

    #[test]
    fn detail_omits_empty_fields() {
        let task = make_task("abc", "Write outline", Status::Review, &[]);
        let out = format_task_detail(&task);
        assert!(out.contains("Title:       Write outline\n"));
        assert!(out.contains("Status:      Review\n"));
        assert!(!out.contains("Description:"));
        assert!(!out.contains("Tags:"));
    }

    #[test]
    fn list_line() {
        let task = make_task("0123456789", "Plan", Status::InProgress, &["AI"]);
        let out = format_task_list(&[&task]);
        assert_eq!(out, "01234567  In Progress  High    Plan  #AI\n");
    }

    #[test]
    fn board_shows_counts_and_empty_columns() {
        let state = BoardState {
            project_name: "Launch".into(),
            tasks: vec![
                make_task("a", "First", Status::ToDo, &[]),
                make_task("b", "Second", Status::ToDo, &[]),
            ],
        };
        let out = format_board(&BoardView::build(&state, ""), &state.project_name);
        assert!(out.starts_with("Launch\n"));
        assert!(out.contains("To Do (2)\n  [High] a  First\n  [High] b  Second\n"));
        assert!(out.contains("Backlog (0)\n  (empty)\n"));
        assert!(out.contains("Done (0)\n"));
    }
}
