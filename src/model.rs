use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const DAY_MS: i64 = 86_400_000;

pub const COLUMN_COUNT: usize = 5;

/// Board column. Declaration order is column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Backlog,
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Done,
}

impl Status {
    pub const ALL: [Status; COLUMN_COUNT] = [
        Status::Backlog,
        Status::ToDo,
        Status::InProgress,
        Status::Review,
        Status::Done,
    ];

    /// Accepts the column label case-insensitively, ignoring spaces, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::ToDo),
            "inprogress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => bail!(
                "invalid status '{s}': must be one of Backlog, To Do, In Progress, Review, Done"
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => bail!("invalid priority '{s}': must be Low, Medium, High, or Urgent"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    /// Epoch milliseconds, fixed at creation.
    pub created_at: i64,
    pub tags: Vec<String>,
}

/// Fields supplied by the creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
}

impl Default for NewTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            status: Status::ToDo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub project_name: String,
    pub tasks: Vec<Task>,
}

impl BoardState {
    /// The board shown on first run, before anything has been saved.
    pub fn seeded(now: i64) -> Self {
        let sample = |id: &str,
                      title: &str,
                      description: &str,
                      status: Status,
                      priority: Priority,
                      age_days: i64,
                      tag: &str| Task {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status,
            priority,
            created_at: now - DAY_MS * age_days,
            tags: vec![tag.into()],
        };
        Self {
            project_name: "Marketing Campaign Q4".into(),
            tasks: vec![
                sample(
                    "1",
                    "Design high-fidelity mockups",
                    "Create Figma prototypes for the new landing page and user dashboard.",
                    Status::InProgress,
                    Priority::High,
                    2,
                    "Design",
                ),
                sample(
                    "2",
                    "Refactor auth service",
                    "Implement JWT refresh tokens and secure cookie storage for enhanced security.",
                    Status::ToDo,
                    Priority::Urgent,
                    1,
                    "Dev",
                ),
                sample(
                    "3",
                    "Monthly newsletter copy",
                    "Draft the content for the October newsletter focusing on the new features.",
                    Status::Done,
                    Priority::Low,
                    5,
                    "Content",
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_lenient() {
        assert_eq!(Status::parse("To Do").unwrap(), Status::ToDo);
        assert_eq!(Status::parse("todo").unwrap(), Status::ToDo);
        assert_eq!(Status::parse("in-progress").unwrap(), Status::InProgress);
        assert_eq!(Status::parse("IN_PROGRESS").unwrap(), Status::InProgress);
        assert_eq!(Status::parse("done").unwrap(), Status::Done);
        assert!(Status::parse("blocked").is_err());
        assert!(Status::parse("").is_err());
    }

    #[test]
    fn status_order_defines_steps() {
        assert!(Status::Backlog < Status::ToDo);
        assert!(Status::Review < Status::Done);
        assert_eq!(Status::Backlog.prev(), None);
        assert_eq!(Status::Backlog.next(), Some(Status::ToDo));
        assert_eq!(Status::Review.next(), Some(Status::Done));
        assert_eq!(Status::Done.next(), None);
        assert_eq!(Status::InProgress.prev(), Some(Status::ToDo));
        for (i, s) in Status::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn priority_parse() {
        assert_eq!(Priority::parse("urgent").unwrap(), Priority::Urgent);
        assert_eq!(Priority::parse(" High ").unwrap(), Priority::High);
        assert!(Priority::parse("critical").is_err());
    }

    #[test]
    fn task_serializes_with_camel_case_keys_and_labels() {
        let task = Task {
            id: "x".into(),
            title: "t".into(),
            description: String::new(),
            status: Status::InProgress,
            priority: Priority::Urgent,
            created_at: 42,
            tags: vec!["AI".into()],
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["priority"], "Urgent");
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["tags"][0], "AI");
    }

    #[test]
    fn seeded_board() {
        let state = BoardState::seeded(10 * DAY_MS);
        assert_eq!(state.project_name, "Marketing Campaign Q4");
        assert_eq!(state.tasks.len(), 3);
        assert_eq!(state.get("2").unwrap().created_at, 9 * DAY_MS);
        assert!(state.contains("3"));
        assert!(!state.contains("4"));
    }

    #[test]
    fn new_task_defaults_match_the_form() {
        let draft = NewTask::default();
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.status, Status::ToDo);
    }
}
