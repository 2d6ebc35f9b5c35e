use anyhow::{bail, Result};
use uuid::Uuid;

use crate::model::{now_millis, BoardState, NewTask, Status, Task};
use crate::suggest::Suggestion;

pub const AI_TAG: &str = "AI";

/// Result of a transition that targets an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
    /// The task is already in the first or last column.
    AtEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Back,
}

fn fresh_id(state: &BoardState) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !state.contains(&id) {
            return id;
        }
    }
}

pub fn add_task(state: &BoardState, draft: NewTask) -> (BoardState, String) {
    let id = fresh_id(state);
    let task = Task {
        id: id.clone(),
        title: draft.title,
        description: draft.description,
        status: draft.status,
        priority: draft.priority,
        created_at: now_millis(),
        tags: Vec::new(),
    };
    let mut next = state.clone();
    next.tasks.push(task);
    (next, id)
}

/// Appends every suggestion to the Backlog, tagged as AI-sourced.
pub fn add_suggestions(
    state: &BoardState,
    suggestions: &[Suggestion],
) -> (BoardState, Vec<String>) {
    let mut next = state.clone();
    let mut ids = Vec::with_capacity(suggestions.len());
    let created_at = now_millis();
    for s in suggestions {
        let id = fresh_id(&next);
        next.tasks.push(Task {
            id: id.clone(),
            title: s.title.clone(),
            description: s.description.clone(),
            status: Status::Backlog,
            priority: s.priority,
            created_at,
            tags: vec![AI_TAG.to_string()],
        });
        ids.push(id);
    }
    (next, ids)
}

/// Reassigns a task's status. Any status may move to any other.
pub fn move_task(state: &BoardState, id: &str, status: Status) -> (BoardState, Outcome) {
    if !state.contains(id) {
        return (state.clone(), Outcome::NotFound);
    }
    let mut next = state.clone();
    for task in next.tasks.iter_mut().filter(|t| t.id == id) {
        task.status = status;
    }
    (next, Outcome::Applied)
}

pub fn step_task(state: &BoardState, id: &str, step: Step) -> (BoardState, Outcome) {
    let Some(task) = state.get(id) else {
        return (state.clone(), Outcome::NotFound);
    };
    let target = match step {
        Step::Forward => task.status.next(),
        Step::Back => task.status.prev(),
    };
    match target {
        Some(status) => move_task(state, id, status),
        None => (state.clone(), Outcome::AtEdge),
    }
}

pub fn delete_task(state: &BoardState, id: &str) -> (BoardState, Outcome) {
    if !state.contains(id) {
        return (state.clone(), Outcome::NotFound);
    }
    let mut next = state.clone();
    next.tasks.retain(|t| t.id != id);
    (next, Outcome::Applied)
}

/// Resolve a user-typed id: an exact match wins, otherwise a unique prefix.
pub fn resolve_id<'a>(state: &'a BoardState, query: &str) -> Result<&'a str> {
    if query.is_empty() {
        bail!("task id must not be empty");
    }
    if let Some(task) = state.get(query) {
        return Ok(&task.id);
    }
    let mut matches = state.tasks.iter().filter(|t| t.id.starts_with(query));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(&task.id),
        (Some(_), Some(_)) => bail!("task id prefix '{query}' is ambiguous"),
        (None, _) => bail!("task '{query}' not found"),
    }
}

/// Receives every new snapshot after a mutation has been applied.
pub trait StateObserver {
    fn state_changed(&mut self, state: &BoardState) -> Result<()>;
}

/// Owns the current snapshot and notifies observers on each applied change.
pub struct Board {
    state: BoardState,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Board {
    pub fn new(state: BoardState) -> Self {
        Self {
            state,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Swap in a snapshot loaded from elsewhere. Observers are not notified.
    pub fn reload(&mut self, state: BoardState) {
        self.state = state;
    }

    /// Every observer sees the new snapshot; the first failure is returned.
    fn commit(&mut self, next: BoardState) -> Result<()> {
        self.state = next;
        let mut first_err = None;
        for observer in &mut self.observers {
            if let Err(e) = observer.state_changed(&self.state) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn commit_outcome(&mut self, next: BoardState, outcome: Outcome) -> Result<Outcome> {
        if outcome == Outcome::Applied {
            self.commit(next)?;
        }
        Ok(outcome)
    }

    pub fn add_task(&mut self, draft: NewTask) -> Result<String> {
        let (next, id) = add_task(&self.state, draft);
        self.commit(next)?;
        Ok(id)
    }

    pub fn add_suggestions(&mut self, suggestions: &[Suggestion]) -> Result<Vec<String>> {
        if suggestions.is_empty() {
            return Ok(Vec::new());
        }
        let (next, ids) = add_suggestions(&self.state, suggestions);
        self.commit(next)?;
        Ok(ids)
    }

    pub fn move_task(&mut self, id: &str, status: Status) -> Result<Outcome> {
        let (next, outcome) = move_task(&self.state, id, status);
        self.commit_outcome(next, outcome)
    }

    pub fn step_task(&mut self, id: &str, step: Step) -> Result<Outcome> {
        let (next, outcome) = step_task(&self.state, id, step);
        self.commit_outcome(next, outcome)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Outcome> {
        let (next, outcome) = delete_task(&self.state, id);
        self.commit_outcome(next, outcome)
    }
}
