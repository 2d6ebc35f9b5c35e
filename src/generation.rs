use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use log::{error, info};

use crate::board::Board;
use crate::suggest::{Suggestion, TaskSuggester};

/// The one message shown to the user for any failed generation.
pub const FAILURE_NOTICE: &str = "AI task generation failed. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Ids of the tasks appended to the Backlog (possibly none).
    Added(Vec<String>),
    Failed(&'static str),
}

/// Apply a finished suggestion request to the board.
///
/// Request failures never reach the caller as errors; they are logged and
/// turned into [`Settlement::Failed`]. Only a failure to record the new
/// tasks is returned as `Err`.
pub fn settle(board: &mut Board, result: Result<Vec<Suggestion>>) -> Result<Settlement> {
    match result {
        Ok(suggestions) => {
            let ids = board.add_suggestions(&suggestions)?;
            info!("added {} suggested tasks", ids.len());
            Ok(Settlement::Added(ids))
        }
        Err(e) => {
            error!("task generation failed: {e:#}");
            Ok(Settlement::Failed(FAILURE_NOTICE))
        }
    }
}

/// Run a suggestion request on the calling thread and settle it.
pub fn run_blocking(
    board: &mut Board,
    suggester: &dyn TaskSuggester,
    description: &str,
) -> Result<Settlement> {
    let result = suggester.suggest(description);
    settle(board, result)
}

/// Background suggestion request for interactive use. At most one request
/// is in flight; there is no queueing and no cancellation.
pub struct Generation {
    rx: Option<Receiver<Result<Vec<Suggestion>>>>,
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

impl Generation {
    pub fn new() -> Self {
        Self { rx: None }
    }

    pub fn state(&self) -> GenerationState {
        if self.rx.is_some() {
            GenerationState::Generating
        } else {
            GenerationState::Idle
        }
    }

    /// Start a request. Returns false, doing nothing, if one is already running.
    pub fn start(&mut self, suggester: Arc<dyn TaskSuggester>, description: String) -> bool {
        if self.rx.is_some() {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = suggester.suggest(&description);
            // Ignore send errors (receiver dropped)
            let _ = tx.send(result);
        });
        self.rx = Some(rx);
        true
    }

    /// Non-blocking check for a finished request. Yields the result once and
    /// returns to Idle, whether the request succeeded or not.
    pub fn poll(&mut self) -> Option<Result<Vec<Suggestion>>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow!("generation worker exited without a result"))
            }
        };
        self.rx = None;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use anyhow::bail;

    use super::*;
    use crate::model::{BoardState, Priority, Status};

    struct Fixed(Vec<Suggestion>);

    impl TaskSuggester for Fixed {
        fn suggest(&self, _description: &str) -> Result<Vec<Suggestion>> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl TaskSuggester for Offline {
        fn suggest(&self, _description: &str) -> Result<Vec<Suggestion>> {
            bail!("connection refused")
        }
    }

    /// Blocks until released, counting calls.
    struct Gated {
        calls: AtomicUsize,
        gate: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl TaskSuggester for Gated {
        fn suggest(&self, _description: &str) -> Result<Vec<Suggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(rx) = self.gate.lock().unwrap().take() {
                let _ = rx.recv();
            }
            Ok(Vec::new())
        }
    }

    fn suggestion(title: &str) -> Suggestion {
        Suggestion {
            title: title.into(),
            description: String::new(),
            priority: Priority::High,
        }
    }

    fn wait_for(generation: &mut Generation) -> Result<Vec<Suggestion>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = generation.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "generation did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn empty_answer_leaves_board_unchanged() {
        let mut board = Board::new(BoardState::seeded(0));
        let settlement = run_blocking(&mut board, &Fixed(Vec::new()), "anything").unwrap();
        assert_eq!(settlement, Settlement::Added(Vec::new()));
        assert_eq!(board.state(), &BoardState::seeded(0));
    }

    #[test]
    fn network_failure_yields_one_notice() {
        let mut board = Board::new(BoardState::seeded(0));
        let settlement = run_blocking(&mut board, &Offline, "anything").unwrap();
        assert_eq!(settlement, Settlement::Failed(FAILURE_NOTICE));
        assert_eq!(board.state(), &BoardState::seeded(0));
    }

    #[test]
    fn success_appends_to_backlog() {
        let mut board = Board::new(BoardState::seeded(0));
        let fixed = Fixed(vec![suggestion("a"), suggestion("b")]);
        let Settlement::Added(ids) = run_blocking(&mut board, &fixed, "x").unwrap() else {
            panic!("expected success");
        };
        assert_eq!(ids.len(), 2);
        for id in &ids {
            let task = board.state().get(id).unwrap();
            assert_eq!(task.status, Status::Backlog);
            assert_eq!(task.tags, vec!["AI".to_string()]);
        }
    }

    #[test]
    fn background_request_returns_to_idle() {
        let mut generation = Generation::new();
        assert_eq!(generation.state(), GenerationState::Idle);
        assert!(generation.start(Arc::new(Fixed(vec![suggestion("a")])), "x".into()));
        let result = wait_for(&mut generation).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(generation.state(), GenerationState::Idle);
        assert!(generation.poll().is_none());
    }

    #[test]
    fn background_failure_returns_to_idle() {
        let mut generation = Generation::new();
        assert!(generation.start(Arc::new(Offline), "x".into()));
        assert!(wait_for(&mut generation).is_err());
        assert_eq!(generation.state(), GenerationState::Idle);
    }

    #[test]
    fn second_start_refused_while_generating() {
        let (release, gate) = mpsc::channel();
        let gated = Arc::new(Gated {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(Some(gate)),
        });
        let mut generation = Generation::new();
        assert!(generation.start(gated.clone(), "x".into()));
        assert_eq!(generation.state(), GenerationState::Generating);
        assert!(!generation.start(gated.clone(), "y".into()));
        assert!(generation.poll().is_none());

        release.send(()).unwrap();
        wait_for(&mut generation).unwrap();
        assert_eq!(gated.calls.load(Ordering::SeqCst), 1);

        assert!(generation.start(gated.clone(), "z".into()));
        wait_for(&mut generation).unwrap();
        assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
    }
}
