//! The persisted board record.
//!
//! The whole board lives under one key as a JSON object:
//!
//! ```json
//! { "version": 1, "projectName": "...", "tasks": [ ... ] }
//! ```
//!
//! Records written before versioning carry no `version` field. They have the
//! same shape as version 1 and are read as such.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::board::StateObserver;
use crate::model::BoardState;
use crate::store::KeyValueStore;

pub const STATE_KEY: &str = "zenkanban_pro_state";
pub const CORRUPT_KEY: &str = "zenkanban_pro_state.corrupt";
pub const CURRENT_VERSION: u64 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    #[serde(flatten)]
    state: &'a BoardState,
}

pub fn encode(state: &BoardState) -> Result<String> {
    let envelope = Envelope {
        version: CURRENT_VERSION,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode(raw: &str) -> Result<BoardState> {
    let mut value: Value = serde_json::from_str(raw).context("stored board is not valid JSON")?;
    let Some(obj) = value.as_object_mut() else {
        bail!("stored board is not a JSON object");
    };
    let version = match obj.remove("version") {
        None => 0,
        Some(v) => v
            .as_u64()
            .with_context(|| format!("invalid board version {v}"))?,
    };
    if version > CURRENT_VERSION {
        bail!(
            "stored board has version {version}; this build understands up to {CURRENT_VERSION}"
        );
    }
    // Version 0 and 1 share the same layout.
    let state: BoardState = serde_json::from_value(value)
        .context("stored board does not match the expected layout")?;
    let mut seen = HashSet::new();
    for task in &state.tasks {
        if !seen.insert(task.id.as_str()) {
            bail!("stored board repeats task id '{}'", task.id);
        }
    }
    Ok(state)
}

pub fn load(store: &dyn KeyValueStore) -> Result<Option<BoardState>> {
    match store.get(STATE_KEY)? {
        Some(raw) => decode(&raw).map(Some),
        None => Ok(None),
    }
}

pub fn save(store: &dyn KeyValueStore, state: &BoardState) -> Result<()> {
    store.set(STATE_KEY, &encode(state)?)
}

/// Load the stored board, falling back to the seeded board when nothing is
/// stored or the record cannot be read. An unreadable record is copied to
/// [`CORRUPT_KEY`] before it gets overwritten by the next save.
pub fn load_or_default(store: &dyn KeyValueStore, now: i64) -> Result<BoardState> {
    let Some(raw) = store.get(STATE_KEY)? else {
        return Ok(BoardState::seeded(now));
    };
    match decode(&raw) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!("discarding unreadable board: {e:#}");
            store.set(CORRUPT_KEY, &raw)?;
            Ok(BoardState::seeded(now))
        }
    }
}

/// Writes every new snapshot to the store.
pub struct PersistObserver<S> {
    store: S,
}

impl<S: KeyValueStore> PersistObserver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> StateObserver for PersistObserver<S> {
    fn state_changed(&mut self, state: &BoardState) -> Result<()> {
        save(&self.store, state).context("failed to save board")
    }
}
