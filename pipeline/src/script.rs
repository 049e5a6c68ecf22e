//! Motion script container.

use serde::{Deserialize, Serialize};

use crate::interfaces::ScriptSink;

/// One scripted position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Target position in [0, 99]
    pub position: i32,
    /// Timestamp in milliseconds from video start
    pub timestamp_ms: i64,
}

/// In-memory motion script, kept ordered by timestamp.
///
/// Actions arrive grouped by extremum kind, so insertion interleaves them
/// into a single ascending-timestamp sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionScript {
    actions: Vec<Action>,
}

impl MotionScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ScriptSink for MotionScript {
    fn add_action(&mut self, position: i32, timestamp_ms: i64) {
        let action = Action {
            position,
            timestamp_ms,
        };
        let pos = self
            .actions
            .partition_point(|a| a.timestamp_ms <= timestamp_ms);
        self.actions.insert(pos, action);
    }
}
