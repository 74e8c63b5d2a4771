//! Serializable snapshot of a machine's current state and history map.

use super::error::CheckpointError;
use super::StateMachineLoader;
use crate::core::State;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Last active child recorded for a composite state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry<S> {
    pub composite: S,
    pub last_active: S,
}

/// Snapshot produced by [`StateMachine::save`](crate::StateMachine::save).
///
/// Does NOT include actions or transitions: those are code, re-declared by
/// the host before the checkpoint is loaded into a fresh machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the machine the checkpoint was taken from
    pub machine: String,

    /// Current state at the time of the checkpoint
    pub current_state: Option<S>,

    /// Last active child per composite state
    pub history_states: Vec<HistoryEntry<S>>,
}

impl<S: State> Checkpoint<S> {
    pub fn new(
        machine: impl Into<String>,
        current_state: Option<S>,
        history_states: &HashMap<S, S>,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: machine.into(),
            current_state,
            history_states: history_states
                .iter()
                .map(|(composite, last_active)| HistoryEntry {
                    composite: composite.clone(),
                    last_active: last_active.clone(),
                })
                .collect(),
        }
    }

    /// History entries as a map.
    pub fn history_map(&self) -> HashMap<S, S> {
        self.history_states
            .iter()
            .map(|entry| (entry.composite.clone(), entry.last_active.clone()))
            .collect()
    }
}

impl<S: State + Serialize + DeserializeOwned> Checkpoint<S> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<S: State> StateMachineLoader<S> for Checkpoint<S> {
    fn current_state(&self) -> Option<S> {
        self.current_state.clone()
    }

    fn history_states(&self) -> HashMap<S, S> {
        self.history_map()
    }
}
