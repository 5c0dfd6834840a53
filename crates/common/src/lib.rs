use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod config;
pub mod error;

pub use config::NodeConfig;
pub use error::{DriverError, NodeError};

/// Joint count of the arm this node controls.
pub const JOINT_COUNT: usize = 4;

/// Committed device readings. Written only by a completed physical
/// operation; read freely by reporters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub joint_angles: [f64; JOINT_COUNT],
    pub gripper_closed: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            joint_angles: [0.0; JOINT_COUNT],
            gripper_closed: false,
        }
    }
}

/// An inbound action invocation: a registered action name plus a payload of
/// named parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl ActionRequest {
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}

/// Outcome envelope produced exactly once per [`ActionRequest`].
///
/// `Cancelled` is part of the envelope for callers but is never produced by
/// this node: an operation that has started runs to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Succeeded { data: Option<Value> },
    Failed { errors: Vec<String> },
    Cancelled,
}

impl ActionResult {
    pub fn succeeded() -> Self {
        Self::Succeeded { data: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            errors: vec![message.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Externally visible busy/idle indicator. `running_actions` is owned by the
/// dispatcher; `busy` is derived from it and the driver's motion flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub busy: bool,
    pub running_actions: BTreeSet<String>,
}

/// Point-in-time published copy of [`DeviceState`], or a fully-null snapshot
/// when no driver is attached. Recomputed each sample, never partially stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStateSnapshot {
    pub joint_angles: Option<[f64; JOINT_COUNT]>,
    pub gripper_closed: Option<bool>,
}

impl NodeStateSnapshot {
    pub fn unavailable() -> Self {
        Self {
            joint_angles: None,
            gripper_closed: None,
        }
    }

    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            joint_angles: Some(state.joint_angles),
            gripper_closed: Some(state.gripper_closed),
        }
    }

    pub fn is_available(&self) -> bool {
        self.joint_angles.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_carries_message() {
        let result = ActionResult::failed("Robot is already moving");
        assert!(result.is_failure());
        match result {
            ActionResult::Failed { errors } => {
                assert_eq!(errors, vec!["Robot is already moving".to_string()]);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn unavailable_snapshot_is_fully_null() {
        let snapshot = NodeStateSnapshot::unavailable();
        assert!(!snapshot.is_available());
        assert_eq!(snapshot.joint_angles, None);
        assert_eq!(snapshot.gripper_closed, None);
    }

    #[test]
    fn action_result_serializes_with_status_tag() {
        let json = serde_json::to_value(ActionResult::succeeded()).unwrap();
        assert_eq!(json["status"], "succeeded");

        let json = serde_json::to_value(ActionResult::failed("bad")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["errors"][0], "bad");
    }
}
