use std::collections::HashMap;

use serde_json::Value;

use common::JOINT_COUNT;

/// Parameter value shape accepted by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Sequence of exactly `len` floating-point values.
    FloatArray { len: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    MoveJoints,
    OpenGripper,
    CloseGripper,
}

/// A registered action: its name, a human-readable description for
/// discovery, and the parameter schema checked before the driver is touched.
pub struct ActionDef {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    kind: ActionKind,
}

static ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "move_joints",
        description: "Move the robot to the specified joint angles",
        params: &[ParamSpec {
            name: "joint_angles",
            kind: ParamKind::FloatArray { len: JOINT_COUNT },
        }],
        kind: ActionKind::MoveJoints,
    },
    ActionDef {
        name: "open_gripper",
        description: "Open the gripper",
        params: &[],
        kind: ActionKind::OpenGripper,
    },
    ActionDef {
        name: "close_gripper",
        description: "Close the gripper",
        params: &[],
        kind: ActionKind::CloseGripper,
    },
];

pub fn lookup(name: &str) -> Option<&'static ActionDef> {
    ACTIONS.iter().find(|def| def.name == name)
}

/// All registered actions, for discovery surfaces.
pub fn actions() -> impl Iterator<Item = &'static ActionDef> {
    ACTIONS.iter()
}

/// A request validated against its schema, ready to run against the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Invocation {
    MoveJoints([f64; JOINT_COUNT]),
    OpenGripper,
    CloseGripper,
}

/// Checks `parameters` against the action's schema. On any mismatch the
/// returned message is specific enough for the caller to fix the request;
/// the driver is never invoked for a request that fails here.
pub fn validate(
    def: &ActionDef,
    parameters: &HashMap<String, Value>,
) -> Result<Invocation, String> {
    match def.kind {
        ActionKind::MoveJoints => {
            let spec = &def.params[0];
            let ParamKind::FloatArray { len } = spec.kind;
            let values = extract_float_array(spec.name, len, parameters)?;
            let mut angles = [0.0; JOINT_COUNT];
            angles.copy_from_slice(&values);
            Ok(Invocation::MoveJoints(angles))
        }
        ActionKind::OpenGripper => Ok(Invocation::OpenGripper),
        ActionKind::CloseGripper => Ok(Invocation::CloseGripper),
    }
}

fn extract_float_array(
    name: &str,
    len: usize,
    parameters: &HashMap<String, Value>,
) -> Result<Vec<f64>, String> {
    let value = parameters
        .get(name)
        .ok_or_else(|| format!("Missing required parameter '{name}'"))?;
    let items = value
        .as_array()
        .ok_or_else(|| format!("Parameter '{name}' must be an array of numbers"))?;
    if items.len() != len {
        return Err(format!(
            "Parameter '{name}' must contain exactly {len} values, got {}",
            items.len()
        ));
    }
    let mut out = Vec::with_capacity(len);
    for item in items {
        out.push(
            item.as_f64()
                .ok_or_else(|| format!("Parameter '{name}' must contain only numbers"))?,
        );
    }
    Ok(out)
}
