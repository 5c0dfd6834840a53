use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{error, info};

use common::{
    ActionRequest, ActionResult, NodeConfig, NodeError, NodeStateSnapshot, NodeStatus,
};
use driver::{DeviceDriver, MotionTimings, SimulatedArm};

use crate::actions::{self, Invocation};

/// A node controlling one robot. Owns the driver slot and the set of running
/// actions; serves action dispatch plus on-demand state/status sampling.
///
/// Dispatch is synchronous from the caller's point of view: the future
/// resolves once the physical operation completes or the request is
/// rejected. There is no cancellation; a caller that stops waiting leaves
/// the operation running to completion.
pub struct RobotNode {
    config: NodeConfig,
    driver: RwLock<Option<Arc<dyn DeviceDriver>>>,
    running_actions: Mutex<BTreeSet<String>>,
}

impl RobotNode {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            driver: RwLock::new(None),
            running_actions: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Connects the driver. A connection failure is fatal: the node must not
    /// enter a serving-ready state without a driver.
    pub fn startup(&self) -> Result<(), NodeError> {
        info!(robot_number = self.config.robot_number, "Connecting to robot");
        let timings = MotionTimings::from_millis(
            self.config.move_duration_ms,
            self.config.gripper_duration_ms,
        );
        let arm = SimulatedArm::connect(self.config.robot_number, timings).map_err(|err| {
            NodeError::Startup {
                robot_number: self.config.robot_number,
                reason: err.to_string(),
            }
        })?;
        info!(robot_number = arm.robot_number(), "Connected to robot");
        *self.driver.write().expect("driver slot lock poisoned") = Some(Arc::new(arm));
        Ok(())
    }

    /// Disconnects the driver. Idempotent; shutting down an already
    /// shut-down node is a no-op.
    pub fn shutdown(&self) {
        let released = self
            .driver
            .write()
            .expect("driver slot lock poisoned")
            .take();
        if released.is_some() {
            info!(
                robot_number = self.config.robot_number,
                "Disconnected from robot"
            );
        }
    }

    fn driver(&self) -> Option<Arc<dyn DeviceDriver>> {
        self.driver.read().expect("driver slot lock poisoned").clone()
    }

    /// Runs one action request to its single [`ActionResult`].
    ///
    /// Rejections (unknown action, bad parameters, no driver, busy) return
    /// immediately and never touch the device. The driver's own gate remains
    /// the atomic arbiter between racing dispatches; the busy pre-check here
    /// only fails fast with a clearer message.
    pub async fn dispatch(&self, request: ActionRequest) -> ActionResult {
        let def = match actions::lookup(&request.action_name) {
            Some(def) => def,
            None => {
                error!(action = %request.action_name, "Unknown action");
                return ActionResult::failed(format!(
                    "Unknown action: {}",
                    request.action_name
                ));
            }
        };

        let invocation = match actions::validate(def, &request.parameters) {
            Ok(invocation) => invocation,
            Err(message) => {
                error!(action = def.name, %message, "Invalid action parameters");
                return ActionResult::failed(message);
            }
        };

        let Some(driver) = self.driver() else {
            error!(action = def.name, "Robot interface not initialized");
            return ActionResult::failed("Robot interface not initialized");
        };

        if driver.is_moving() {
            error!(action = def.name, "Robot is already moving");
            return ActionResult::failed("Robot is already moving");
        }

        let _running = RunningAction::register(&self.running_actions, def.name);
        let outcome = match invocation {
            Invocation::MoveJoints(angles) => driver.move_to_joint_angles(&angles).await,
            Invocation::OpenGripper => driver.open_gripper().await,
            Invocation::CloseGripper => driver.close_gripper().await,
        };

        match outcome {
            Ok(()) => {
                info!(action = def.name, "Action succeeded");
                ActionResult::succeeded()
            }
            Err(err) => {
                error!(action = def.name, %err, "Action failed");
                ActionResult::failed(err.to_string())
            }
        }
    }

    /// Current published state: the full device readings, or an explicit
    /// all-null snapshot when no driver is attached. Never a stale partial.
    pub fn sample_state(&self) -> NodeStateSnapshot {
        match self.driver() {
            Some(driver) => NodeStateSnapshot::from_state(&driver.readings()),
            None => NodeStateSnapshot::unavailable(),
        }
    }

    /// Current busy/idle status. With a driver attached, busy when the
    /// device is in motion or any action is still registered; without one,
    /// only the software-tracked running set is available.
    pub fn sample_status(&self) -> NodeStatus {
        let running_actions = self
            .running_actions
            .lock()
            .expect("running actions lock poisoned")
            .clone();
        let busy = match self.driver() {
            Some(driver) => driver.is_moving() || !running_actions.is_empty(),
            None => !running_actions.is_empty(),
        };
        NodeStatus {
            busy,
            running_actions,
        }
    }
}

/// Membership of one action in the running set, removed on drop so the set
/// is restored on every dispatch exit path.
struct RunningAction<'a> {
    set: &'a Mutex<BTreeSet<String>>,
    name: &'static str,
}

impl<'a> RunningAction<'a> {
    fn register(set: &'a Mutex<BTreeSet<String>>, name: &'static str) -> Self {
        set.lock()
            .expect("running actions lock poisoned")
            .insert(name.to_string());
        Self { set, name }
    }
}

impl Drop for RunningAction<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("running actions lock poisoned")
            .remove(self.name);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::sleep;

    use super::*;

    fn fast_config() -> NodeConfig {
        NodeConfig {
            robot_number: 0,
            move_duration_ms: 50,
            gripper_duration_ms: 20,
            status_poll_period_ms: 10,
        }
    }

    fn started_node() -> Arc<RobotNode> {
        let node = Arc::new(RobotNode::new(fast_config()));
        node.startup().unwrap();
        node
    }

    fn move_request(angles: serde_json::Value) -> ActionRequest {
        ActionRequest::new("move_joints").with_parameter("joint_angles", angles)
    }

    fn errors(result: ActionResult) -> Vec<String> {
        match result {
            ActionResult::Failed { errors } => errors,
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn move_round_trips_exact_angles() {
        let node = started_node();
        let angles = [0.125, -2.5, 3.0, 0.0];
        let result = node.dispatch(move_request(json!(angles))).await;
        assert!(result.is_success());

        let snapshot = node.sample_state();
        assert_eq!(snapshot.joint_angles, Some(angles));
        assert_eq!(snapshot.gripper_closed, Some(false));
    }

    #[tokio::test]
    async fn wrong_arity_fails_without_moving() {
        let node = started_node();
        let result = node.dispatch(move_request(json!([1.0, 2.0, 3.0]))).await;
        assert!(errors(result)[0].contains("exactly 4"));
        assert_eq!(node.sample_state().joint_angles, Some([0.0; 4]));
    }

    #[tokio::test]
    async fn dispatch_before_startup_is_not_initialized() {
        let node = RobotNode::new(fast_config());
        for name in ["move_joints", "open_gripper", "close_gripper"] {
            let request = match name {
                "move_joints" => move_request(json!([0.0, 0.0, 0.0, 0.0])),
                other => ActionRequest::new(other),
            };
            let result = node.dispatch(request).await;
            assert_eq!(errors(result), vec!["Robot interface not initialized".to_string()]);
        }
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let node = started_node();
        let result = node.dispatch(ActionRequest::new("wave")).await;
        assert_eq!(errors(result), vec!["Unknown action: wave".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_moves_admit_exactly_one() {
        let node = started_node();
        let worker = {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                node.dispatch(move_request(json!([1.0, 2.0, 3.0, 4.0]))).await
            })
        };
        sleep(Duration::from_millis(10)).await;

        let second = node.dispatch(move_request(json!([9.0, 9.0, 9.0, 9.0]))).await;
        assert_eq!(errors(second), vec!["Robot is already moving".to_string()]);

        let first = worker.await.unwrap();
        assert!(first.is_success());
        assert_eq!(node.sample_state().joint_angles, Some([1.0, 2.0, 3.0, 4.0]));
    }

    #[tokio::test]
    async fn status_is_busy_only_while_in_flight() {
        let node = started_node();
        assert!(!node.sample_status().busy);

        let worker = {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                node.dispatch(move_request(json!([1.0, 1.0, 1.0, 1.0]))).await
            })
        };
        sleep(Duration::from_millis(10)).await;

        let status = node.sample_status();
        assert!(status.busy);
        assert!(status.running_actions.contains("move_joints"));

        worker.await.unwrap();
        let status = node.sample_status();
        assert!(!status.busy);
        assert!(status.running_actions.is_empty());
    }

    #[tokio::test]
    async fn gripper_sequence_reflects_last_operation() {
        let node = started_node();

        assert!(node.dispatch(ActionRequest::new("open_gripper")).await.is_success());
        assert!(node.dispatch(ActionRequest::new("close_gripper")).await.is_success());
        assert_eq!(node.sample_state().gripper_closed, Some(true));

        assert!(node.dispatch(ActionRequest::new("close_gripper")).await.is_success());
        assert!(node.dispatch(ActionRequest::new("open_gripper")).await.is_success());
        assert_eq!(node.sample_state().gripper_closed, Some(false));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_detaches_state() {
        let node = started_node();
        node.shutdown();
        node.shutdown();

        assert_eq!(node.sample_state(), NodeStateSnapshot::unavailable());
        let status = node.sample_status();
        assert!(!status.busy);

        let result = node.dispatch(ActionRequest::new("open_gripper")).await;
        assert_eq!(errors(result), vec!["Robot interface not initialized".to_string()]);
    }
}
