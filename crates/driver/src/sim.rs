use std::sync::RwLock;

use async_trait::async_trait;
use tokio::time::sleep;

use common::{DeviceState, DriverError, JOINT_COUNT};

use crate::gate::BusyGate;
use crate::{DeviceDriver, MotionTimings};

/// Simulated robot arm. Motion latency is emulated by sleeping for the
/// configured duration; the new state is committed only after the sleep
/// completes, so concurrent readers observe the previous committed state
/// plus a true motion flag for the whole window.
///
/// The sleep holds no lock: the motion flag is an atomic and the state lock
/// is taken only for the commit itself.
pub struct SimulatedArm {
    robot_number: u32,
    timings: MotionTimings,
    gate: BusyGate,
    state: RwLock<DeviceState>,
}

impl SimulatedArm {
    /// Connects to the simulated robot. Fallible to model a real connection
    /// handshake; the simulator itself always succeeds.
    pub fn connect(robot_number: u32, timings: MotionTimings) -> Result<Self, DriverError> {
        Ok(Self {
            robot_number,
            timings,
            gate: BusyGate::new(),
            state: RwLock::new(DeviceState::default()),
        })
    }

    async fn actuate<F>(&self, duration: std::time::Duration, commit: F) -> Result<(), DriverError>
    where
        F: FnOnce(&mut DeviceState),
    {
        let _permit = self.gate.try_acquire().ok_or(DriverError::AlreadyBusy)?;
        sleep(duration).await;
        commit(&mut self.state.write().expect("device state lock poisoned"));
        Ok(())
    }
}

#[async_trait]
impl DeviceDriver for SimulatedArm {
    fn robot_number(&self) -> u32 {
        self.robot_number
    }

    fn readings(&self) -> DeviceState {
        *self.state.read().expect("device state lock poisoned")
    }

    fn is_moving(&self) -> bool {
        self.gate.is_busy()
    }

    async fn move_to_joint_angles(&self, angles: &[f64]) -> Result<(), DriverError> {
        // Busy check first, matching the dispatch pre-check order; the permit
        // releases the flag if validation fails.
        let _permit = self.gate.try_acquire().ok_or(DriverError::AlreadyBusy)?;
        if angles.len() != JOINT_COUNT {
            return Err(DriverError::InvalidArgument(format!(
                "Expected {JOINT_COUNT} joint angles, got {}.",
                angles.len()
            )));
        }
        let mut target = [0.0; JOINT_COUNT];
        target.copy_from_slice(angles);
        sleep(self.timings.move_duration).await;
        self.state
            .write()
            .expect("device state lock poisoned")
            .joint_angles = target;
        Ok(())
    }

    async fn open_gripper(&self) -> Result<(), DriverError> {
        self.actuate(self.timings.gripper_duration, |state| {
            state.gripper_closed = false;
        })
        .await
    }

    async fn close_gripper(&self) -> Result<(), DriverError> {
        self.actuate(self.timings.gripper_duration, |state| {
            state.gripper_closed = true;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn arm(timings: MotionTimings) -> SimulatedArm {
        SimulatedArm::connect(7, timings).unwrap()
    }

    #[tokio::test]
    async fn move_commits_exact_angles() {
        let arm = arm(MotionTimings::instant());
        let angles = [0.1, -0.25, 1.5, 0.0];
        arm.move_to_joint_angles(&angles).await.unwrap();
        assert_eq!(arm.readings().joint_angles, angles);
        assert!(!arm.is_moving());
    }

    #[tokio::test]
    async fn wrong_arity_is_rejected_and_state_unchanged() {
        let arm = arm(MotionTimings::instant());
        let err = arm.move_to_joint_angles(&[1.0, 2.0, 3.0]).await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidArgument(_)));
        assert_eq!(arm.readings(), DeviceState::default());
        // The motion flag must be reset even on the failure path.
        assert!(!arm.is_moving());
    }

    #[tokio::test]
    async fn gripper_toggles_commit() {
        let arm = arm(MotionTimings::instant());
        arm.close_gripper().await.unwrap();
        assert!(arm.readings().gripper_closed);
        arm.open_gripper().await.unwrap();
        assert!(!arm.readings().gripper_closed);
    }

    #[tokio::test]
    async fn motion_flag_is_visible_mid_operation() {
        let arm = Arc::new(arm(MotionTimings::from_millis(100, 100)));
        let worker = {
            let arm = Arc::clone(&arm);
            tokio::spawn(async move { arm.move_to_joint_angles(&[1.0, 1.0, 1.0, 1.0]).await })
        };
        sleep(std::time::Duration::from_millis(20)).await;
        assert!(arm.is_moving());
        // Mid-operation readings still show the previous committed state.
        assert_eq!(arm.readings(), DeviceState::default());
        worker.await.unwrap().unwrap();
        assert!(!arm.is_moving());
        assert_eq!(arm.readings().joint_angles, [1.0; 4]);
    }

    #[tokio::test]
    async fn concurrent_operations_never_overlap() {
        let arm = Arc::new(arm(MotionTimings::from_millis(50, 50)));
        let first = {
            let arm = Arc::clone(&arm);
            tokio::spawn(async move { arm.move_to_joint_angles(&[1.0, 2.0, 3.0, 4.0]).await })
        };
        sleep(std::time::Duration::from_millis(10)).await;
        let second = arm.move_to_joint_angles(&[9.0, 9.0, 9.0, 9.0]).await;
        assert_eq!(second.unwrap_err(), DriverError::AlreadyBusy);
        first.await.unwrap().unwrap();
        assert_eq!(arm.readings().joint_angles, [1.0, 2.0, 3.0, 4.0]);
    }
}
