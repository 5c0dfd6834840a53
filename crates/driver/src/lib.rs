//! Device driver capability contract and the simulated robot-arm driver.

use std::time::Duration;

use async_trait::async_trait;

use common::{DeviceState, DriverError};

pub mod gate;
mod sim;

pub use gate::{BusyGate, BusyPermit};
pub use sim::SimulatedArm;

/// How long each physical operation takes. Injectable so tests can run with
/// near-zero windows while production uses real motion timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTimings {
    pub move_duration: Duration,
    pub gripper_duration: Duration,
}

impl MotionTimings {
    /// Real-world timings: a joint move takes seconds, a gripper toggle about
    /// a second.
    pub fn production() -> Self {
        Self {
            move_duration: Duration::from_secs(5),
            gripper_duration: Duration::from_secs(1),
        }
    }

    pub fn from_millis(move_ms: u64, gripper_ms: u64) -> Self {
        Self {
            move_duration: Duration::from_millis(move_ms),
            gripper_duration: Duration::from_millis(gripper_ms),
        }
    }

    /// Zero-length windows for tests that only care about outcomes.
    pub fn instant() -> Self {
        Self {
            move_duration: Duration::ZERO,
            gripper_duration: Duration::ZERO,
        }
    }
}

impl Default for MotionTimings {
    fn default() -> Self {
        Self::production()
    }
}

/// Capability contract the node runtime needs from a device driver.
///
/// Operations run a single physical motion to completion; at most one may be
/// in flight per device. The readings accessors never block, so reporters
/// can sample them mid-operation. `readings` and `is_moving` may be sampled
/// independently; no torn-read guarantee is made across the pair.
#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Identifier of the robot this driver controls.
    fn robot_number(&self) -> u32;

    /// Latest committed device state.
    fn readings(&self) -> DeviceState;

    /// True strictly for the duration of a physical operation, reset on
    /// every exit path including failures.
    fn is_moving(&self) -> bool;

    /// Moves the arm to the given joint angles. Fails with
    /// [`DriverError::InvalidArgument`] unless exactly four angles are given.
    async fn move_to_joint_angles(&self, angles: &[f64]) -> Result<(), DriverError>;

    async fn open_gripper(&self) -> Result<(), DriverError>;

    async fn close_gripper(&self) -> Result<(), DriverError>;
}
