use thiserror::Error;

/// Failures surfaced by a device driver operation. All of these are caught at
/// the dispatcher boundary and converted into a `Failed` action result; none
/// of them crash the node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Another physical operation is in flight on this device.
    #[error("Robot is already moving")]
    AlreadyBusy,
    /// Bad operation arguments; rejected before any motion starts.
    #[error("{0}")]
    InvalidArgument(String),
    /// The device reported a failure during the physical operation.
    #[error("Driver operation failed: {0}")]
    Operation(String),
}

/// Node-level failures. `Startup` is the one fatal case: the node never
/// enters a serving-ready state without a connected driver.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Robot interface not initialized")]
    NotInitialized,
    #[error("Failed to connect to robot {robot_number}: {reason}")]
    Startup { robot_number: u32, reason: String },
    #[error(transparent)]
    Driver(#[from] DriverError),
}
