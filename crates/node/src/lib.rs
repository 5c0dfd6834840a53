//! Node runtime: action dispatch, state/status reporting, and lifecycle for
//! a single device-control node.

pub mod actions;
pub mod node;
pub mod report;

pub use node::RobotNode;
pub use report::{spawn_reporters, ReporterHandles};
