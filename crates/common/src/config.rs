use serde::Deserialize;
use std::fs;

/// Node configuration, loaded from a TOML file. Motion durations are
/// injectable so tests can run with near-zero windows while production uses
/// real timings.
#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    /// Identifier of the robot this node controls.
    #[serde(default)]
    pub robot_number: u32,
    #[serde(default = "default_move_duration_ms")]
    pub move_duration_ms: u64,
    #[serde(default = "default_gripper_duration_ms")]
    pub gripper_duration_ms: u64,
    /// Period of the background state/status reporters.
    #[serde(default = "default_status_poll_period_ms")]
    pub status_poll_period_ms: u64,
}

fn default_move_duration_ms() -> u64 {
    5_000
}

fn default_gripper_duration_ms() -> u64 {
    1_000
}

fn default_status_poll_period_ms() -> u64 {
    500
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            robot_number: 0,
            move_duration_ms: default_move_duration_ms(),
            gripper_duration_ms: default_gripper_duration_ms(),
            status_poll_period_ms: default_status_poll_period_ms(),
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: NodeConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

pub fn load_config(path: &str) -> Result<NodeConfig, Box<dyn std::error::Error>> {
    NodeConfig::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: NodeConfig = toml::from_str("robot_number = 3").unwrap();
        assert_eq!(config.robot_number, 3);
        assert_eq!(config.move_duration_ms, 5_000);
        assert_eq!(config.gripper_duration_ms, 1_000);
        assert_eq!(config.status_poll_period_ms, 500);
    }

    #[test]
    fn full_config_parses() {
        let config: NodeConfig = toml::from_str(
            "robot_number = 7\n\
             move_duration_ms = 50\n\
             gripper_duration_ms = 20\n\
             status_poll_period_ms = 10\n",
        )
        .unwrap();
        assert_eq!(config.robot_number, 7);
        assert_eq!(config.move_duration_ms, 50);
        assert_eq!(config.gripper_duration_ms, 20);
        assert_eq!(config.status_poll_period_ms, 10);
    }
}
