// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`RobotConfig`] type.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Address of the controller if none is given to [`connect`](`crate::CrpRobot::connect`).
pub const DEFAULT_ADDRESS: &str = "192.168.0.100";
/// How often connect and servo power on are attempted by default.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// How long a motion may take by default before it is reported as timed out.
pub const DEFAULT_MOTION_TIMEOUT: Duration = Duration::from_millis(6000);

/// Defaults and protocol timings of a [`CrpRobot`](`crate::CrpRobot`).
///
/// The defaults match what the controller needs in practice; shorter timings are mostly useful
/// against a simulated controller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RobotConfig {
    /// controller address used when `connect` is called without one
    pub address: String,
    /// attempts used when `connect` or `servo_power_on` are called without a count
    pub max_attempts: u32,
    /// wait between two connect attempts
    pub connect_backoff: Duration,
    /// wait between sending servo power on and reading back the servo state
    pub power_on_settle: Duration,
    /// wait between two unconfirmed servo power on attempts
    pub power_on_retry_interval: Duration,
    /// how often the moving flag is queried while waiting for a motion
    pub motion_poll_interval: Duration,
    /// wait used when a motion is commanded without a timeout
    pub motion_timeout: Duration,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            address: DEFAULT_ADDRESS.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            connect_backoff: Duration::from_secs(1),
            power_on_settle: Duration::from_millis(500),
            power_on_retry_interval: Duration::from_millis(500),
            motion_poll_interval: Duration::from_millis(100),
            motion_timeout: DEFAULT_MOTION_TIMEOUT,
        }
    }
}
