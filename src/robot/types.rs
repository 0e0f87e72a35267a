// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the connection, power and work mode types of the robot.
use std::fmt::{Display, Formatter, Result};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Sentinel returned by code based getters if the value is not available.
pub const UNAVAILABLE: i32 = -1;

/// Whether the facade currently holds a connection to the controller.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Servo power state as tracked by the facade. Only set to `On` after the controller confirmed it.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
}

/// Work mode of the controller. It decides which commands the controller accepts.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i32)]
#[derive(FromPrimitive)]
pub enum WorkMode {
    /// Required for direct joint and Cartesian motion as well as servo power on.
    Manual = 0,
    /// Program playback.
    Auto = 1,
    /// Commanded by a remote host.
    Remote = 2,
}

impl WorkMode {
    /// decodes a work mode code as reported by the controller
    pub fn from_code(code: i32) -> Option<WorkMode> {
        WorkMode::from_i32(code)
    }
    /// the code which is sent to the controller
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Display for WorkMode {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{:?}", self)
    }
}

/// Coordinate frame in which the end effector pose is read.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordinateFrame {
    World,
    User,
}
