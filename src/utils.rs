// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! contains useful type definitions and conversion functions.
use crate::robot::control_types::{JointAngles, Pose};
use nalgebra::SVector;
use std::time::Duration;

/// A Vector with 6 entries
pub type Vector6 = SVector<f64, 6>;

impl From<Vector6> for JointAngles {
    fn from(vector: Vector6) -> Self {
        JointAngles::new(vector.into())
    }
}

impl From<JointAngles> for Vector6 {
    fn from(joints: JointAngles) -> Self {
        Vector6::from_row_slice(&joints.j)
    }
}

impl From<Vector6> for Pose {
    fn from(vector: Vector6) -> Self {
        Pose::new(vector.into())
    }
}

impl From<Pose> for Vector6 {
    fn from(pose: Pose) -> Self {
        Vector6::from_row_slice(&pose.to_array())
    }
}

/// converts milliseconds as used by the controller tools to a Duration. Negative values are zero.
pub fn millis(milliseconds: i64) -> Duration {
    Duration::from_millis(milliseconds.max(0) as u64)
}
