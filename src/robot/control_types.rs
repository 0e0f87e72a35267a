// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the value types of motion commands and read-backs.
//!
//! Values are passed through to the controller unmodified. Joint angles are in \[deg\], positions in
//! \[mm\] and orientations in \[deg\].
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::exception::{CrpException, CrpResult};

/// Labels of the six joints, in order.
pub const JOINT_LABELS: [&str; 6] = ["j1", "j2", "j3", "j4", "j5", "j6"];

/// Joint configuration of the arm.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct JointAngles {
    /// Angles of j1 to j6 in \[deg\].
    pub j: [f64; 6],
}

impl JointAngles {
    /// Creates a new JointAngles instance
    /// # Arguments
    /// * `j` - angles of j1 to j6 in \[deg\]
    pub fn new(j: [f64; 6]) -> Self {
        JointAngles { j }
    }

    /// Creates joint angles from a map which is keyed by the labels `j1` to `j6`.
    ///
    /// Labels which are not joint labels are ignored.
    /// # Errors
    /// * [`InvalidMotionTarget`](`crate::exception::CrpException::InvalidMotionTarget`) if any of
    /// the six labels is missing. Missing joints are never filled with zeros.
    pub fn from_labeled(labeled: &HashMap<String, f64>) -> CrpResult<Self> {
        let mut j = [0.; 6];
        for (value, label) in j.iter_mut().zip(JOINT_LABELS.iter()) {
            *value = *labeled
                .get(*label)
                .ok_or_else(|| CrpException::InvalidMotionTarget {
                    message: format!("joint target is missing {}", label),
                })?;
        }
        Ok(JointAngles { j })
    }

    /// returns the angle of a joint by its label
    pub fn get(&self, label: &str) -> Option<f64> {
        JOINT_LABELS
            .iter()
            .position(|x| *x == label)
            .map(|index| self.j[index])
    }

    /// returns the angles keyed by `j1` to `j6`
    pub fn labeled(&self) -> BTreeMap<String, f64> {
        JOINT_LABELS
            .iter()
            .zip(self.j.iter())
            .map(|(label, value)| (label.to_string(), *value))
            .collect()
    }
}

impl From<[f64; 6]> for JointAngles {
    fn from(j: [f64; 6]) -> Self {
        JointAngles::new(j)
    }
}

/// End effector pose.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct Pose {
    /// x in \[mm\]
    pub x: f64,
    /// y in \[mm\]
    pub y: f64,
    /// z in \[mm\]
    pub z: f64,
    /// rotation around x in \[deg\]
    pub rx: f64,
    /// rotation around y in \[deg\]
    pub ry: f64,
    /// rotation around z in \[deg\]
    pub rz: f64,
}

impl Pose {
    /// Creates a new Pose instance from `[x, y, z, Rx, Ry, Rz]`
    pub fn new(values: [f64; 6]) -> Self {
        Pose {
            x: values[0],
            y: values[1],
            z: values[2],
            rx: values[3],
            ry: values[4],
            rz: values[5],
        }
    }

    /// Creates a pose from an ordered slice `[x, y, z, Rx, Ry, Rz]`.
    /// # Errors
    /// * [`InvalidMotionTarget`](`crate::exception::CrpException::InvalidMotionTarget`) if the slice
    /// does not contain exactly six values.
    pub fn from_slice(values: &[f64]) -> CrpResult<Self> {
        if values.len() != 6 {
            return Err(CrpException::InvalidMotionTarget {
                message: format!("pose needs exactly 6 values but {} were given", values.len()),
            });
        }
        let mut array = [0.; 6];
        array.copy_from_slice(values);
        Ok(Pose::new(array))
    }

    /// returns the pose as `[x, y, z, Rx, Ry, Rz]`
    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }
}

impl From<[f64; 6]> for Pose {
    fn from(values: [f64; 6]) -> Self {
        Pose::new(values)
    }
}

/// Where a motion should go.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MotionTarget {
    /// joint space motion (MoveJ)
    Joints(JointAngles),
    /// straight line Cartesian motion (MoveL)
    Linear(Pose),
}

/// A single motion command together with how long to wait for it to finish.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionRequest {
    pub target: MotionTarget,
    pub timeout: Duration,
}

impl MotionRequest {
    pub fn joints(target: JointAngles, timeout: Duration) -> Self {
        MotionRequest {
            target: MotionTarget::Joints(target),
            timeout,
        }
    }
    pub fn linear(target: Pose, timeout: Duration) -> Self {
        MotionRequest {
            target: MotionTarget::Linear(target),
            timeout,
        }
    }
}
