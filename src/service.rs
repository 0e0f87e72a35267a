// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the contract of the vendor control service.
//!
//! The vendor SDK itself (library discovery, loading and the wire protocol to the controller) is
//! not part of this crate. Anything which implements [`ServiceLoader`] and [`RobotService`] can be
//! supervised by a [`CrpRobot`](`crate::CrpRobot`), e.g. a binding to the vendor library or the
//! [`SimulatedController`](`crate::simulation::SimulatedController`).
#[cfg(test)]
use mockall::automock;

use crate::robot::control_types::{JointAngles, Pose};

/// Primitives of the controller. Every call talks to the hardware.
///
/// Boolean results are `true` on success. Readers return `None` if the controller could not be
/// queried.
#[cfg_attr(test, automock)]
pub trait RobotService {
    /// Connects to the controller. If `disable_safety_interlock` is set the hardware safety
    /// switch is not checked.
    fn connect(&mut self, address: &str, disable_safety_interlock: bool) -> bool;
    fn disconnect(&mut self);

    fn set_work_mode(&mut self, code: i32) -> bool;
    /// returns the current work mode code or a negative value on failure
    fn get_work_mode(&mut self) -> i32;

    fn servo_power_on(&mut self) -> bool;
    fn servo_power_off(&mut self) -> bool;
    fn is_servo_on(&mut self) -> bool;

    /// starts a joint space motion and returns without waiting for it
    fn move_j(&mut self, target: &JointAngles) -> bool;
    /// starts a straight line Cartesian motion and returns without waiting for it
    fn move_l(&mut self, target: &Pose) -> bool;
    fn stop_move(&mut self) -> bool;
    fn is_moving(&mut self) -> Option<bool>;

    fn get_current_joint(&mut self) -> Option<JointAngles>;
    fn get_world_posture(&mut self) -> Option<Pose>;
    fn get_user_posture(&mut self) -> Option<Pose>;

    /// sets the speed ratio in percent
    fn set_speed_ratio(&mut self, ratio: i32) -> bool;
    /// returns the speed ratio in percent or a negative value on failure
    fn get_speed_ratio(&mut self) -> i32;
}

/// Loads the control service and hands out its handle.
///
/// At most one handle is held at a time. It is acquired on connect and dropped on disconnect.
#[cfg_attr(test, automock(type Service = MockRobotService;))]
pub trait ServiceLoader {
    type Service: RobotService;

    fn initialize(&mut self) -> bool;
    fn deinitialize(&mut self);
    fn acquire_service(&mut self) -> Option<Self::Service>;
}
