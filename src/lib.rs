// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! # crp-robot-rs
//! crp-robot-rs is a supervisory control library for CRP six-axis industrial robot arms.
//! It sits on top of the vendor control service and takes care of the connect, servo power and
//! work mode protocols so that callers only have to think about where the robot should go.
//!
//! **ALWAYS HAVE THE EMERGENCY STOP AT
//! HAND WHILE CONTROLLING THE ROBOT!**
//!
//!
//! ## Design
//! The library is divided into the following modules:
//! * [robot](`crate::robot`) - contains the [`CrpRobot`] facade and the types it works with.
//! * [service](`crate::service`) - contains the traits a control service has to implement.
//! * [simulation](`crate::simulation`) - contains an in-process controller for tests and demos.
//! * [exception](`crate::exception`) - contains the error type.
//!
//! # Example:
//!```no_run
//! use std::collections::HashMap;
//! use std::time::Duration;
//! use crp::simulation::SimulatedController;
//! use crp::{CrpResult, CrpRobot};
//! fn main() -> CrpResult<()> {
//!     let mut robot = CrpRobot::new(SimulatedController::new(), None);
//!     robot.connect("192.168.0.100", 3)?;
//!     robot.servo_power_on(None)?;
//!     let mut target = HashMap::new();
//!     for (label, angle) in ["j1", "j2", "j3", "j4", "j5", "j6"].iter().zip([0., 0., 90., 0., 90., 0.].iter()) {
//!         target.insert(label.to_string(), *angle);
//!     }
//!     robot.move_joints(&target, Duration::from_secs(6))?;
//!     robot.move_linear(&[400., 0., 500., 180., 0., 0.], None)?;
//!     robot.disconnect();
//!     Ok(())
//! }
//!   ```
//!
//! The main function returns a CrpResult<()> which means that it returns either Ok(())
//! or an Error of type CrpException.
//!
//!```no_run
//! # use crp::simulation::SimulatedController;
//! # use crp::{CrpResult, CrpRobot};
//! # fn main() -> CrpResult<()> {
//! # let mut robot = CrpRobot::new(SimulatedController::new(), None);
//! robot.connect("192.168.0.100", 3)?;
//! # Ok(())
//! # }
//! ```
//! connects with the controller and switches it to Manual mode. If the controller refuses, the
//! connect is retried up to three times. Leaving out the address or the number of attempts uses
//! the defaults of the [`RobotConfig`].
//!
//! ```ignore
//! robot.servo_power_on(None)?;
//! ```
//! powers on the servos. This only works in Manual mode and the call only returns successfully
//! once the controller reports the servos as powered.
//!
//! ```ignore
//! robot.move_joints(&target, Duration::from_secs(6))?;
//! ```
//! sends a joint motion and blocks until the robot stopped moving. If it is still moving after
//! six seconds a [`Timeout`](`crate::exception::CrpException::Timeout`) is returned; the motion
//! itself keeps going until [`stop`](`crate::CrpRobot::stop`) is called.
//!
//! Errors can be matched by their [`ErrorKind`] to tell a violated precondition apart from a
//! controller which rejected a command:
//! ```no_run
//! # use crp::simulation::SimulatedController;
//! # use crp::{CrpRobot, ErrorKind};
//! let mut robot = CrpRobot::new(SimulatedController::new(), None);
//! match robot.servo_power_on(None) {
//!     Ok(()) => {}
//!     Err(e) if e.kind() == ErrorKind::PreconditionFailure => eprintln!("connect first: {}", e),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
pub mod exception;
pub mod robot;
pub mod service;
pub mod simulation;
pub mod utils;

pub use exception::{CrpException, CrpResult, ErrorKind};
pub use robot::config::{
    RobotConfig, DEFAULT_ADDRESS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MOTION_TIMEOUT,
};
pub use robot::control_types::*;
pub use robot::crp_robot::CrpRobot;
pub use robot::retry::RetryPolicy;
pub use robot::types::*;
pub use service::{RobotService, ServiceLoader};
pub use utils::*;
