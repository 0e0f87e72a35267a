// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the [`CrpRobot`] type.
use std::collections::HashMap;
use std::time::Duration;

use crate::exception::CrpResult;
use crate::robot::config::RobotConfig;
use crate::robot::connection::ConnectionManager;
use crate::robot::control_types::{JointAngles, MotionRequest, Pose};
use crate::robot::motion::MotionExecutor;
use crate::robot::power::PowerModeController;
use crate::robot::session::Session;
use crate::robot::types::{ConnectionState, CoordinateFrame, PowerState, WorkMode};
use crate::service::{RobotService, ServiceLoader};

/// Supervises a CRP robot arm through its control service.
///
/// The robot moves through the states
/// `Disconnected -> Connected (servos off) <-> Connected (servos on)`. [`disconnect`](Self::disconnect)
/// returns to `Disconnected` from every state. Motions are only accepted with the servos powered on
/// and the controller in [`WorkMode::Manual`]. The work mode is read back from the controller
/// every time it is needed because it can be changed on the teach pendant.
///
/// All calls block. A `CrpRobot` is meant to be driven by a single thread; put it behind a `Mutex`
/// if several threads need to command it.
///
/// Dropping a `CrpRobot` releases the service handle but does neither power off the servos nor
/// disconnect. Call [`disconnect`](Self::disconnect) for that.
///
/// **ALWAYS HAVE THE EMERGENCY STOP AT HAND WHILE COMMANDING THE ROBOT!**
pub struct CrpRobot<L: ServiceLoader> {
    session: Session<L>,
    connection: ConnectionManager,
    power_mode: PowerModeController,
    motion: MotionExecutor,
    config: RobotConfig,
}

impl<L: ServiceLoader> CrpRobot<L> {
    /// Creates a disconnected robot.
    ///
    /// # Arguments
    /// * `loader` - loads the control service on [`connect`](Self::connect).
    /// * `config` - defaults and protocol timings. Default is [`RobotConfig::default`].
    /// # Example
    /// ```no_run
    /// use crp::{CrpRobot, CrpResult};
    /// use crp::simulation::SimulatedController;
    /// fn main() -> CrpResult<()> {
    ///     let mut robot = CrpRobot::new(SimulatedController::new(), None);
    ///     robot.connect("192.168.0.100", 3)?;
    ///     robot.servo_power_on(None)?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new<C: Into<Option<RobotConfig>>>(loader: L, config: C) -> Self {
        let config = config.into().unwrap_or_default();
        CrpRobot {
            session: Session::new(loader),
            connection: ConnectionManager::new(config.connect_backoff),
            power_mode: PowerModeController::new(
                config.power_on_settle,
                config.power_on_retry_interval,
            ),
            motion: MotionExecutor::new(config.motion_poll_interval),
            config,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Connects to the controller and switches it to Manual mode.
    ///
    /// An existing connection is closed first. A connect attempt only counts as successful if the
    /// switch to Manual mode succeeded as well; otherwise the connection is dropped and the next
    /// attempt starts after [`RobotConfig::connect_backoff`].
    ///
    /// The hardware safety interlock is not checked on connect. Make sure the workcell is safe
    /// before connecting.
    /// # Arguments
    /// * `address` - IP address of the controller. Default is [`RobotConfig::address`].
    /// * `max_attempts` - number of connect attempts. Default is [`RobotConfig::max_attempts`].
    /// # Errors
    /// * [`ResourceUnavailable`](`crate::exception::CrpException::ResourceUnavailable`) if the
    /// control service cannot be initialized or provides no robot service.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if all attempts
    /// failed.
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if
    /// `max_attempts` is zero.
    pub fn connect<'a, A: Into<Option<&'a str>>, N: Into<Option<u32>>>(
        &mut self,
        address: A,
        max_attempts: N,
    ) -> CrpResult<()> {
        let address = address.into().unwrap_or(self.config.address.as_str());
        let max_attempts = max_attempts.into().unwrap_or(self.config.max_attempts);
        self.connection
            .connect(&mut self.session, address, max_attempts)
    }

    /// Powers the servos off and disconnects. Never fails; afterwards the robot is
    /// disconnected with the servos off, whatever the controller answered.
    pub fn disconnect(&mut self) {
        self.connection.disconnect(&mut self.session);
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection
    }

    /// Powers the servos on and returns as soon as the controller confirms it.
    ///
    /// # Arguments
    /// * `max_attempts` - number of power on attempts. Default is [`RobotConfig::max_attempts`].
    /// # Errors
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if the
    /// robot is not connected or not in Manual mode. Power on is not attempted in that case.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if no attempt
    /// was confirmed.
    pub fn servo_power_on<N: Into<Option<u32>>>(&mut self, max_attempts: N) -> CrpResult<()> {
        let max_attempts = max_attempts.into().unwrap_or(self.config.max_attempts);
        self.power_mode
            .servo_power_on(&mut self.session, max_attempts)
    }

    /// Powers the servos off but keeps the connection.
    /// # Errors
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if the
    /// servos are not powered on.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if the
    /// controller rejected the command. The servos are still considered on in that case.
    pub fn servo_power_off(&mut self) -> CrpResult<()> {
        PowerModeController::servo_power_off(&mut self.session)
    }

    pub fn is_servo_on(&self) -> bool {
        self.session.is_servo_on()
    }

    pub fn power_state(&self) -> PowerState {
        self.session.power
    }

    pub fn switch_work_mode(&mut self, mode: WorkMode) -> CrpResult<()> {
        PowerModeController::switch_work_mode(&mut self.session, mode)
    }

    /// Reads the work mode code from the controller.
    ///
    /// Returns [`UNAVAILABLE`](`crate::robot::types::UNAVAILABLE`) if not connected or if the
    /// read fails.
    pub fn get_work_mode(&mut self) -> i32 {
        PowerModeController::get_work_mode(&mut self.session)
    }

    /// reads the work mode from the controller, `None` if it is unavailable or unknown
    pub fn work_mode(&mut self) -> Option<WorkMode> {
        PowerModeController::work_mode(&mut self.session)
    }

    pub fn is_manual_mode(&mut self) -> bool {
        PowerModeController::is_manual_mode(&mut self.session)
    }

    /// true if Manual mode was forced by the last successful [`connect`](Self::connect)
    pub fn manual_mode_forced(&self) -> bool {
        self.session.manual_forced
    }

    /// Moves to absolute joint angles and waits until the robot stopped.
    ///
    /// # Arguments
    /// * `target` - angles in \[deg\] keyed by `j1` to `j6`. All six are required.
    /// * `wait` - how long to wait for the motion. Default is [`RobotConfig::motion_timeout`].
    /// # Errors
    /// * [`InvalidMotionTarget`](`crate::exception::CrpException::InvalidMotionTarget`) if a joint
    /// label is missing.
    /// * see [`execute`](Self::execute)
    pub fn move_joints<W: Into<Option<Duration>>>(
        &mut self,
        target: &HashMap<String, f64>,
        wait: W,
    ) -> CrpResult<()> {
        MotionExecutor::check_powered(&self.session)?;
        let target = JointAngles::from_labeled(target)?;
        self.move_joints_to(&target, wait)
    }

    /// Moves to absolute joint angles and waits until the robot stopped.
    pub fn move_joints_to<W: Into<Option<Duration>>>(
        &mut self,
        target: &JointAngles,
        wait: W,
    ) -> CrpResult<()> {
        let request = MotionRequest::joints(*target, self.wait_or_default(wait));
        self.execute(&request)
    }

    /// Moves along a straight line to an absolute pose and waits until the robot stopped.
    ///
    /// # Arguments
    /// * `target` - `[x, y, z, Rx, Ry, Rz]` in \[mm\] and \[deg\].
    /// * `wait` - how long to wait for the motion. Default is [`RobotConfig::motion_timeout`].
    /// # Errors
    /// * [`InvalidMotionTarget`](`crate::exception::CrpException::InvalidMotionTarget`) if
    /// `target` does not have exactly six values.
    /// * see [`execute`](Self::execute)
    pub fn move_linear<W: Into<Option<Duration>>>(
        &mut self,
        target: &[f64],
        wait: W,
    ) -> CrpResult<()> {
        MotionExecutor::check_powered(&self.session)?;
        let target = Pose::from_slice(target)?;
        self.move_linear_to(&target, wait)
    }

    /// Moves along a straight line to an absolute pose and waits until the robot stopped.
    pub fn move_linear_to<W: Into<Option<Duration>>>(
        &mut self,
        target: &Pose,
        wait: W,
    ) -> CrpResult<()> {
        let request = MotionRequest::linear(*target, self.wait_or_default(wait));
        self.execute(&request)
    }

    /// Sends a motion and blocks until the robot stopped moving.
    /// # Errors
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if the
    /// robot is not connected, the servos are off or the controller is not in Manual mode.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if the
    /// controller did not accept the motion.
    /// * [`Timeout`](`crate::exception::CrpException::Timeout`) if the robot was still moving when
    /// the timeout passed. The motion is not stopped; use [`stop`](Self::stop) for that.
    pub fn execute(&mut self, request: &MotionRequest) -> CrpResult<()> {
        self.motion.execute(&mut self.session, request)
    }

    /// Reads the current joint angles. `None` if not connected or the read fails.
    pub fn read_joints(&mut self) -> Option<JointAngles> {
        self.session.connected_service().ok()?.get_current_joint()
    }

    /// Reads the end effector pose in the world frame. All zeros if not connected or the read fails.
    pub fn read_end_pose(&mut self) -> Pose {
        self.read_end_pose_in(CoordinateFrame::World)
    }

    /// Reads the end effector pose in the given frame. All zeros if not connected or the read fails.
    pub fn read_end_pose_in(&mut self, frame: CoordinateFrame) -> Pose {
        let service = match self.session.connected_service() {
            Ok(service) => service,
            Err(_) => return Pose::default(),
        };
        let pose = match frame {
            CoordinateFrame::World => service.get_world_posture(),
            CoordinateFrame::User => service.get_user_posture(),
        };
        pose.unwrap_or_default()
    }

    /// Stops the current motion. The servos stay powered and the work mode is kept.
    pub fn stop(&mut self) -> CrpResult<()> {
        MotionExecutor::stop(&mut self.session)
    }

    /// Sets the speed ratio in percent (0 to 100).
    pub fn set_speed_ratio(&mut self, ratio: i32) -> CrpResult<()> {
        PowerModeController::set_speed_ratio(&mut self.session, ratio)
    }

    /// Reads the speed ratio in percent. [`UNAVAILABLE`](`crate::robot::types::UNAVAILABLE`) if
    /// not connected or the read fails.
    pub fn get_speed_ratio(&mut self) -> i32 {
        PowerModeController::get_speed_ratio(&mut self.session)
    }

    fn wait_or_default<W: Into<Option<Duration>>>(&self, wait: W) -> Duration {
        wait.into().unwrap_or(self.config.motion_timeout)
    }
}
