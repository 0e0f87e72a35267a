// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the motion dispatch and the wait for its completion.
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::exception::{
    create_hardware_rejection, create_precondition_failure, CrpException, CrpResult,
};
use crate::robot::control_types::{MotionRequest, MotionTarget};
use crate::robot::power::PowerModeController;
use crate::robot::session::Session;
use crate::service::{RobotService, ServiceLoader};

pub(crate) struct MotionExecutor {
    poll_interval: Duration,
}

impl MotionExecutor {
    pub fn new(poll_interval: Duration) -> Self {
        MotionExecutor { poll_interval }
    }

    /// Checks the preconditions which do not need the controller.
    pub fn check_powered<L: ServiceLoader>(session: &Session<L>) -> CrpResult<()> {
        if !session.is_connected() {
            return Err(create_precondition_failure("robot is not connected, cannot move"));
        }
        if !session.is_servo_on() {
            return Err(create_precondition_failure("servos are powered off, cannot move"));
        }
        Ok(())
    }

    /// Sends the motion and blocks until the robot stopped moving or the timeout passed.
    /// # Errors
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if the
    /// robot is not connected, not powered or not in Manual mode. Nothing is sent in that case.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if the
    /// controller did not accept the motion.
    /// * [`Timeout`](`crate::exception::CrpException::Timeout`) if the motion was accepted but the
    /// robot was still moving at the deadline.
    pub fn execute<L: ServiceLoader>(
        &self,
        session: &mut Session<L>,
        request: &MotionRequest,
    ) -> CrpResult<()> {
        Self::check_powered(session)?;
        if !PowerModeController::is_manual_mode(session) {
            return Err(create_precondition_failure(
                "robot is not in manual mode, cannot move",
            ));
        }
        let service = session.connected_service()?;
        let (name, dispatched) = match &request.target {
            MotionTarget::Joints(joints) => ("MoveJ", service.move_j(joints)),
            MotionTarget::Linear(pose) => ("MoveL", service.move_l(pose)),
        };
        if !dispatched {
            error!("{} command was rejected", name);
            return Err(CrpException::HardwareRejection {
                message: format!("{} command was rejected", name),
            });
        }
        debug!("{} dispatched: {:?}", name, request.target);
        self.wait_for_motion(service, request.timeout).map_err(|e| {
            error!("{} did not finish: {}", name, e);
            e
        })
    }

    /// Polls the moving flag until it reports that the robot stopped.
    ///
    /// A flag which cannot be read counts as still moving. The flag is read once more after the
    /// last sleep, so a motion finishing right at the deadline is not reported as timed out.
    pub fn wait_for_motion<S: RobotService>(
        &self,
        service: &mut S,
        timeout: Duration,
    ) -> CrpResult<()> {
        let start = Instant::now();
        loop {
            match service.is_moving() {
                Some(false) => {
                    debug!("motion finished after {:?}", start.elapsed());
                    return Ok(());
                }
                Some(true) => {}
                None => debug!("moving flag could not be read"),
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(CrpException::Timeout { timeout });
            }
            sleep(self.poll_interval.min(timeout - elapsed));
        }
    }

    /// Stops the current motion. The servos stay powered.
    pub fn stop<L: ServiceLoader>(session: &mut Session<L>) -> CrpResult<()> {
        let service = session
            .connected_service()
            .map_err(|_| create_precondition_failure("robot is not connected, cannot stop"))?;
        if service.stop_move() {
            info!("motion stopped");
            Ok(())
        } else {
            Err(create_hardware_rejection("stop was rejected"))
        }
    }
}
