// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the servo power and work mode protocols.
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::exception::{
    create_hardware_rejection, create_precondition_failure, CrpException, CrpResult,
};
use crate::robot::retry::RetryPolicy;
use crate::robot::session::Session;
use crate::robot::types::{PowerState, WorkMode, UNAVAILABLE};
use crate::service::{RobotService, ServiceLoader};

pub(crate) struct PowerModeController {
    settle: Duration,
    retry_interval: Duration,
}

impl PowerModeController {
    pub fn new(settle: Duration, retry_interval: Duration) -> Self {
        PowerModeController {
            settle,
            retry_interval,
        }
    }

    /// Switches the work mode. Connection and power state are left as they are.
    pub fn switch_work_mode<L: ServiceLoader>(
        session: &mut Session<L>,
        mode: WorkMode,
    ) -> CrpResult<()> {
        let service = session
            .connected_service()
            .map_err(|_| create_precondition_failure("robot is not connected, cannot switch mode"))?;
        if service.set_work_mode(mode.code()) {
            debug!("switched work mode to {}", mode);
            Ok(())
        } else {
            Err(CrpException::HardwareRejection {
                message: format!("controller rejected switching to {} mode", mode),
            })
        }
    }

    /// reads the work mode code, [`UNAVAILABLE`] if not connected or the read fails
    pub fn get_work_mode<L: ServiceLoader>(session: &mut Session<L>) -> i32 {
        match session.connected_service() {
            Ok(service) => {
                let code = service.get_work_mode();
                if code < 0 {
                    UNAVAILABLE
                } else {
                    code
                }
            }
            Err(_) => UNAVAILABLE,
        }
    }

    pub fn work_mode<L: ServiceLoader>(session: &mut Session<L>) -> Option<WorkMode> {
        WorkMode::from_code(Self::get_work_mode(session))
    }

    pub fn is_manual_mode<L: ServiceLoader>(session: &mut Session<L>) -> bool {
        Self::work_mode(session) == Some(WorkMode::Manual)
    }

    /// Powers the servos on and returns as soon as the controller confirms it.
    ///
    /// Requires a connection and Manual mode, which is read back from the controller. If the
    /// servos are already tracked as on and the controller still reports them on, nothing is sent.
    pub fn servo_power_on<L: ServiceLoader>(
        &self,
        session: &mut Session<L>,
        max_attempts: u32,
    ) -> CrpResult<()> {
        if !session.is_connected() {
            error!("robot is not connected, cannot power on");
            return Err(create_precondition_failure(
                "robot is not connected, cannot power on",
            ));
        }
        if !Self::is_manual_mode(session) {
            error!("robot is not in manual mode, cannot power on");
            return Err(create_precondition_failure(
                "robot is not in manual mode, cannot power on",
            ));
        }
        if session.is_servo_on() && session.connected_service()?.is_servo_on() {
            debug!("servos are already powered on");
            return Ok(());
        }
        let settle = self.settle;
        RetryPolicy::new(max_attempts, self.retry_interval).run("servo power on", |attempt| {
            info!("servo power on, attempt {}", attempt);
            let service = session.connected_service()?;
            if !service.servo_power_on() {
                return Err(create_hardware_rejection("servo power on was rejected"));
            }
            sleep(settle);
            if service.is_servo_on() {
                Ok(())
            } else {
                Err(create_hardware_rejection("servo power on was not confirmed"))
            }
        })?;
        session.power = PowerState::On;
        info!("servos powered on");
        Ok(())
    }

    /// Powers the servos off. The connection is kept.
    pub fn servo_power_off<L: ServiceLoader>(session: &mut Session<L>) -> CrpResult<()> {
        if !session.is_connected() || !session.is_servo_on() {
            return Err(create_precondition_failure("servos are not powered on"));
        }
        if session.connected_service()?.servo_power_off() {
            session.power = PowerState::Off;
            info!("servos powered off");
            Ok(())
        } else {
            error!("servo power off was rejected");
            Err(create_hardware_rejection("servo power off was rejected"))
        }
    }

    /// sets the speed ratio in percent, allowed range is 0 to 100
    pub fn set_speed_ratio<L: ServiceLoader>(session: &mut Session<L>, ratio: i32) -> CrpResult<()> {
        if !(0..=100).contains(&ratio) {
            return Err(CrpException::PreconditionFailure {
                message: format!("speed ratio {} is outside of 0..=100", ratio),
            });
        }
        if session.connected_service()?.set_speed_ratio(ratio) {
            debug!("speed ratio set to {}%", ratio);
            Ok(())
        } else {
            Err(create_hardware_rejection("speed ratio was rejected"))
        }
    }

    /// reads the speed ratio in percent, [`UNAVAILABLE`] if not connected or the read fails
    pub fn get_speed_ratio<L: ServiceLoader>(session: &mut Session<L>) -> i32 {
        match session.connected_service() {
            Ok(service) => {
                let ratio = service.get_speed_ratio();
                if ratio < 0 {
                    UNAVAILABLE
                } else {
                    ratio
                }
            }
            Err(_) => UNAVAILABLE,
        }
    }
}
