// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the connect and disconnect protocols.
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::exception::{
    create_hardware_rejection, create_precondition_failure, create_resource_unavailable,
    CrpResult,
};
use crate::robot::power::PowerModeController;
use crate::robot::retry::RetryPolicy;
use crate::robot::session::Session;
use crate::robot::types::{ConnectionState, WorkMode};
use crate::service::{RobotService, ServiceLoader};

pub(crate) struct ConnectionManager {
    backoff: Duration,
}

impl ConnectionManager {
    pub fn new(backoff: Duration) -> Self {
        ConnectionManager { backoff }
    }

    /// Connects to the controller and forces Manual mode.
    ///
    /// An existing connection is closed first. The hardware safety interlock check is disabled on
    /// connect: the caller is responsible for the physical environment being safe.
    pub fn connect<L: ServiceLoader>(
        &self,
        session: &mut Session<L>,
        address: &str,
        max_attempts: u32,
    ) -> CrpResult<()> {
        if max_attempts == 0 {
            return Err(create_precondition_failure(
                "at least one connect attempt is required",
            ));
        }
        if session.is_connected() {
            info!("closing the existing connection before reconnecting");
            self.disconnect(session);
        }
        if !session.initialize() {
            error!("control service could not be initialized");
            return Err(create_resource_unavailable(
                "control service could not be initialized",
            ));
        }
        match session.loader.acquire_service() {
            Some(service) => session.service = Some(service),
            None => {
                error!("control service did not provide a robot service");
                session.release();
                return Err(create_resource_unavailable(
                    "control service did not provide a robot service",
                ));
            }
        }

        let result = RetryPolicy::new(max_attempts, self.backoff).run("connect", |attempt| {
            info!("connecting to {}, attempt {}", address, attempt);
            Self::try_connect(session, address)
        });
        match result {
            Ok(()) => {
                info!("connected to {} in manual mode", address);
                Ok(())
            }
            Err(e) => {
                error!("could not connect to {}: {}", address, e);
                session.release();
                Err(e)
            }
        }
    }

    fn try_connect<L: ServiceLoader>(session: &mut Session<L>, address: &str) -> CrpResult<()> {
        let service = session
            .service
            .as_mut()
            .ok_or_else(|| create_resource_unavailable("no robot service handle"))?;
        if !service.connect(address, true) {
            return Err(create_hardware_rejection("controller refused the connection"));
        }
        session.connection = ConnectionState::Connected;
        match PowerModeController::switch_work_mode(session, WorkMode::Manual) {
            Ok(()) => {
                session.manual_forced = true;
                Ok(())
            }
            Err(e) => {
                warn!("connected but switching to manual mode failed: {}", e);
                if let Some(service) = session.service.as_mut() {
                    service.disconnect();
                }
                session.mark_disconnected();
                Err(create_hardware_rejection(
                    "connected but could not switch to manual mode",
                ))
            }
        }
    }

    /// Powers the servos off and disconnects, ignoring whatever the controller answers.
    ///
    /// Always ends Disconnected/Off with the service handle released, also when called while
    /// already disconnected.
    pub fn disconnect<L: ServiceLoader>(&self, session: &mut Session<L>) {
        if let Ok(service) = session.connected_service() {
            if !service.servo_power_off() {
                debug!("servo power off on disconnect was rejected");
            }
            service.disconnect();
            info!("disconnected from robot");
        }
        session.release();
    }
}
