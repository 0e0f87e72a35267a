// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the state which a [`CrpRobot`](`crate::CrpRobot`) owns.
use tracing::debug;

use crate::exception::{create_precondition_failure, CrpResult};
use crate::robot::types::{ConnectionState, PowerState};
use crate::service::ServiceLoader;

/// Loader, service handle and the tracked connection and power state.
///
/// Invariant: `power == On` implies `connection == Connected`, and `Connected` implies that a
/// service handle is held.
pub(crate) struct Session<L: ServiceLoader> {
    pub(crate) loader: L,
    pub(crate) service: Option<L::Service>,
    initialized: bool,
    pub(crate) connection: ConnectionState,
    pub(crate) power: PowerState,
    /// set once Manual was forced by connect
    pub(crate) manual_forced: bool,
}

impl<L: ServiceLoader> Session<L> {
    pub fn new(loader: L) -> Self {
        Session {
            loader,
            service: None,
            initialized: false,
            connection: ConnectionState::Disconnected,
            power: PowerState::Off,
            manual_forced: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn is_servo_on(&self) -> bool {
        self.power == PowerState::On
    }

    /// returns the service handle if the robot is connected
    pub fn connected_service(&mut self) -> CrpResult<&mut L::Service> {
        if !self.is_connected() {
            return Err(create_precondition_failure("robot is not connected"));
        }
        self.service
            .as_mut()
            .ok_or_else(|| create_precondition_failure("robot is not connected"))
    }

    /// initializes the loader unless that already happened
    pub fn initialize(&mut self) -> bool {
        if !self.initialized {
            self.initialized = self.loader.initialize();
        }
        self.initialized
    }

    pub fn mark_disconnected(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.power = PowerState::Off;
        self.manual_forced = false;
    }

    /// Resets to Disconnected/Off, drops the service handle and deinitializes the loader.
    pub fn release(&mut self) {
        self.mark_disconnected();
        self.service = None;
        if self.initialized {
            debug!("deinitializing control service");
            self.loader.deinitialize();
            self.initialized = false;
        }
    }
}
