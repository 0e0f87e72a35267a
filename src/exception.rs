// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains exception and Result definitions
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a [`CrpException`].
///
/// Callers that only care about *why* something failed (and not about the message) can match on
/// this instead of the individual exception variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected locally before the controller was touched. Never retried.
    PreconditionFailure,
    /// The controller answered a primitive with failure.
    HardwareRejection,
    /// A motion was dispatched but did not finish before the deadline.
    Timeout,
    /// The control service could not be initialized or no handle was available.
    ResourceUnavailable,
}

/// Represents all kind of errors which can occur while supervising the robot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrpException {
    /// PreconditionFailure is returned if an operation is not allowed in the current state,
    /// e.g. moving while the servos are powered off.
    #[error("{message}")]
    PreconditionFailure { message: String },

    /// InvalidMotionTarget is returned if a motion target is incomplete or has the wrong arity.
    /// Nothing is sent to the robot in that case.
    #[error("invalid motion target: {message}")]
    InvalidMotionTarget { message: String },

    /// HardwareRejection is returned if the controller rejects a command.
    #[error("{message}")]
    HardwareRejection { message: String },

    /// Timeout is returned if a dispatched motion was still running when the deadline passed.
    #[error("motion did not finish within {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// ResourceUnavailable is returned if the control service cannot be initialized or does not
    /// provide a robot service handle.
    #[error("{message}")]
    ResourceUnavailable { message: String },
}

impl CrpException {
    /// the taxonomy bucket of this exception
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrpException::PreconditionFailure { .. } | CrpException::InvalidMotionTarget { .. } => {
                ErrorKind::PreconditionFailure
            }
            CrpException::HardwareRejection { .. } => ErrorKind::HardwareRejection,
            CrpException::Timeout { .. } => ErrorKind::Timeout,
            CrpException::ResourceUnavailable { .. } => ErrorKind::ResourceUnavailable,
        }
    }
}

/// creates a PreconditionFailure from a static string slice
pub(crate) fn create_precondition_failure(message: &'static str) -> CrpException {
    CrpException::PreconditionFailure {
        message: message.to_string(),
    }
}

/// creates a HardwareRejection from a static string slice
pub(crate) fn create_hardware_rejection(message: &'static str) -> CrpException {
    CrpException::HardwareRejection {
        message: message.to_string(),
    }
}

/// creates a ResourceUnavailable from a static string slice
pub(crate) fn create_resource_unavailable(message: &'static str) -> CrpException {
    CrpException::ResourceUnavailable {
        message: message.to_string(),
    }
}

/// Result type which can have CrpException as Error
pub type CrpResult<T> = Result<T, CrpException>;
