// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the bounded retry loop used by the connect and power on protocols.
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, warn};

use crate::exception::{create_precondition_failure, CrpException, CrpResult, ErrorKind};

/// How often an operation is attempted and how long to wait in between.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// pause between two attempts. There is no pause after the last attempt.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            backoff,
        }
    }

    /// Calls `attempt` with the 1-based attempt number until it returns `Ok`.
    ///
    /// Only [`HardwareRejection`](`crate::exception::ErrorKind::HardwareRejection`)s are retried,
    /// every other error is returned at once.
    /// # Errors
    /// * [`PreconditionFailure`](`crate::exception::CrpException::PreconditionFailure`) if
    /// `max_attempts` is zero. `attempt` is not called in that case.
    /// * [`HardwareRejection`](`crate::exception::CrpException::HardwareRejection`) if all attempts
    /// were rejected.
    pub fn run<T, F>(&self, operation: &str, mut attempt: F) -> CrpResult<T>
    where
        F: FnMut(u32) -> CrpResult<T>,
    {
        if self.max_attempts == 0 {
            return Err(create_precondition_failure(
                "at least one attempt is required",
            ));
        }
        let mut last_error = None;
        for attempt_number in 1..=self.max_attempts {
            if attempt_number > 1 {
                sleep(self.backoff);
            }
            debug!(
                "{}: attempt {}/{}",
                operation, attempt_number, self.max_attempts
            );
            match attempt(attempt_number) {
                Ok(value) => return Ok(value),
                Err(error) if error.kind() == ErrorKind::HardwareRejection => {
                    warn!(
                        "{}: attempt {}/{} failed: {}",
                        operation, attempt_number, self.max_attempts, error
                    );
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }
        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(CrpException::HardwareRejection {
            message: format!(
                "{} failed after {} attempts: {}",
                operation, self.max_attempts, reason
            ),
        })
    }
}
