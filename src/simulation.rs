// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains an in-process stand-in for the CRP control service.
//!
//! [`SimulatedController`] implements both [`ServiceLoader`] and [`RobotService`] on a shared state,
//! so a clone kept by the caller can script failures and inspect how often each primitive was
//! called while a [`CrpRobot`](`crate::CrpRobot`) owns the service handle.
//!
//! ```
//! use crp::simulation::SimulatedController;
//! use crp::CrpRobot;
//!
//! let controller = SimulatedController::new().refuse_connects(2);
//! let mut robot = CrpRobot::new(controller.clone(), None);
//! robot.connect("10.0.0.5", 3).unwrap();
//! assert_eq!(controller.calls().connect, 3);
//! ```
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::robot::control_types::{JointAngles, Pose};
use crate::robot::types::{WorkMode, UNAVAILABLE};
use crate::service::{RobotService, ServiceLoader};

/// How often each primitive of the simulated controller was called.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub initialize: u32,
    pub deinitialize: u32,
    pub acquire_service: u32,
    pub connect: u32,
    pub disconnect: u32,
    pub set_work_mode: u32,
    pub servo_power_on: u32,
    pub servo_power_off: u32,
    pub move_j: u32,
    pub move_l: u32,
    pub is_moving: u32,
    pub stop_move: u32,
}

impl CallCounts {
    /// number of commands which could have moved or energized the robot
    pub fn actuating(&self) -> u32 {
        self.servo_power_on + self.move_j + self.move_l
    }
}

#[derive(Debug)]
struct SimulatedState {
    initialized: bool,
    connected: bool,
    address: Option<String>,
    safety_interlock_disabled: bool,
    work_mode: WorkMode,
    servo_on: bool,
    moving_until: Option<Instant>,
    joints: JointAngles,
    pose: Pose,
    user_frame_origin: [f64; 3],
    speed_ratio: i32,

    fail_initialize: bool,
    withhold_service: bool,
    refuse_connects: u32,
    reject_mode_switches: u32,
    unconfirmed_power_ons: u32,
    reject_power_off: bool,
    reject_motions: bool,
    motion_duration: Duration,

    calls: CallCounts,
}

impl Default for SimulatedState {
    fn default() -> Self {
        SimulatedState {
            initialized: false,
            connected: false,
            address: None,
            safety_interlock_disabled: false,
            work_mode: WorkMode::Auto,
            servo_on: false,
            moving_until: None,
            joints: JointAngles::default(),
            pose: Pose::new([400., 0., 500., 180., 0., 0.]),
            user_frame_origin: [0.; 3],
            speed_ratio: 30,
            fail_initialize: false,
            withhold_service: false,
            refuse_connects: 0,
            reject_mode_switches: 0,
            unconfirmed_power_ons: 0,
            reject_power_off: false,
            reject_motions: false,
            motion_duration: Duration::from_millis(50),
            calls: CallCounts::default(),
        }
    }
}

impl SimulatedState {
    fn is_moving(&mut self) -> bool {
        match self.moving_until {
            Some(until) if Instant::now() < until => true,
            _ => {
                self.moving_until = None;
                false
            }
        }
    }

    fn accepts_motion(&self) -> bool {
        self.connected && self.servo_on && self.work_mode == WorkMode::Manual && !self.reject_motions
    }

    fn start_motion(&mut self) {
        self.moving_until = Some(Instant::now() + self.motion_duration);
    }
}

/// A simulated controller. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedController {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedController {
    /// Creates a controller in Auto mode with the servos off which accepts every command.
    pub fn new() -> Self {
        SimulatedController::default()
    }

    fn state(&self) -> MutexGuard<SimulatedState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// the service cannot be initialized
    pub fn fail_initialize(self) -> Self {
        self.state().fail_initialize = true;
        self
    }

    /// the service initializes but provides no robot service handle
    pub fn withhold_service(self) -> Self {
        self.state().withhold_service = true;
        self
    }

    /// the next `count` connect calls are refused
    pub fn refuse_connects(self, count: u32) -> Self {
        self.state().refuse_connects = count;
        self
    }

    /// the next `count` work mode switches are rejected
    pub fn reject_mode_switches(self, count: u32) -> Self {
        self.state().reject_mode_switches = count;
        self
    }

    /// the next `count` servo power on commands are accepted but the servos stay off
    pub fn unconfirmed_power_ons(self, count: u32) -> Self {
        self.state().unconfirmed_power_ons = count;
        self
    }

    /// servo power off commands are rejected
    pub fn reject_power_off(self, reject: bool) -> Self {
        self.state().reject_power_off = reject;
        self
    }

    /// motion commands are rejected
    pub fn reject_motions(self, reject: bool) -> Self {
        self.state().reject_motions = reject;
        self
    }

    /// how long the moving flag stays set after a motion was accepted
    pub fn with_motion_duration(self, duration: Duration) -> Self {
        self.state().motion_duration = duration;
        self
    }

    /// origin of the user frame in world coordinates in \[mm\]
    pub fn with_user_frame_origin(self, origin: [f64; 3]) -> Self {
        self.state().user_frame_origin = origin;
        self
    }

    /// changes the work mode as if it was switched on the teach pendant
    pub fn set_pendant_mode(&self, mode: WorkMode) {
        self.state().work_mode = mode;
    }

    /// drops servo power as if an emergency stop was pressed
    pub fn cut_servo_power(&self) {
        let mut state = self.state();
        state.servo_on = false;
        state.moving_until = None;
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    pub fn is_servo_powered(&self) -> bool {
        self.state().servo_on
    }

    /// address of the last successful connect
    pub fn connected_address(&self) -> Option<String> {
        self.state().address.clone()
    }

    /// true if the last successful connect skipped the hardware safety interlock check
    pub fn safety_interlock_disabled(&self) -> bool {
        self.state().safety_interlock_disabled
    }
}

impl ServiceLoader for SimulatedController {
    type Service = SimulatedController;

    fn initialize(&mut self) -> bool {
        let mut state = self.state();
        state.calls.initialize += 1;
        state.initialized = !state.fail_initialize;
        state.initialized
    }

    fn deinitialize(&mut self) {
        let mut state = self.state();
        state.calls.deinitialize += 1;
        state.initialized = false;
    }

    fn acquire_service(&mut self) -> Option<Self::Service> {
        let mut state = self.state();
        state.calls.acquire_service += 1;
        if state.initialized && !state.withhold_service {
            Some(self.clone())
        } else {
            None
        }
    }
}

impl RobotService for SimulatedController {
    fn connect(&mut self, address: &str, disable_safety_interlock: bool) -> bool {
        let mut state = self.state();
        state.calls.connect += 1;
        if !state.initialized {
            return false;
        }
        if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            return false;
        }
        state.connected = true;
        state.address = Some(address.to_string());
        state.safety_interlock_disabled = disable_safety_interlock;
        true
    }

    fn disconnect(&mut self) {
        let mut state = self.state();
        state.calls.disconnect += 1;
        state.connected = false;
        state.address = None;
    }

    fn set_work_mode(&mut self, code: i32) -> bool {
        let mut state = self.state();
        state.calls.set_work_mode += 1;
        if !state.connected {
            return false;
        }
        if state.reject_mode_switches > 0 {
            state.reject_mode_switches -= 1;
            return false;
        }
        match WorkMode::from_code(code) {
            Some(mode) => {
                state.work_mode = mode;
                true
            }
            None => false,
        }
    }

    fn get_work_mode(&mut self) -> i32 {
        let state = self.state();
        if state.connected {
            state.work_mode.code()
        } else {
            UNAVAILABLE
        }
    }

    fn servo_power_on(&mut self) -> bool {
        let mut state = self.state();
        state.calls.servo_power_on += 1;
        if !state.connected || state.work_mode != WorkMode::Manual {
            return false;
        }
        if state.unconfirmed_power_ons > 0 {
            state.unconfirmed_power_ons -= 1;
        } else {
            state.servo_on = true;
        }
        true
    }

    fn servo_power_off(&mut self) -> bool {
        let mut state = self.state();
        state.calls.servo_power_off += 1;
        if !state.connected || state.reject_power_off {
            return false;
        }
        state.servo_on = false;
        state.moving_until = None;
        true
    }

    fn is_servo_on(&mut self) -> bool {
        let state = self.state();
        state.connected && state.servo_on
    }

    fn move_j(&mut self, target: &JointAngles) -> bool {
        let mut state = self.state();
        state.calls.move_j += 1;
        if !state.accepts_motion() {
            return false;
        }
        state.joints = *target;
        state.start_motion();
        true
    }

    fn move_l(&mut self, target: &Pose) -> bool {
        let mut state = self.state();
        state.calls.move_l += 1;
        if !state.accepts_motion() {
            return false;
        }
        state.pose = *target;
        state.start_motion();
        true
    }

    fn stop_move(&mut self) -> bool {
        let mut state = self.state();
        state.calls.stop_move += 1;
        if !state.connected {
            return false;
        }
        state.moving_until = None;
        true
    }

    fn is_moving(&mut self) -> Option<bool> {
        let mut state = self.state();
        state.calls.is_moving += 1;
        if !state.connected {
            return None;
        }
        Some(state.is_moving())
    }

    fn get_current_joint(&mut self) -> Option<JointAngles> {
        let state = self.state();
        if state.connected {
            Some(state.joints)
        } else {
            None
        }
    }

    fn get_world_posture(&mut self) -> Option<Pose> {
        let state = self.state();
        if state.connected {
            Some(state.pose)
        } else {
            None
        }
    }

    fn get_user_posture(&mut self) -> Option<Pose> {
        let state = self.state();
        if !state.connected {
            return None;
        }
        let mut pose = state.pose;
        pose.x -= state.user_frame_origin[0];
        pose.y -= state.user_frame_origin[1];
        pose.z -= state.user_frame_origin[2];
        Some(pose)
    }

    fn set_speed_ratio(&mut self, ratio: i32) -> bool {
        let mut state = self.state();
        if !state.connected {
            return false;
        }
        state.speed_ratio = ratio;
        true
    }

    fn get_speed_ratio(&mut self) -> i32 {
        let state = self.state();
        if state.connected {
            state.speed_ratio
        } else {
            UNAVAILABLE
        }
    }
}
