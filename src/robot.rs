// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the crp::CrpRobot type.

pub mod config;
mod connection;
pub mod control_types;
pub mod crp_robot;
mod motion;
mod power;
pub mod retry;
mod session;
pub mod types;

#[cfg(test)]
mod tests {
    use mockall::predicate::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::exception::{CrpException, ErrorKind};
    use crate::robot::types::{CoordinateFrame, PowerState, WorkMode, UNAVAILABLE};
    use crate::service::{MockRobotService, MockServiceLoader};
    use crate::{CrpRobot, JointAngles, Pose, RobotConfig};

    const MANUAL: i32 = 0;

    fn fast_config() -> RobotConfig {
        RobotConfig {
            connect_backoff: Duration::from_millis(1),
            power_on_settle: Duration::from_millis(1),
            power_on_retry_interval: Duration::from_millis(1),
            motion_poll_interval: Duration::from_millis(5),
            ..RobotConfig::default()
        }
    }

    fn loader_for(service: MockRobotService) -> MockServiceLoader {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().return_const(true);
        loader.expect_deinitialize().return_const(());
        let mut service = Some(service);
        loader
            .expect_acquire_service()
            .times(1)
            .returning(move || service.take());
        loader
    }

    /// a service which accepts connect and the switch to Manual exactly once
    fn connectable_service() -> MockRobotService {
        let mut service = MockRobotService::new();
        service.expect_connect().times(1).return_const(true);
        service
            .expect_set_work_mode()
            .with(eq(MANUAL))
            .times(1)
            .return_const(true);
        service
    }

    fn connected_robot(service: MockRobotService) -> CrpRobot<MockServiceLoader> {
        let mut robot = CrpRobot::new(loader_for(service), fast_config());
        robot.connect("10.0.0.5", 1).unwrap();
        robot
    }

    /// a Manual mode service which confirms the first power on
    fn powered_service() -> MockRobotService {
        let mut service = connectable_service();
        service.expect_get_work_mode().return_const(MANUAL);
        service.expect_servo_power_on().times(1).return_const(true);
        service.expect_is_servo_on().return_const(true);
        service
    }

    fn powered_robot(service: MockRobotService) -> CrpRobot<MockServiceLoader> {
        let mut robot = connected_robot(service);
        robot.servo_power_on(1).unwrap();
        robot
    }

    fn labeled(values: [f64; 6]) -> HashMap<String, f64> {
        JointAngles::new(values)
            .labeled()
            .into_iter()
            .collect::<HashMap<String, f64>>()
    }

    #[test]
    fn connect_retries_until_the_third_attempt() {
        let mut service = MockRobotService::new();
        let mut attempts = 0;
        service
            .expect_connect()
            .withf(|address, disable_interlock| address == "10.0.0.5" && *disable_interlock)
            .times(3)
            .returning(move |_, _| {
                attempts += 1;
                attempts == 3
            });
        service
            .expect_set_work_mode()
            .with(eq(MANUAL))
            .times(1)
            .return_const(true);
        service.expect_get_work_mode().return_const(MANUAL);
        let mut robot = CrpRobot::new(loader_for(service), fast_config());

        robot.connect("10.0.0.5", 3).unwrap();
        assert!(robot.is_connected());
        assert!(robot.is_manual_mode());
        assert!(robot.manual_mode_forced());
        assert!(!robot.is_servo_on());
    }

    #[test]
    fn connect_gives_up_after_max_attempts() {
        let mut service = MockRobotService::new();
        service.expect_connect().times(4).return_const(false);
        service.expect_set_work_mode().never();
        let mut service = Some(service);
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().times(1).return_const(true);
        loader.expect_deinitialize().times(1).return_const(());
        loader
            .expect_acquire_service()
            .times(1)
            .returning(move || service.take());
        let mut robot = CrpRobot::new(loader, fast_config());

        let error = robot.connect("10.0.0.5", 4).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HardwareRejection);
        assert!(!robot.is_connected());
        assert_eq!(robot.get_work_mode(), UNAVAILABLE);
    }

    #[test]
    fn failed_mode_switch_reconnects() {
        let mut service = MockRobotService::new();
        service.expect_connect().times(2).return_const(true);
        let mut switches = 0;
        service
            .expect_set_work_mode()
            .with(eq(MANUAL))
            .times(2)
            .returning(move |_| {
                switches += 1;
                switches == 2
            });
        service.expect_disconnect().times(1).return_const(());
        let mut robot = CrpRobot::new(loader_for(service), fast_config());

        robot.connect("10.0.0.5", 3).unwrap();
        assert!(robot.is_connected());
    }

    #[test]
    fn mode_switch_never_succeeding_leaves_robot_disconnected() {
        let mut service = MockRobotService::new();
        service.expect_connect().times(2).return_const(true);
        service.expect_set_work_mode().times(2).return_const(false);
        service.expect_disconnect().times(2).return_const(());
        let mut robot = CrpRobot::new(loader_for(service), fast_config());

        assert!(robot.connect("10.0.0.5", 2).is_err());
        assert!(!robot.is_connected());
        assert!(!robot.manual_mode_forced());
    }

    #[test]
    fn connect_without_service_is_resource_unavailable() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().times(1).return_const(false);
        loader.expect_acquire_service().never();
        loader.expect_deinitialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot.connect(None, None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ResourceUnavailable);

        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().times(1).return_const(true);
        loader.expect_acquire_service().times(1).returning(|| None);
        loader.expect_deinitialize().times(1).return_const(());
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot.connect(None, None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ResourceUnavailable);
        assert!(!robot.is_connected());
    }

    #[test]
    fn connect_uses_configured_defaults() {
        let mut service = MockRobotService::new();
        service
            .expect_connect()
            .withf(|address, _| address == "192.168.0.100")
            .times(3)
            .return_const(false);
        let mut robot = CrpRobot::new(loader_for(service), fast_config());
        assert!(robot.connect(None, None).is_err());
    }

    #[test]
    fn zero_connect_attempts_is_a_precondition_failure() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot.connect("10.0.0.5", 0).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
    }

    #[test]
    fn zero_attempts_keep_a_live_connection() {
        let mut service = powered_service();
        service.expect_servo_power_off().never();
        service.expect_disconnect().never();
        let mut robot = powered_robot(service);

        let error = robot.connect("10.0.0.6", 0).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        assert!(robot.is_connected());
        assert!(robot.is_servo_on());
    }

    #[test]
    fn reconnect_disconnects_first() {
        let mut first = connectable_service();
        first.expect_servo_power_off().times(1).return_const(true);
        first.expect_disconnect().times(1).return_const(());
        let second = connectable_service();

        let mut services = vec![second, first];
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().times(2).return_const(true);
        loader.expect_deinitialize().times(1).return_const(());
        loader
            .expect_acquire_service()
            .times(2)
            .returning(move || services.pop());
        let mut robot = CrpRobot::new(loader, fast_config());

        robot.connect("10.0.0.5", 1).unwrap();
        robot.connect("10.0.0.6", 1).unwrap();
        assert!(robot.is_connected());
    }

    #[test]
    fn disconnect_while_disconnected_is_a_no_op() {
        let mut loader = MockServiceLoader::new();
        loader.expect_deinitialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        robot.disconnect();
        robot.disconnect();
        assert!(!robot.is_connected());
        assert!(!robot.is_servo_on());
        assert_eq!(robot.power_state(), PowerState::Off);
    }

    #[test]
    fn disconnect_ignores_hardware_failures() {
        let mut service = powered_service();
        service.expect_servo_power_off().times(1).return_const(false);
        service.expect_disconnect().times(1).return_const(());
        let mut robot = powered_robot(service);
        assert!(robot.is_servo_on());

        robot.disconnect();
        assert!(!robot.is_connected());
        assert!(!robot.is_servo_on());
        assert_eq!(robot.get_work_mode(), UNAVAILABLE);
    }

    #[test]
    fn power_on_requires_connection() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot.servo_power_on(3).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        assert!(!robot.is_servo_on());
    }

    #[test]
    fn power_on_requires_manual_mode() {
        let mut service = connectable_service();
        service
            .expect_get_work_mode()
            .return_const(WorkMode::Remote.code());
        service.expect_servo_power_on().never();
        let mut robot = connected_robot(service);

        let error = robot.servo_power_on(3).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        assert!(!robot.is_servo_on());
    }

    #[test]
    fn power_on_stops_after_confirmation() {
        let mut service = connectable_service();
        service.expect_get_work_mode().return_const(MANUAL);
        service.expect_servo_power_on().times(2).return_const(true);
        let mut readbacks = 0;
        service.expect_is_servo_on().times(2).returning(move || {
            readbacks += 1;
            readbacks == 2
        });
        let mut robot = connected_robot(service);

        robot.servo_power_on(5).unwrap();
        assert!(robot.is_servo_on());
    }

    #[test]
    fn power_on_without_confirmation_keeps_power_off() {
        let mut service = connectable_service();
        service.expect_get_work_mode().return_const(MANUAL);
        let commands = Arc::new(AtomicU32::new(0));
        let counter = commands.clone();
        service.expect_servo_power_on().times(3).returning(move || {
            // the second command is rejected outright, the others are never confirmed
            counter.fetch_add(1, Ordering::SeqCst) != 1
        });
        service.expect_is_servo_on().times(2).return_const(false);
        let mut robot = connected_robot(service);

        let error = robot.servo_power_on(3).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HardwareRejection);
        assert_eq!(commands.load(Ordering::SeqCst), 3);
        assert_eq!(robot.power_state(), PowerState::Off);
    }

    #[test]
    fn power_on_when_already_on_sends_nothing() {
        let mut robot = powered_robot(powered_service());
        robot.servo_power_on(3).unwrap();
        assert!(robot.is_servo_on());
    }

    #[test]
    fn second_power_off_fails_without_hardware() {
        let mut service = powered_service();
        service.expect_servo_power_off().times(1).return_const(true);
        let mut robot = powered_robot(service);

        robot.servo_power_off().unwrap();
        assert!(!robot.is_servo_on());
        assert!(robot.is_connected());
        let error = robot.servo_power_off().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
    }

    #[test]
    fn rejected_power_off_keeps_power_on() {
        let mut service = powered_service();
        service.expect_servo_power_off().times(1).return_const(false);
        let mut robot = powered_robot(service);

        let error = robot.servo_power_off().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HardwareRejection);
        assert!(robot.is_servo_on());
    }

    #[test]
    fn work_mode_is_read_through() {
        let mut service = connectable_service();
        let mut reads = 0;
        service.expect_get_work_mode().times(3).returning(move || {
            reads += 1;
            match reads {
                1 => MANUAL,
                2 => WorkMode::Auto.code(),
                _ => -3,
            }
        });
        service
            .expect_set_work_mode()
            .with(eq(WorkMode::Remote.code()))
            .times(1)
            .return_const(false);
        let mut robot = connected_robot(service);

        assert_eq!(robot.work_mode(), Some(WorkMode::Manual));
        assert!(!robot.is_manual_mode());
        assert_eq!(robot.get_work_mode(), UNAVAILABLE);
        let error = robot.switch_work_mode(WorkMode::Remote).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HardwareRejection);
        assert!(robot.is_connected());
    }

    #[test]
    fn switch_work_mode_requires_connection() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot.switch_work_mode(WorkMode::Manual).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        assert_eq!(robot.get_work_mode(), UNAVAILABLE);
        assert!(!robot.is_manual_mode());
    }

    #[test]
    fn motion_requires_power() {
        let mut service = connectable_service();
        service.expect_get_work_mode().never();
        service.expect_move_j().never();
        service.expect_move_l().never();
        let mut robot = connected_robot(service);

        let error = robot
            .move_joints(&labeled([0.; 6]), Duration::from_millis(100))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        let error = robot
            .move_linear(&[100., 200., 300., 0., 0., 90.], None)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
    }

    #[test]
    fn motion_requires_connection() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        let error = robot
            .move_joints_to(&JointAngles::default(), None)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        let error = robot.move_linear_to(&Pose::default(), None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
    }

    #[test]
    fn motion_requires_manual_mode() {
        let mut service = connectable_service();
        let mut reads = 0;
        service.expect_get_work_mode().returning(move || {
            reads += 1;
            if reads == 1 {
                MANUAL
            } else {
                WorkMode::Auto.code()
            }
        });
        service.expect_servo_power_on().times(1).return_const(true);
        service.expect_is_servo_on().return_const(true);
        service.expect_move_j().never();
        let mut robot = powered_robot(service);

        let error = robot
            .move_joints_to(&JointAngles::default(), None)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
    }

    #[test]
    fn move_joints_with_missing_label_is_not_dispatched() {
        let mut service = powered_service();
        service.expect_move_j().never();
        let mut robot = powered_robot(service);

        let mut target = labeled([10., 20., 30., 40., 50., 60.]);
        target.remove("j6");
        match robot.move_joints(&target, None) {
            Err(CrpException::InvalidMotionTarget { .. }) => {}
            other => panic!("expected an invalid motion target but got {:?}", other),
        }
    }

    #[test]
    fn move_linear_with_wrong_arity_is_not_dispatched() {
        let mut service = powered_service();
        service.expect_move_l().never();
        let mut robot = powered_robot(service);

        for target in [&[1., 2., 3., 4., 5.][..], &[1., 2., 3., 4., 5., 6., 7.][..]].iter() {
            match robot.move_linear(target, None) {
                Err(CrpException::InvalidMotionTarget { .. }) => {}
                other => panic!("expected an invalid motion target but got {:?}", other),
            }
        }
    }

    #[test]
    fn move_joints_waits_for_completion() {
        let mut service = powered_service();
        service
            .expect_move_j()
            .withf(|target| target.j == [10., 20., 30., 40., 50., 60.])
            .times(1)
            .return_const(true);
        let mut polls = 0;
        service.expect_is_moving().returning(move || {
            polls += 1;
            match polls {
                1 | 2 => Some(true),
                3 => None,
                _ => Some(false),
            }
        });
        let mut robot = powered_robot(service);

        robot
            .move_joints(&labeled([10., 20., 30., 40., 50., 60.]), Duration::from_secs(2))
            .unwrap();
    }

    #[test]
    fn rejected_dispatch_is_not_a_timeout() {
        let mut service = powered_service();
        service.expect_move_l().times(1).return_const(false);
        service.expect_is_moving().never();
        let mut robot = powered_robot(service);

        let error = robot
            .move_linear(&[100., 200., 300., 0., 0., 90.], None)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HardwareRejection);
    }

    #[test]
    fn move_linear_times_out_while_still_moving() {
        let mut service = powered_service();
        service
            .expect_move_l()
            .withf(|pose| pose.to_array() == [100., 200., 300., 0., 0., 90.])
            .times(1)
            .return_const(true);
        service.expect_is_moving().returning(|| Some(true));
        let mut robot = powered_robot(service);

        let timeout = Duration::from_millis(120);
        let start = Instant::now();
        let result = robot.move_linear(&[100., 200., 300., 0., 0., 90.], timeout);
        let elapsed = start.elapsed();
        assert_eq!(result, Err(CrpException::Timeout { timeout }));
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(100));
        assert!(robot.is_servo_on());
    }

    #[test]
    fn stop_keeps_servos_powered() {
        let mut service = powered_service();
        service.expect_stop_move().times(1).return_const(true);
        let mut robot = powered_robot(service);

        robot.stop().unwrap();
        assert!(robot.is_servo_on());
        assert!(robot.is_manual_mode());
    }

    #[test]
    fn stop_requires_connection() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        assert_eq!(
            robot.stop().unwrap_err().kind(),
            ErrorKind::PreconditionFailure
        );
    }

    #[test]
    fn read_backs() {
        let mut service = connectable_service();
        let joints = JointAngles::new([1., 2., 3., 4., 5., 6.]);
        let world = Pose::new([400., 0., 500., 180., 0., 0.]);
        let user = Pose::new([100., 0., 200., 180., 0., 0.]);
        service.expect_get_current_joint().return_const(Some(joints));
        service.expect_get_world_posture().times(1).return_const(Some(world));
        service.expect_get_user_posture().times(1).return_const(Some(user));
        let mut robot = connected_robot(service);

        assert_eq!(robot.read_joints(), Some(joints));
        assert_eq!(robot.read_end_pose(), world);
        assert_eq!(robot.read_end_pose_in(CoordinateFrame::User), user);
    }

    #[test]
    fn failed_read_backs_are_empty() {
        let mut service = connectable_service();
        service.expect_get_current_joint().return_const(None);
        service.expect_get_world_posture().return_const(None);
        let mut robot = connected_robot(service);
        assert_eq!(robot.read_joints(), None);
        assert_eq!(robot.read_end_pose(), Pose::default());

        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        assert_eq!(robot.read_joints(), None);
        assert_eq!(robot.read_end_pose().to_array(), [0.; 6]);
    }

    #[test]
    fn speed_ratio() {
        let mut service = connectable_service();
        service
            .expect_set_speed_ratio()
            .with(eq(50))
            .times(1)
            .return_const(true);
        service.expect_get_speed_ratio().return_const(50);
        let mut robot = connected_robot(service);

        robot.set_speed_ratio(50).unwrap();
        assert_eq!(robot.get_speed_ratio(), 50);
        let error = robot.set_speed_ratio(101).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PreconditionFailure);
        assert!(robot.set_speed_ratio(-1).is_err());
    }

    #[test]
    fn speed_ratio_unavailable_while_disconnected() {
        let mut loader = MockServiceLoader::new();
        loader.expect_initialize().never();
        let mut robot = CrpRobot::new(loader, fast_config());
        assert_eq!(robot.get_speed_ratio(), UNAVAILABLE);
        assert!(robot.set_speed_ratio(50).is_err());
    }
}
