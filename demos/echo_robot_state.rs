// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use std::thread::sleep;

use clap::Parser;

use crp::simulation::SimulatedController;
use crp::{millis, CoordinateFrame, CrpResult, CrpRobot};

/// An example showing how to continuously read the robot state.
#[derive(Parser, Debug)]
#[clap(author, version, name = "echo_robot_state")]
struct CommandLineArguments {
    /// IP-Address of the robot controller
    #[clap(default_value = crp::DEFAULT_ADDRESS)]
    pub crp_ip: String,
    /// Number of samples to print
    #[clap(short, long, default_value_t = 10)]
    pub count: u32,
    /// Time between two samples in milliseconds
    #[clap(short, long, default_value_t = 100)]
    pub period: i64,
}

fn main() -> CrpResult<()> {
    tracing_subscriber::fmt::init();
    let args = CommandLineArguments::parse();
    let mut robot = CrpRobot::new(SimulatedController::new(), None);
    robot.connect(args.crp_ip.as_str(), None)?;
    for _ in 0..args.count {
        // Printing to standard output adds a delay. This is acceptable for a read loop such as this.
        println!(
            "mode: {} servo: {} speed: {}% joints: {:?} world: {:?} user: {:?}",
            robot.get_work_mode(),
            robot.is_servo_on(),
            robot.get_speed_ratio(),
            robot.read_joints().map(|joints| joints.labeled()),
            robot.read_end_pose(),
            robot.read_end_pose_in(CoordinateFrame::User),
        );
        sleep(millis(args.period));
    }
    robot.disconnect();
    Ok(())
}
