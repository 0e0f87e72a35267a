// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use std::collections::HashMap;

use clap::Parser;

use crp::simulation::SimulatedController;
use crp::{millis, CrpResult, CrpRobot, JOINT_LABELS};

/// An example showing how to generate a joint motion.
///
/// WARNING: Before executing this example, make sure there is enough space around the robot.
#[derive(Parser, Debug)]
#[clap(author, version, name = "generate_joint_motion")]
struct CommandLineArguments {
    /// IP-Address of the robot controller
    #[clap(default_value = crp::DEFAULT_ADDRESS)]
    pub crp_ip: String,
    /// Target joint angles j1 to j6 in degrees
    #[clap(short, long, number_of_values = 6, allow_hyphen_values = true)]
    pub joints: Vec<f64>,
    /// How long to wait for the motion in milliseconds
    #[clap(short, long, default_value_t = 6000)]
    pub wait: i64,
    /// Speed ratio in percent
    #[clap(short, long, default_value_t = 30)]
    pub speed: i32,
}

fn main() -> CrpResult<()> {
    tracing_subscriber::fmt::init();
    let args = CommandLineArguments::parse();
    let controller = SimulatedController::new().with_motion_duration(millis(1500));
    let mut robot = CrpRobot::new(controller, None);
    println!("WARNING: This example will move the robot! Please make sure to have the emergency stop at hand!");

    robot.connect(args.crp_ip.as_str(), None)?;
    robot.servo_power_on(None)?;
    robot.set_speed_ratio(args.speed)?;

    let joints = match args.joints.len() {
        6 => args.joints.clone(),
        _ => vec![0., 0., 90., 0., 90., 0.],
    };
    let target: HashMap<String, f64> = JOINT_LABELS
        .iter()
        .zip(joints.iter())
        .map(|(label, angle)| (label.to_string(), *angle))
        .collect();
    let result = robot.move_joints(&target, millis(args.wait));
    match &result {
        Ok(()) => println!("Reached {:?}", robot.read_joints()),
        Err(e) => eprintln!("{}", e),
    }
    robot.disconnect();
    result
}
