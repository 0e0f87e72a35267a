// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use clap::Parser;

use crp::simulation::SimulatedController;
use crp::{millis, CrpResult, CrpRobot, ErrorKind, Pose};

/// An example showing how to move along a square in the horizontal plane with linear motions.
///
/// WARNING: Before executing this example, make sure there is enough space around the robot.
#[derive(Parser, Debug)]
#[clap(author, version, name = "generate_linear_motion")]
struct CommandLineArguments {
    /// IP-Address of the robot controller
    #[clap(default_value = crp::DEFAULT_ADDRESS)]
    pub crp_ip: String,
    /// Edge length of the square in mm
    #[clap(short, long, default_value_t = 100.)]
    pub edge: f64,
    /// How long to wait for each motion in milliseconds
    #[clap(short, long, default_value_t = 6000)]
    pub wait: i64,
}

fn main() -> CrpResult<()> {
    tracing_subscriber::fmt::init();
    let args = CommandLineArguments::parse();
    let controller = SimulatedController::new().with_motion_duration(millis(800));
    let mut robot = CrpRobot::new(controller, None);
    println!("WARNING: This example will move the robot! Please make sure to have the emergency stop at hand!");

    robot.connect(args.crp_ip.as_str(), None)?;
    robot.servo_power_on(None)?;

    let start = robot.read_end_pose().to_array();
    let corners = [(args.edge, 0.), (args.edge, args.edge), (0., args.edge), (0., 0.)];
    for (dx, dy) in corners.iter() {
        let mut target = start;
        target[0] += dx;
        target[1] += dy;
        if let Err(e) = robot.move_linear(&target, millis(args.wait)) {
            if e.kind() == ErrorKind::Timeout {
                if let Err(stop_error) = robot.stop() {
                    eprintln!("Could not stop the motion: {}", stop_error);
                }
            }
            robot.disconnect();
            return Err(e);
        }
        println!("Reached {:?}", Pose::from(target));
    }
    println!("Finished motion, shutting down example");
    robot.disconnect();
    Ok(())
}
