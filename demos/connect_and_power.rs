// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use clap::Parser;

use crp::simulation::SimulatedController;
use crp::{CrpResult, CrpRobot};

/// An example showing the connect and servo power protocols against a flaky controller.
#[derive(Parser, Debug)]
#[clap(author, version, name = "connect_and_power")]
struct CommandLineArguments {
    /// IP-Address of the robot controller
    #[clap(default_value = crp::DEFAULT_ADDRESS)]
    pub crp_ip: String,
    /// Number of connect and power on attempts
    #[clap(short, long, default_value_t = 3)]
    pub attempts: u32,
    /// Number of connects the simulated controller refuses
    #[clap(long, default_value_t = 2)]
    pub refused_connects: u32,
    /// Number of power ons the simulated controller does not confirm
    #[clap(long, default_value_t = 1)]
    pub unconfirmed_power_ons: u32,
}

fn main() -> CrpResult<()> {
    tracing_subscriber::fmt::init();
    let args = CommandLineArguments::parse();
    let controller = SimulatedController::new()
        .refuse_connects(args.refused_connects)
        .unconfirmed_power_ons(args.unconfirmed_power_ons);
    let mut robot = CrpRobot::new(controller.clone(), None);

    robot.connect(args.crp_ip.as_str(), args.attempts)?;
    println!(
        "Connected to {} in {:?} mode",
        args.crp_ip,
        robot.work_mode()
    );
    robot.servo_power_on(args.attempts)?;
    println!("Servos powered on: {}", robot.is_servo_on());

    robot.servo_power_off()?;
    robot.disconnect();
    println!("{:#?}", controller.calls());
    Ok(())
}
