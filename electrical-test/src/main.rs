//! Runs the electrical test on the board currently in the test stand


use std::{
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::{
    error,
    info,
};

use electrical_test::{
    Config,
    LogReport,
    TestStand,
    sim,
};


/// Electrical test for boards on the test stand
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Electrical test configuration (calibration, tolerances, pin map)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Test stand configuration (serial devices)
    #[arg(short, long, default_value = "test-stand.toml")]
    stand: PathBuf,

    /// run against a simulated, healthy board instead of the test stand
    #[arg(long)]
    simulate: bool,

    /// leave the board powered after the test
    #[arg(long)]
    keep_power: bool,

    /// enable debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    }
    else {
        builder.filter(None, log::LevelFilter::Info);
    }
    builder.init();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Can't read electrical test configuration: {:?}", err);
            return ExitCode::from(2);
        }
    };

    let passed = if args.simulate {
        info!("Running against simulated board");

        let board = sim::Board::new(&config);
        board.context(config, LogReport).run_powered(args.keep_power)
    }
    else {
        let stand_config = match host_lib::Config::read_from(&args.stand) {
            Ok(stand_config) => stand_config,
            Err(err) => {
                error!("Can't read test stand configuration: {:?}", err);
                return ExitCode::from(2);
            }
        };
        let test_stand = match TestStand::with_config(stand_config) {
            Ok(test_stand) => test_stand,
            Err(err) => {
                error!("Can't initialize test stand: {:?}", err);
                return ExitCode::from(2);
            }
        };

        let (_guard, mut context) = test_stand.into_context(config, LogReport);
        context.run_powered(args.keep_power)
    };

    if passed {
        info!("PASS");
        ExitCode::SUCCESS
    }
    else {
        error!("FAIL");
        ExitCode::FAILURE
    }
}
