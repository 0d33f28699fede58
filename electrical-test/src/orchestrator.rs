//! The complete electrical test


use protocol::pin::Mode;

use crate::{
    Context,
    Error,
    HardwareError,
    Node,
    Result,
    StageError,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


/// The stages of a test run, in the order they run in
///
/// There is no failed stage. Failing out of `stage` is `run` returning
/// `StageError { stage, .. }`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// One-time setup of the target
    Init,

    /// Test of the USB connector
    UsbValidation,

    /// Sweep of the output port
    PatternSweep,

    /// All stages have passed
    Done,
}

impl Stage {
    /// The stage that follows this one, if this one passes
    pub fn next(self) -> Self {
        match self {
            Stage::Init          => Stage::UsbValidation,
            Stage::UsbValidation => Stage::PatternSweep,
            Stage::PatternSweep  => Stage::Done,
            Stage::Done          => Stage::Done,
        }
    }
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Target setup that's needed only once per test run
    pub fn init_target(&mut self) -> Result {
        let first = self.config.pins.target_outputs;

        for n in 0 .. 8 {
            let pin = first.offset(n)
                .ok_or_else(|| HardwareError {
                    node:    Node::Target,
                    message: format!("No output line {} after pin {}", n, first),
                })?;
            self.target.set_mode(pin, Mode::Output)
                .map_err(HardwareError::target)?;
        }

        self.target.set_usb_pullup(false)
            .map_err(HardwareError::target)?;

        Ok(())
    }

    /// Run all stages, stopping at the first one that fails
    ///
    /// Nothing is retried. If the run should be repeated, that is up to the
    /// caller.
    pub fn run(&mut self) -> std::result::Result<(), StageError> {
        self.info(format_args!("Beginning electrical test"));

        let mut stage = Stage::Init;
        while stage != Stage::Done {
            self.run_stage(stage)
                .map_err(|error| StageError { stage, error })?;
            stage = stage.next();
        }

        self.info(format_args!("Successfully completed electrical test"));
        Ok(())
    }

    /// Run all stages and reduce the outcome to pass/fail
    ///
    /// Failed measurements and USB faults have already been logged by the
    /// time they get here. Hardware errors haven't, so they are logged here.
    pub fn run_all(&mut self) -> bool {
        match self.run() {
            Ok(()) => {
                true
            }
            Err(StageError { stage, error: Error::Hardware(err) }) => {
                self.error(format_args!("{:?}: {}", stage, err));
                false
            }
            Err(StageError { stage, error }) => {
                log::debug!("Failed in stage {:?}: {:?}", stage, error);
                false
            }
        }
    }

    /// Power the board, run the test, and power the board off again
    ///
    /// With `keep_power`, the board stays powered after the test, whether it
    /// passed or not.
    pub fn run_powered(&mut self, keep_power: bool) -> bool {
        let passed = match self.power_on() {
            Ok(true) => {
                self.run_all()
            }
            Ok(false) => {
                false
            }
            Err(err) => {
                self.error(format_args!("Powering board: {}", err));
                false
            }
        };

        if !keep_power {
            if let Err(err) = self.power_off() {
                self.error(format_args!("Powering off board: {}", err));
                return false;
            }
        }

        passed
    }

    fn run_stage(&mut self, stage: Stage) -> Result {
        match stage {
            Stage::Init          => self.init_target(),
            Stage::UsbValidation => self.test_usb_connections(),
            Stage::PatternSweep  => self.test_all_patterns(),
            Stage::Done          => Ok(()),
        }
    }
}
