use std::fmt;

use log::Level;

use crate::{
    config::Config,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


/// Everything a test run needs: hardware, configuration, and the log sink
///
/// The checks are implemented as methods on this type, spread over the
/// modules of this crate. A run has exclusive control over the hardware for
/// as long as the context exists.
pub struct Context<J, T, R> {
    pub jig:    J,
    pub target: T,
    pub config: Config,
    pub report: R,
}

impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    pub fn new(jig: J, target: T, config: Config, report: R) -> Self {
        Self {
            jig,
            target,
            config,
            report,
        }
    }

    pub(crate) fn info(&mut self, message: fmt::Arguments) {
        self.report.log(Level::Info, message)
    }

    pub(crate) fn error(&mut self, message: fmt::Arguments) {
        self.report.log(Level::Error, message)
    }
}
