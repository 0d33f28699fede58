//! Detection of floating and pulled lines
//!
//! A line that isn't connected to anything keeps the level it was last driven
//! to for a short while, thanks to its parasitic capacitance. A line that is
//! pulled up or down by a resistor snaps to that level as soon as it is
//! released. Driving a line alternately low and high and reading it back after
//! each release tells the two apart.


use protocol::{
    JigPin,
    pin::Level,
};

use crate::{
    Context,
    HardwareError,
    Result,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Whether `pin` is high-impedance
    ///
    /// Passes, if every read back level equals the level driven just before.
    pub fn is_high_z(&mut self, pin: JigPin) -> Result<bool> {
        self.probe_trials(pin, |driven| driven)
    }

    /// Whether `pin` is pulled to `state` by a resistor
    ///
    /// Passes, if every read back level equals `state`, no matter what level
    /// was driven.
    pub fn has_pull(&mut self, pin: JigPin, state: Level) -> Result<bool> {
        self.probe_trials(pin, |_| state)
    }

    fn probe_trials<F>(&mut self, pin: JigPin, expected: F) -> Result<bool>
        where F: Fn(Level) -> Level
    {
        for i in 0 .. self.config.probe_trials {
            let driven = Level::from_bit(i);
            let level  = self.jig.probe(pin, driven)
                .map_err(HardwareError::jig)?;

            if level != expected(driven) {
                log::debug!(
                    "Pin {}, trial {}: drove {:?}, read {:?}",
                    pin, i, driven, level,
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}
