//! Tolerance checks on analog measurements


use std::fmt;

use protocol::JigPin;

use crate::{
    Context,
    Error,
    Result,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


/// A nominal voltage and how far a measurement may deviate from it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    /// In volts
    pub nominal: f32,

    /// In volts
    pub tolerance: f32,
}

impl Threshold {
    pub fn new(nominal: f32, tolerance: f32) -> Self {
        Self {
            nominal,
            tolerance,
        }
    }

    pub fn lower(&self) -> f32 {
        self.nominal - self.tolerance
    }

    pub fn upper(&self) -> f32 {
        self.nominal + self.tolerance
    }

    /// Both bounds are inclusive
    pub fn contains(&self, volts: f32) -> bool {
        self.lower() <= volts && volts <= self.upper()
    }
}


/// The result of measuring a pin against a threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub pin:       JigPin,
    pub volts:     f32,
    pub threshold: Threshold,
}

impl Measurement {
    pub fn passed(&self) -> bool {
        self.threshold.contains(self.volts)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
            "Analog value {} outside reference range! \
            value = {:.2}v, ref = {:.2}v +/- {:.2}v",
            self.pin,
            self.volts,
            self.threshold.nominal,
            self.threshold.tolerance,
        )
    }
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// A threshold around `nominal`, using the configured tolerance
    pub fn nominal(&self, nominal: f32) -> Threshold {
        Threshold::new(nominal, self.config.tolerance)
    }

    /// Sample `pin` and compare it to `threshold`, without logging anything
    pub fn measure(&mut self, pin: JigPin, threshold: Threshold)
        -> Result<Measurement>
    {
        let volts = self.sample_volts(pin)?;

        Ok(
            Measurement {
                pin,
                volts,
                threshold,
            }
        )
    }

    /// Check whether `pin` is within `threshold`
    ///
    /// Logs a diagnostic, if it isn't.
    pub fn verify(&mut self, pin: JigPin, threshold: Threshold)
        -> Result<bool>
    {
        let measurement = self.measure(pin, threshold)?;

        if !measurement.passed() {
            self.error(format_args!("{}", measurement));
            return Ok(false);
        }

        Ok(true)
    }

    /// Like `verify`, but treats a measurement out of range as an error
    pub fn require(&mut self, pin: JigPin, threshold: Threshold) -> Result {
        let measurement = self.measure(pin, threshold)?;

        if !measurement.passed() {
            self.error(format_args!("{}", measurement));
            return Err(Error::OutOfTolerance(measurement));
        }

        Ok(())
    }
}
