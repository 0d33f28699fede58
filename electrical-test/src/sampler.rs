//! Conversion of analog readings into volts


use protocol::JigPin;

use crate::{
    Context,
    HardwareError,
    Result,
    config::Calibration,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


impl Calibration {
    /// Volts per ADC count, as seen at the divider's input
    pub fn scale(&self) -> f32 {
        let divider = (self.divider_a + self.divider_b) / self.divider_a;
        (self.reference / self.adc_max as f32) * divider
    }

    /// Convert a raw ADC value into volts
    pub fn to_volts(&self, raw: u16) -> f32 {
        raw as f32 * self.scale()
    }
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Sample an analog channel of the jig and convert the result into volts
    pub fn sample_volts(&mut self, pin: JigPin) -> Result<f32> {
        let raw = self.jig.read_analog(pin)
            .map_err(HardwareError::jig)?;
        Ok(self.config.calibration.to_volts(raw))
    }
}
