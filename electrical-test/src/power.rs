//! Control of the jig's variable power supply


use protocol::pin::Mode;

use crate::{
    Context,
    HardwareError,
    Result,
    config::Supply,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


impl Supply {
    /// The PWM duty cycle that produces `volts`
    ///
    /// Voltages outside of what the supply can produce are clamped.
    pub fn duty_for(&self, volts: f32) -> u8 {
        let duty = volts * (255.0 / self.full_scale);

        // Casting truncates, same as the supply's own rounding. NaN ends up
        // as `0`.
        duty.max(0.0).min(255.0) as u8
    }
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Set the voltage of the supply that powers the board
    ///
    /// Usable range is from 0V to the supply's full scale voltage. Blocks
    /// until the board's capacitors had time to charge.
    pub fn set_voltage(&mut self, volts: f32) -> Result {
        let supply = self.config.supply;
        let pin    = self.config.pins.power_pwm;
        let duty   = supply.duty_for(volts);

        log::debug!("Supply to {:.2}V (duty {}/255)", volts, duty);

        self.jig.set_mode(pin, Mode::Output)
            .map_err(HardwareError::jig)?;
        self.jig.set_pwm(pin, supply.pwm_frequency_hz, duty)
            .map_err(HardwareError::jig)?;

        self.jig.delay(supply.settle_time());

        Ok(())
    }

    pub fn power_off(&mut self) -> Result {
        self.set_voltage(0.0)
    }

    /// Power the board and verify that the power arrives
    ///
    /// Returns `false`, if the board's USB supply is out of range.
    pub fn power_on(&mut self) -> Result<bool> {
        self.info(format_args!("Enabling power supply"));

        let volts = self.config.supply.nominal;
        self.set_voltage(volts)?;

        let pin       = self.config.pins.target_vusb;
        let threshold = self.nominal(volts);
        self.verify(pin, threshold)
    }
}
