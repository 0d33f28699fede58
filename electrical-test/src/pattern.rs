//! Sweep of the board's 8-bit output port


use protocol::JigPin;

use crate::{
    Context,
    HardwareError,
    Result,
    config::Config,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
    threshold::Threshold,
};


/// The patterns the output port is driven through, in order
///
/// All off, all on, each bit on its own, each bit missing from all on, and
/// finally all on again. The last pattern leaves every output driven, so the
/// board is in a defined state after the sweep, whatever happens next.
pub const SWEEP: [u8; 19] = sweep();

const fn sweep() -> [u8; 19] {
    let mut patterns = [0xff; 19];
    patterns[0] = 0x00;
    patterns[1] = 0xff;

    let mut n = 0;
    while n < 8 {
        patterns[2 + n]  = 1 << n;
        patterns[10 + n] = 0xff ^ (1 << n);
        n += 1;
    }

    patterns
}


/// The measurements that are taken after writing `bits` to the port
///
/// Both supply rails come first, then the output lines from bit 0 to bit 7.
/// A rail excursion makes every line measurement meaningless, which is why the
/// rails are checked again for each pattern.
pub fn pattern_checks(config: &Config, bits: u8) -> Vec<(JigPin, Threshold)> {
    let pins      = &config.pins;
    let rails     = &config.rails;
    let tolerance = config.tolerance;

    let mut checks = vec![
        (pins.target_33v,  Threshold::new(rails.primary, tolerance)),
        (pins.target_vusb, Threshold::new(rails.usb, tolerance)),
    ];

    for (n, &pin) in pins.sense.iter().enumerate() {
        let nominal = if bits >> n & 1 == 1 {
            rails.line_high
        }
        else {
            rails.line_low
        };

        checks.push((pin, Threshold::new(nominal, tolerance)));
    }

    checks
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Set the output port to `bits` and check all analog values
    ///
    /// Stops at the first measurement that is out of range. The port is left
    /// as it is in that case.
    pub fn test_pattern(&mut self, bits: u8) -> Result {
        log::debug!("Output pattern {:#04x}", bits);

        // Write the port all at once
        self.target.write_port(self.config.pins.target_outputs, bits)
            .map_err(HardwareError::target)?;

        for (pin, threshold) in pattern_checks(&self.config, bits) {
            self.require(pin, threshold)?;
        }

        Ok(())
    }

    /// Run every pattern of the sweep, stopping at the first failure
    pub fn test_all_patterns(&mut self) -> Result {
        self.info(format_args!("Testing data output patterns"));

        for &bits in SWEEP.iter() {
            self.test_pattern(bits)?;
        }

        Ok(())
    }
}
