//! The hardware capabilities the electrical test is built on
//!
//! The test itself never touches hardware directly. It goes through these
//! traits, which are implemented for the real test stand (see [`crate::jig`]
//! and [`crate::target`]) and for the simulated board in [`crate::sim`].


use std::{
    fmt::Debug,
    thread,
    time::Duration,
};

use protocol::{
    JigPin,
    TargetPin,
    pin::{
        Level,
        Mode,
    },
};


/// The test jig: known-good hardware wired to every line of the board
pub trait JigIo {
    type Error: Debug;

    /// Change the direction of a digital line
    fn set_mode(&mut self, pin: JigPin, mode: Mode) -> Result<(), Self::Error>;

    /// Set the level of a digital line that is configured as an output
    fn write(&mut self, pin: JigPin, level: Level) -> Result<(), Self::Error>;

    /// Read the level of a digital line
    fn read(&mut self, pin: JigPin) -> Result<Level, Self::Error>;

    /// Sample an analog channel, returning the raw ADC value
    fn read_analog(&mut self, pin: JigPin) -> Result<u16, Self::Error>;

    /// Output a PWM signal
    fn set_pwm(&mut self, pin: JigPin, frequency_hz: u32, duty: u8)
        -> Result<(), Self::Error>;

    /// Drive a line to `level`, release it, and read it back
    ///
    /// Nothing may happen on the line between driving and reading. A floating
    /// line only remembers the driven level for a short time, through its
    /// parasitic capacitance, so how long that takes matters. The default
    /// implementation is only suitable, if the primitives are fast (i.e. the
    /// code runs on the jig itself). Implementations that talk to a remote jig
    /// must override it.
    fn probe(&mut self, pin: JigPin, level: Level)
        -> Result<Level, Self::Error>
    {
        self.set_mode(pin, Mode::Output)?;
        self.write(pin, level)?;
        self.set_mode(pin, Mode::Input)?;
        self.read(pin)
    }

    /// Block for the given amount of time
    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration)
    }
}


/// The board under test
pub trait TargetIo {
    type Error: Debug;

    /// Change the direction of one of the board's pins
    fn set_mode(&mut self, pin: TargetPin, mode: Mode)
        -> Result<(), Self::Error>;

    /// Write 8 consecutive output lines at once, starting with `first`
    fn write_port(&mut self, first: TargetPin, bits: u8)
        -> Result<(), Self::Error>;

    /// Enable or disable the board's internal pull-up on USB D+
    fn set_usb_pullup(&mut self, enabled: bool) -> Result<(), Self::Error>;
}
