//! Electrical test configuration
//!
//! Every calibration constant and every pin assignment the test depends on
//! lives here, with the defaults of the reference jig. All fields can be
//! overridden from `electrical-test.toml`; fields that are missing from the
//! file keep their default value.


use std::{
    fs::File,
    io::{
        self,
        prelude::*,
    },
    path::Path,
    time::Duration,
};

use serde::Deserialize;

use protocol::{
    JigPin,
    TargetPin,
};


/// The file that `Config::load` falls back to, relative to the working
/// directory
pub const CONFIG_FILE: &str = "electrical-test.toml";


/// The configuration of the electrical test
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How raw ADC values are converted into volts
    pub calibration: Calibration,

    /// The jig's variable power supply
    pub supply: Supply,

    /// Nominal voltages the board is checked against
    pub rails: Rails,

    /// Allowed deviation from the nominal voltage, in volts
    pub tolerance: f32,

    /// Number of drive/read trials per impedance or pull test
    pub probe_trials: u32,

    /// Number of times the USB connection test is repeated
    pub usb_iterations: u32,

    /// Which jig and target pins are wired to what
    pub pins: PinMap,
}

impl Config {
    /// Load configuration
    ///
    /// Reads `path`, if given. Otherwise reads `electrical-test.toml`, if it
    /// exists, and falls back to the defaults if it doesn't.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigReadError> {
        match path {
            Some(path) => Self::read_from(path),
            None => {
                match Self::read_from(CONFIG_FILE) {
                    Err(ConfigReadError::Io(err))
                        if err.kind() == io::ErrorKind::NotFound
                    => {
                        Ok(Self::default())
                    }
                    result => result,
                }
            }
        }
    }

    /// Read configuration from the given file
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, ConfigReadError> {
        let mut config = Vec::new();
        File::open(path)?
            .read_to_end(&mut config)?;

        let config: Self = toml::from_slice(&config)?;
        config.validate()
    }

    /// Parse configuration from a string in TOML format
    pub fn parse(config: &str) -> Result<Self, ConfigReadError> {
        let config: Self = toml::from_str(config)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigReadError> {
        let first = self.pins.target_outputs;
        if first.offset(7).is_none() {
            return Err(ConfigReadError::OutputsOutOfRange(first));
        }

        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration:    Calibration::default(),
            supply:         Supply::default(),
            rails:          Rails::default(),
            tolerance:      0.3,
            probe_trials:   10,
            usb_iterations: 4,
            pins:           PinMap::default(),
        }
    }
}


/// Constants of the jig's analog front end
///
/// Every analog input sits behind a voltage divider, so the ADC can measure
/// voltages above its reference.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// ADC reference voltage, in volts
    pub reference: f32,

    /// Divider resistor between the ADC input and ground, in ohms
    pub divider_a: f32,

    /// Divider resistor between the ADC input and the signal, in ohms
    pub divider_b: f32,

    /// The ADC value that corresponds to `reference`
    pub adc_max: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            reference: 1.2,
            divider_a: 1000.0,
            divider_b: 6800.0,
            adc_max:   1023,
        }
    }
}


/// The jig's PWM-controlled power supply that feeds the board
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Supply {
    /// Output voltage at 100% duty cycle, in volts
    pub full_scale: f32,

    /// The voltage the board is powered with during the test, in volts
    pub nominal: f32,

    /// PWM frequency, in Hz
    pub pwm_frequency_hz: u32,

    /// Time to wait after every change of the supply voltage, in milliseconds
    ///
    /// The supply itself settles in well under a millisecond, but the
    /// capacitors on the board take longer to charge. Measurements taken
    /// before this has elapsed are meaningless.
    pub settle_ms: u64,
}

impl Supply {
    pub fn settle_time(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for Supply {
    fn default() -> Self {
        Self {
            full_scale:       6.42,
            nominal:          5.0,
            pwm_frequency_hz: 1_000_000,
            settle_ms:        30,
        }
    }
}


/// Nominal voltages, in volts
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Rails {
    /// The board's regulated logic supply
    pub primary: f32,

    /// The board's USB supply, as fed by the jig
    pub usb: f32,

    /// An output line that is set high
    pub line_high: f32,

    /// An output line that is set low
    pub line_low: f32,
}

impl Default for Rails {
    fn default() -> Self {
        Self {
            primary:   3.3,
            usb:       5.0,
            line_high: 5.0,
            line_low:  0.0,
        }
    }
}


/// Assignment of the jig's and the target's pins
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PinMap {
    /// PWM output that controls the power supply
    pub power_pwm: JigPin,

    /// Analog channel that senses the board's 3.3V rail
    pub target_33v: JigPin,

    /// Analog channel that senses the board's USB supply
    pub target_vusb: JigPin,

    /// Analog channels that sense the board's output lines, one per bit
    pub sense: [JigPin; 8],

    /// Digital line connected to the USB connector's shield
    pub usb_shield_ground: JigPin,

    /// Digital line connected to the USB connector's ground pin
    pub usb_signal_ground: JigPin,

    /// Digital line connected to USB D-
    pub usb_d_minus: JigPin,

    /// Digital line connected to USB D+
    pub usb_d_plus: JigPin,

    /// The first of the target's 8 output lines
    pub target_outputs: TargetPin,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            power_pwm:         JigPin(23),
            target_33v:        JigPin(8),
            target_vusb:       JigPin(9),
            sense:             [
                JigPin(0), JigPin(1), JigPin(2), JigPin(3),
                JigPin(4), JigPin(5), JigPin(6), JigPin(7),
            ],
            usb_shield_ground: JigPin(14),
            usb_signal_ground: JigPin(15),
            usb_d_minus:       JigPin(16),
            usb_d_plus:        JigPin(17),
            target_outputs:    TargetPin(0),
        }
    }
}


/// Error reading the configuration file
#[derive(Debug)]
pub enum ConfigReadError {
    Io(io::Error),
    Toml(toml::de::Error),

    /// There aren't 8 target pins starting from `pins.target_outputs`
    OutputsOutOfRange(TargetPin),
}

impl From<io::Error> for ConfigReadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for ConfigReadError {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml(err)
    }
}


#[cfg(test)]
mod tests {
    use protocol::{
        JigPin,
        TargetPin,
    };

    use super::{
        Config,
        ConfigReadError,
    };


    #[test]
    fn empty_file_should_yield_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.probe_trials, 10);
        assert_eq!(config.usb_iterations, 4);
        assert_eq!(config.supply.settle_ms, 30);
        assert_eq!(config.supply.pwm_frequency_hz, 1_000_000);
        assert_eq!(config.calibration.adc_max, 1023);
    }

    #[test]
    fn partial_sections_should_keep_remaining_defaults() {
        let config = Config::parse(
            "tolerance = 0.25\n\
             \n\
             [supply]\n\
             settle_ms = 50\n\
             \n\
             [pins]\n\
             usb_d_plus = 21\n"
        )
        .unwrap();

        assert_eq!(config.tolerance, 0.25);
        assert_eq!(config.supply.settle_ms, 50);
        assert_eq!(config.supply.nominal, 5.0);
        assert_eq!(config.pins.usb_d_plus, JigPin(21));
        assert_eq!(config.pins.usb_d_minus, JigPin(16));
    }

    #[test]
    fn outputs_past_the_last_target_pin_should_be_rejected() {
        let result = Config::parse("[pins]\ntarget_outputs = 250\n");
        assert!(matches!(
            result,
            Err(ConfigReadError::OutputsOutOfRange(TargetPin(250))),
        ));

        let config = Config::parse("[pins]\ntarget_outputs = 248\n").unwrap();
        assert_eq!(config.pins.target_outputs, TargetPin(248));
    }
}
