//! Generic protocol related to pins
//!
//! The types in this module are not specific to any test stand setup, and can
//! be re-used for different test nodes. `Id` is whatever type the node uses to
//! identify its pins.


use serde::{
    Deserialize,
    Serialize,
};


/// Sent by the host to command a test node to set a pin to a specific level
///
/// The pin needs to be configured as an output for this to have any effect.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SetLevel<Id> {
    /// The pin whose level should be set
    pub pin: Id,

    /// The new level of the pin
    pub level: Level,
}


/// Sent by the host to change the direction of a pin
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SetMode<Id> {
    /// The pin whose mode should be changed
    pub pin: Id,

    /// The new mode of the pin
    pub mode: Mode,
}


/// Sent by the host to request the current level of a pin
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ReadLevel<Id> {
    /// The pin whose level to read
    pub pin: Id,
}


/// Sent by a test node in response to a `ReadLevel` or `Probe` message
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ReadLevelResult<Id> {
    /// The pin that was read
    pub pin: Id,

    /// The level of the pin at the time of reading
    pub level: Level,
}


/// Sent by the host to probe a pin's electrical behavior
///
/// The node drives the pin to `level`, switches it to input, and reads it back
/// immediately, without handling any other request in between. It replies with
/// a `ReadLevelResult`.
///
/// Whether a floating line still holds the driven level at the time of the
/// read depends on how quickly the node can do this, which is why it must not
/// be split into separate requests.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Probe<Id> {
    /// The pin to probe
    pub pin: Id,

    /// The level the pin is driven to before it is released
    pub level: Level,
}


/// Sent by the host to request a sample from an analog input
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ReadAnalog<Id> {
    /// The analog channel to sample
    pub pin: Id,
}


/// Sent by a test node in response to a `ReadAnalog` message
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ReadAnalogResult<Id> {
    /// The analog channel that was sampled
    pub pin: Id,

    /// The raw ADC value, not converted in any way
    pub value: u16,
}


/// Sent by the host to configure and drive a PWM output
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SetPwm<Id> {
    /// The pin that outputs the PWM signal
    pub pin: Id,

    /// PWM frequency in Hz
    pub frequency_hz: u32,

    /// Duty cycle, `0` being always low and `255` always high
    pub duty: u8,
}


/// Represents the electrical level of a pin
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum Level {
    High,
    Low,
}

impl Level {
    /// The level that corresponds to the lowest bit of `value`
    pub fn from_bit(value: u32) -> Self {
        if value & 1 == 1 {
            Level::High
        }
        else {
            Level::Low
        }
    }

    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}


/// The direction of a pin
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum Mode {
    /// Floating input
    Input,

    /// Input with the node's internal pull-up resistor enabled
    InputPullUp,

    /// Push-pull output
    Output,
}
