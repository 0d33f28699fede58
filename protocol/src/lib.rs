//! Messages exchanged between the host and the nodes of the test stand
//!
//! The electrical test stand has two nodes: The test jig, which is known-good
//! hardware that measures and drives the lines of the board under test, and
//! the test target (the board under test itself). Both are controlled by the
//! host over a serial connection, using the messages defined here.


#![no_std]


pub mod pin;


use core::{
    convert::TryFrom,
    fmt,
};

use serde::{
    Deserialize,
    Serialize,
};


/// A message from the host to the test jig
#[derive(Debug, Deserialize, Serialize)]
pub enum HostToJig {
    /// Change the direction of one of the jig's pins
    SetMode(pin::SetMode<JigPin>),

    /// Change the level of one of the jig's output pins
    SetLevel(pin::SetLevel<JigPin>),

    /// Ask the jig for the current level of a pin
    ReadLevel(pin::ReadLevel<JigPin>),

    /// Drive, release and read back a pin in one go
    Probe(pin::Probe<JigPin>),

    /// Ask the jig to sample one of its analog inputs
    ReadAnalog(pin::ReadAnalog<JigPin>),

    /// Configure one of the jig's PWM outputs
    SetPwm(pin::SetPwm<JigPin>),
}

impl From<pin::SetMode<JigPin>> for HostToJig {
    fn from(set_mode: pin::SetMode<JigPin>) -> Self {
        Self::SetMode(set_mode)
    }
}

impl From<pin::SetLevel<JigPin>> for HostToJig {
    fn from(set_level: pin::SetLevel<JigPin>) -> Self {
        Self::SetLevel(set_level)
    }
}

impl From<pin::ReadLevel<JigPin>> for HostToJig {
    fn from(read_level: pin::ReadLevel<JigPin>) -> Self {
        Self::ReadLevel(read_level)
    }
}

impl From<pin::Probe<JigPin>> for HostToJig {
    fn from(probe: pin::Probe<JigPin>) -> Self {
        Self::Probe(probe)
    }
}

impl From<pin::ReadAnalog<JigPin>> for HostToJig {
    fn from(read_analog: pin::ReadAnalog<JigPin>) -> Self {
        Self::ReadAnalog(read_analog)
    }
}

impl From<pin::SetPwm<JigPin>> for HostToJig {
    fn from(set_pwm: pin::SetPwm<JigPin>) -> Self {
        Self::SetPwm(set_pwm)
    }
}


/// A message from the test jig to the host
#[derive(Debug, Deserialize, Serialize)]
pub enum JigToHost {
    /// Reply to `ReadLevel` and `Probe`
    ReadLevelResult(pin::ReadLevelResult<JigPin>),

    /// Reply to `ReadAnalog`
    ReadAnalogResult(pin::ReadAnalogResult<JigPin>),
}

impl TryFrom<JigToHost> for pin::ReadLevelResult<JigPin> {
    type Error = JigToHost;

    fn try_from(value: JigToHost) -> Result<Self, Self::Error> {
        match value {
            JigToHost::ReadLevelResult(result) => Ok(result),
            _                                  => Err(value),
        }
    }
}

impl TryFrom<JigToHost> for pin::ReadAnalogResult<JigPin> {
    type Error = JigToHost;

    fn try_from(value: JigToHost) -> Result<Self, Self::Error> {
        match value {
            JigToHost::ReadAnalogResult(result) => Ok(result),
            _                                   => Err(value),
        }
    }
}


/// A message from the host to the test target
#[derive(Debug, Deserialize, Serialize)]
pub enum HostToTarget {
    /// Change the direction of one of the target's pins
    SetMode(pin::SetMode<TargetPin>),

    /// Write 8 consecutive output lines at once
    ///
    /// Bit `n` of `bits` goes to the pin `first.offset(n)`.
    WritePort {
        first: TargetPin,
        bits:  u8,
    },

    /// Enable or disable the target's internal USB pull-up resistor on D+
    SetUsbPullup(bool),
}


/// A message from the test target to the host
///
/// Every `HostToTarget` request is answered by exactly one of these.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum TargetToHost {
    /// The request was carried out
    Ack,

    /// The target could not carry out the request
    Rejected,
}


/// Identifies one of the test jig's pins
///
/// For `ReadAnalog`, this is the number of the analog channel. For all other
/// requests, it's the number of the digital pin.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub struct JigPin(pub u8);

impl fmt::Display for JigPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// Identifies one of the test target's pins
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub struct TargetPin(pub u8);

impl TargetPin {
    /// The pin `n` positions after this one, in the same port
    ///
    /// Returns `None`, if there is no such pin.
    pub fn offset(self, n: u8) -> Option<Self> {
        self.0.checked_add(n).map(TargetPin)
    }
}

impl fmt::Display for TargetPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
