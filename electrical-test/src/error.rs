//! Error handling for the electrical test
//!
//! Every failure aborts the test run. The variants of [`Error`] only tell the
//! caller why it was aborted.


use std::fmt;

use crate::{
    orchestrator::Stage,
    threshold::Measurement,
};


/// Result type specific to the electrical test
pub type Result<T = ()> = std::result::Result<T, Error>;


/// The reason a check failed
#[derive(Debug)]
pub enum Error {
    /// The jig or the target could not carry out a request
    Hardware(HardwareError),

    /// A measured voltage was outside of its allowed range
    OutOfTolerance(Measurement),

    /// A USB line did not behave as expected
    Usb(UsbFault),
}

impl From<HardwareError> for Error {
    fn from(err: HardwareError) -> Self {
        Self::Hardware(err)
    }
}

impl From<UsbFault> for Error {
    fn from(fault: UsbFault) -> Self {
        Self::Usb(fault)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Hardware(err)          => write!(f, "{}", err),
            Error::OutOfTolerance(result) => write!(f, "{}", result),
            Error::Usb(fault)             => write!(f, "{}", fault),
        }
    }
}


/// A request to the jig or the target failed
///
/// The node's own error is kept in its `Debug` form, so the checks don't have
/// to be generic over the error types of the nodes.
#[derive(Debug)]
pub struct HardwareError {
    pub node:    Node,
    pub message: String,
}

impl HardwareError {
    pub fn jig(err: impl fmt::Debug) -> Self {
        Self {
            node:    Node::Jig,
            message: format!("{:?}", err),
        }
    }

    pub fn target(err: impl fmt::Debug) -> Self {
        Self {
            node:    Node::Target,
            message: format!("{:?}", err),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} request failed: {}", self.node, self.message)
    }
}


/// The test stand node a request was sent to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Node {
    Jig,
    Target,
}


/// A fault detected on the board's USB connection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UsbFault {
    ShieldGround,
    SignalGround,
    DMinusNotHighZ,
    DPlusNotHighZ,
    DPlusNoPullUp,
    DMinusShortToDPlus,
}

impl fmt::Display for UsbFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            UsbFault::ShieldGround =>
                "Faulty USB shield ground",
            UsbFault::SignalGround =>
                "Faulty USB signal ground",
            UsbFault::DMinusNotHighZ =>
                "Fault on USB D-, expected High-Z",
            UsbFault::DPlusNotHighZ =>
                "Fault on USB D+, expected High-Z",
            UsbFault::DPlusNoPullUp =>
                "Fault on USB D+, no pull-up found",
            UsbFault::DMinusShortToDPlus =>
                "Fault on USB D-, expected High-Z. Possible short to D+",
        };

        f.write_str(description)
    }
}


/// The test run was aborted in `stage`
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: Error,
}
