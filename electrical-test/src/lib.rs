//! Production electrical test for boards on the electrical test stand
//!
//! Powers the board under test through the test jig, checks its USB connector,
//! and sweeps its 8-bit output port, measuring every rail and output line
//! along the way. The result is pass/fail plus a log transcript that names the
//! check that failed.
//!
//! The checks are methods on [`Context`], which owns the hardware, the
//! configuration, and the log sink. The hardware is accessed through the
//! traits in [`io`], so the same test runs on the real test stand ([`jig`],
//! [`target`]) and on the simulated board in [`sim`].


pub mod config;
pub mod context;
pub mod error;
pub mod impedance;
pub mod io;
pub mod jig;
pub mod orchestrator;
pub mod pattern;
pub mod power;
pub mod report;
pub mod sampler;
pub mod sim;
pub mod step;
pub mod target;
pub mod test_stand;
pub mod threshold;
pub mod usb;


pub use self::{
    config::Config,
    context::Context,
    error::{
        Error,
        HardwareError,
        Node,
        Result,
        StageError,
        UsbFault,
    },
    orchestrator::Stage,
    report::{
        LogReport,
        Report,
        Transcript,
    },
    test_stand::TestStand,
    threshold::{
        Measurement,
        Threshold,
    },
};
