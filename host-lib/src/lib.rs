//! Library to support the test suite running on the host computer
//!
//! Provides the serial connection to the test stand's nodes, a generic API for
//! the pins of those nodes, and the test stand configuration.


pub mod config;
pub mod conn;
pub mod error;
pub mod pin;
pub mod test_stand;


pub use self::{
    config::Config,
    conn::Conn,
    error::{
        Error,
        Result,
    },
    test_stand::TestStand,
};
