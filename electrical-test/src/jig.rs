use std::time::Duration;

use host_lib::{
    conn::{
        Conn,
        ConnSendError,
    },
    pin::{
        Pin,
        ReadAnalogError,
        ReadLevelError,
    },
};
use protocol::{
    HostToJig,
    JigPin,
    JigToHost,
    pin::{
        Level,
        Mode,
    },
};

use crate::io::JigIo;


/// The connection to the test jig
pub struct Jig {
    conn:    Conn,
    timeout: Duration,
}

impl Jig {
    /// `timeout` is how long to wait for each reply
    pub fn new(conn: Conn, timeout: Duration) -> Self {
        Self {
            conn,
            timeout,
        }
    }
}

impl JigIo for Jig {
    type Error = JigError;

    fn set_mode(&mut self, pin: JigPin, mode: Mode) -> Result<(), JigError> {
        Pin::new(pin)
            .set_mode::<HostToJig>(mode, &mut self.conn)
            .map_err(|err| JigError::Send(err))
    }

    fn write(&mut self, pin: JigPin, level: Level) -> Result<(), JigError> {
        Pin::new(pin)
            .set_level::<HostToJig>(level, &mut self.conn)
            .map_err(|err| JigError::Send(err))
    }

    fn read(&mut self, pin: JigPin) -> Result<Level, JigError> {
        let level = Pin::new(pin)
            .read_level::<HostToJig, JigToHost>(self.timeout, &mut self.conn)?;
        Ok(level)
    }

    fn read_analog(&mut self, pin: JigPin) -> Result<u16, JigError> {
        let value = Pin::new(pin)
            .read_analog::<HostToJig, JigToHost>(self.timeout, &mut self.conn)?;
        Ok(value)
    }

    fn set_pwm(&mut self, pin: JigPin, frequency_hz: u32, duty: u8)
        -> Result<(), JigError>
    {
        Pin::new(pin)
            .set_pwm::<HostToJig>(frequency_hz, duty, &mut self.conn)
            .map_err(|err| JigError::Send(err))
    }

    /// Leaves the timing-critical part to the jig
    ///
    /// A round trip over the serial connection takes far longer than a
    /// floating line holds its charge, so the four primitives can't be used
    /// here.
    fn probe(&mut self, pin: JigPin, level: Level) -> Result<Level, JigError> {
        let level = Pin::new(pin)
            .probe::<HostToJig, JigToHost>(level, self.timeout, &mut self.conn)?;
        Ok(level)
    }
}


#[derive(Debug)]
pub enum JigError {
    Send(ConnSendError),
    ReadLevel(ReadLevelError),
    ReadAnalog(ReadAnalogError),
}

impl From<ReadLevelError> for JigError {
    fn from(err: ReadLevelError) -> Self {
        Self::ReadLevel(err)
    }
}

impl From<ReadAnalogError> for JigError {
    fn from(err: ReadAnalogError) -> Self {
        Self::ReadAnalog(err)
    }
}
