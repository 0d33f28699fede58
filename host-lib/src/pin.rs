//! API for remotely controlling and monitoring pins on a test node


use std::{
    convert::TryInto,
    fmt::Debug,
    time::Duration,
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};

use protocol::pin;

use crate::conn::{
    Conn,
    ConnReceiveError,
    ConnSendError,
};


/// API for remotely controlling and monitoring a pin on a test node
///
/// This struct is intended as a building block for higher-level interfaces
/// that control the test nodes of a specific test stand. The methods are
/// generic over the node's message types: `Request` is what the host sends,
/// `Reply` what the node answers with.
pub struct Pin<Id> {
    pin: Id,
}

impl<Id> Pin<Id>
    where Id: Copy + Debug
{
    /// Create a new instance of `Pin`
    pub fn new(pin: Id) -> Self {
        Self {
            pin,
        }
    }

    /// Commands the node to change the pin's direction
    pub fn set_mode<Request>(&mut self,
        mode: pin::Mode,
        conn: &mut Conn,
    )
        -> Result<(), ConnSendError>
        where
            Request: From<pin::SetMode<Id>> + Serialize + Debug,
    {
        let command = pin::SetMode { pin: self.pin, mode };
        let message: Request = command.into();
        conn.send(&message)
    }

    /// Commands the node to change pin level
    ///
    /// Constructs the command, converts it into a message that the node will
    /// understand, then sends that message to the node through `conn`.
    pub fn set_level<Request>(&mut self,
        level: pin::Level,
        conn: &mut Conn,
    )
        -> Result<(), ConnSendError>
        where
            Request: From<pin::SetLevel<Id>> + Serialize + Debug,
    {
        let command = pin::SetLevel { pin: self.pin, level };
        let message: Request = command.into();
        conn.send(&message)
    }

    /// Commands the node to output a PWM signal on the pin
    pub fn set_pwm<Request>(&mut self,
        frequency_hz: u32,
        duty: u8,
        conn: &mut Conn,
    )
        -> Result<(), ConnSendError>
        where
            Request: From<pin::SetPwm<Id>> + Serialize + Debug,
    {
        let command = pin::SetPwm { pin: self.pin, frequency_hz, duty };
        let message: Request = command.into();
        conn.send(&message)
    }

    /// Read the current level of the pin
    ///
    /// Sends a `ReadLevel` request and waits for the node's reply.
    pub fn read_level<Request, Reply>(&mut self,
        timeout: Duration,
        conn: &mut Conn,
    )
        -> Result<pin::Level, ReadLevelError>
        where
            Id: Eq,
            Request: From<pin::ReadLevel<Id>> + Serialize + Debug,
            Reply: TryInto<pin::ReadLevelResult<Id>, Error=Reply>
                + Debug
                + DeserializeOwned,
    {
        let request: Request = pin::ReadLevel { pin: self.pin }.into();
        conn.send(&request)
            .map_err(|err| ReadLevelError::Send(err))?;

        self.receive_level::<Reply>(timeout, conn)
    }

    /// Drive the pin to `level`, release it, and read it back
    ///
    /// The node does all of this in one go, so no other request can get in
    /// between driving and reading.
    pub fn probe<Request, Reply>(&mut self,
        level: pin::Level,
        timeout: Duration,
        conn: &mut Conn,
    )
        -> Result<pin::Level, ReadLevelError>
        where
            Id: Eq,
            Request: From<pin::Probe<Id>> + Serialize + Debug,
            Reply: TryInto<pin::ReadLevelResult<Id>, Error=Reply>
                + Debug
                + DeserializeOwned,
    {
        let request: Request = pin::Probe { pin: self.pin, level }.into();
        conn.send(&request)
            .map_err(|err| ReadLevelError::Send(err))?;

        self.receive_level::<Reply>(timeout, conn)
    }

    /// Sample the pin as an analog input
    ///
    /// Returns the raw ADC value.
    pub fn read_analog<Request, Reply>(&mut self,
        timeout: Duration,
        conn: &mut Conn,
    )
        -> Result<u16, ReadAnalogError>
        where
            Id: Eq,
            Request: From<pin::ReadAnalog<Id>> + Serialize + Debug,
            Reply: TryInto<pin::ReadAnalogResult<Id>, Error=Reply>
                + Debug
                + DeserializeOwned,
    {
        let request: Request = pin::ReadAnalog { pin: self.pin }.into();
        conn.send(&request)
            .map_err(|err| ReadAnalogError::Send(err))?;

        let mut buf = Vec::new();
        let reply = conn.receive::<Reply>(timeout, &mut buf)
            .map_err(|err| ReadAnalogError::Receive(err))?;

        match reply.try_into() {
            Ok(pin::ReadAnalogResult { pin, value }) if pin == self.pin => {
                Ok(value)
            }
            Ok(result) => {
                Err(
                    ReadAnalogError::UnexpectedMessage(
                        format!("{:?}", result)
                    )
                )
            }
            Err(message) => {
                Err(
                    ReadAnalogError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }

    fn receive_level<Reply>(&mut self, timeout: Duration, conn: &mut Conn)
        -> Result<pin::Level, ReadLevelError>
        where
            Id: Eq,
            Reply: TryInto<pin::ReadLevelResult<Id>, Error=Reply>
                + Debug
                + DeserializeOwned,
    {
        let mut buf = Vec::new();
        let reply = conn.receive::<Reply>(timeout, &mut buf)
            .map_err(|err| {
                if err.is_timeout() {
                    ReadLevelError::Timeout
                }
                else {
                    ReadLevelError::Receive(err)
                }
            })?;

        match reply.try_into() {
            Ok(pin::ReadLevelResult { pin, level }) if pin == self.pin => {
                Ok(level)
            }
            Ok(result) => {
                Err(
                    ReadLevelError::UnexpectedMessage(
                        format!("{:?}", result)
                    )
                )
            }
            Err(message) => {
                Err(
                    ReadLevelError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }
}


#[derive(Debug)]
pub enum ReadLevelError {
    Send(ConnSendError),
    Receive(ConnReceiveError),
    UnexpectedMessage(String),
    Timeout,
}


#[derive(Debug)]
pub enum ReadAnalogError {
    Send(ConnSendError),
    Receive(ConnReceiveError),
    UnexpectedMessage(String),
}
