use std::{
    fmt::Debug,
    io::{
        self,
        prelude::*,
    },
    slice,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};
use serialport::{
    self,
    SerialPort,
};

use crate::Error;


/// A connection to a test stand node
pub struct Conn {
    port: Box<dyn SerialPort>,
}

impl Conn {
    /// Open the connection
    ///
    /// `path` is the path to the serial device file that connects to the node.
    /// `timeout` is the initial read timeout; `receive` overrides it for each
    /// message.
    pub fn new(path: &str, baud_rate: u32, timeout: Duration)
        -> Result<Self, ConnInitError>
    {
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|err| ConnInitError(err))?;

        log::debug!("Opened {} at {} baud", path, baud_rate);

        Ok(
            Self {
                port,
            }
        )
    }

    /// Send a message
    ///
    /// `message` can be any type that can be serialized using `serde`.
    pub fn send<T>(&mut self, message: &T) -> Result<(), ConnSendError>
        where T: Serialize + Debug
    {
        log::trace!("Sending {:?}", message);

        self.send_inner(message)
            .map_err(|err| ConnSendError(err))
    }

    fn send_inner<T>(&mut self, message: &T) -> Result<(), Error>
        where T: Serialize
    {
        let mut buf = [0; 256];

        let serialized = postcard::to_slice_cobs(message, &mut buf)?;
        self.port.write_all(serialized)?;

        Ok(())
    }

    /// Wait for the next message from the node
    ///
    /// Fails with a timeout error, if no complete message arrives within
    /// `timeout`. The message is framed into `buf`, which the returned value
    /// may borrow from.
    pub fn receive<'de, T>(&mut self, timeout: Duration, buf: &'de mut Vec<u8>)
        -> Result<T, ConnReceiveError>
        where T: Deserialize<'de> + Debug
    {
        let message = self.receive_inner::<T>(timeout, buf)
            .map_err(|err| ConnReceiveError(err))?;

        log::trace!("Received {:?}", message);

        Ok(message)
    }

    fn receive_inner<'de, T>(&mut self,
        timeout: Duration,
        buf:     &'de mut Vec<u8>,
    )
        -> Result<T, Error>
        where T: Deserialize<'de>
    {
        self.port.set_timeout(timeout)?;
        buf.clear();

        loop {
            let mut byte = 0;
            self.port.read_exact(slice::from_mut(&mut byte))?;
            buf.push(byte);

            // COBS frames end with the only zero byte they contain
            if byte == 0 {
                break;
            }
        }

        let message = postcard::from_bytes_cobs(buf)?;
        Ok(message)
    }
}


/// Error initializing connection
#[derive(Debug)]
pub struct ConnInitError(pub serialport::Error);


/// Error sending data through a connection
#[derive(Debug)]
pub struct ConnSendError(pub Error);


/// Error receiving from a connection
#[derive(Debug)]
pub struct ConnReceiveError(pub Error);

impl ConnReceiveError {
    pub fn is_timeout(&self) -> bool {
        match &self.0 {
            Error::Io(err) if err.kind() == io::ErrorKind::TimedOut => {
                true
            }
            _ => {
                false
            }
        }
    }
}
