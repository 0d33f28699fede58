use std::time::Duration;

use host_lib::conn::{
    Conn,
    ConnReceiveError,
    ConnSendError,
};
use protocol::{
    HostToTarget,
    TargetPin,
    TargetToHost,
    pin::{
        self,
        Mode,
    },
};

use crate::io::TargetIo;


/// The connection to the test target
pub struct Target {
    conn:    Conn,
    timeout: Duration,
}

impl Target {
    /// `timeout` is how long to wait for the target to acknowledge a request
    pub fn new(conn: Conn, timeout: Duration) -> Self {
        Self {
            conn,
            timeout,
        }
    }

    /// Send a request and wait for the target to acknowledge it
    fn request(&mut self, request: HostToTarget) -> Result<(), TargetError> {
        self.conn.send(&request)
            .map_err(|err| TargetError::Send(err))?;

        let mut buf = Vec::new();
        let reply = self.conn.receive::<TargetToHost>(self.timeout, &mut buf)
            .map_err(|err| TargetError::Receive(err))?;

        match reply {
            TargetToHost::Ack => {
                Ok(())
            }
            TargetToHost::Rejected => {
                Err(TargetError::Rejected(format!("{:?}", request)))
            }
        }
    }
}

impl TargetIo for Target {
    type Error = TargetError;

    fn set_mode(&mut self, pin: TargetPin, mode: Mode)
        -> Result<(), TargetError>
    {
        self.request(HostToTarget::SetMode(pin::SetMode { pin, mode }))
    }

    fn write_port(&mut self, first: TargetPin, bits: u8)
        -> Result<(), TargetError>
    {
        self.request(HostToTarget::WritePort { first, bits })
    }

    fn set_usb_pullup(&mut self, enabled: bool) -> Result<(), TargetError> {
        self.request(HostToTarget::SetUsbPullup(enabled))
    }
}


#[derive(Debug)]
pub enum TargetError {
    Send(ConnSendError),
    Receive(ConnReceiveError),

    /// The target refused to carry out the request
    Rejected(String),
}
