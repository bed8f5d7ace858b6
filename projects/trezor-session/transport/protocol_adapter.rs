use super::Transport;
use crate::error::SessionResult;
use crate::messages::Message;

use log::{debug, info};

/// Message-level view of a transport: framed send and send-then-receive.
pub trait ProtocolAdapter {
    fn send(&self, msg: Message) -> SessionResult<()>;
    fn handle(&self, msg: Message) -> SessionResult<Message>;
}

impl<T> ProtocolAdapter for T
where
    T: Transport + ?Sized,
{
    fn send(&self, msg: Message) -> SessionResult<()> {
        info!("ProtocolAdapter::send: Sending message type: {:?}", msg.message_type());

        let mut out_buf = Vec::<u8>::with_capacity(msg.encoded_len());
        msg.encode(&mut out_buf)?;

        debug!("ProtocolAdapter::send: Encoded message size: {} bytes", out_buf.len());

        self.write(&out_buf)?;

        Ok(())
    }

    fn handle(&self, msg: Message) -> SessionResult<Message> {
        self.send(msg)?;

        let mut in_buf = Vec::<u8>::new();
        self.read(&mut in_buf)?;

        debug!("ProtocolAdapter::handle: Received {} bytes response", in_buf.len());

        let out = Message::decode(&in_buf)?;
        info!("ProtocolAdapter::handle: Decoded response type: {:?}", out.message_type());

        Ok(out)
    }
}
