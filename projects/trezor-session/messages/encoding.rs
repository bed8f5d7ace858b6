use super::{Message, MessageType};
use crate::error::WireError;

/// Two bytes of message type followed by four bytes of payload length,
/// both big-endian. Report chunking belongs to the transport.
pub const HEADER_LEN: usize = 6;

impl Message {
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), WireError> {
        let payload_len = self.payload_len();
        let len = u32::try_from(payload_len).map_err(|_| WireError::Oversized(payload_len))?;

        buf.reserve(HEADER_LEN + payload_len);
        buf.extend_from_slice(&self.message_type().id().to_be_bytes());
        buf.extend_from_slice(&len.to_be_bytes());
        self.encode_payload(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_LEN {
            return Err(WireError::Truncated { expected: HEADER_LEN, actual: buf.len() });
        }

        let id = u16::from_be_bytes([buf[0], buf[1]]);
        let len = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
        let message_type = MessageType::from_u16(id).ok_or(WireError::UnknownType(id))?;

        let payload = &buf[HEADER_LEN..];
        if payload.len() < len {
            return Err(WireError::Truncated { expected: HEADER_LEN + len, actual: buf.len() });
        }

        // Anything past the declared length is report padding.
        Self::decode_payload(message_type, &payload[..len])
    }
}
