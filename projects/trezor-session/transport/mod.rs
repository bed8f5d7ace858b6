pub mod protocol_adapter;

pub use protocol_adapter::*;

use crate::error::TransportError;

/// Byte-level link to one device.
///
/// Methods take `&self` so a cancel can be written from another thread while
/// a session call is blocked in [`Transport::read`]. Implementations own
/// report chunking and any timeout policy; a removed device must surface as
/// an error from the blocked call.
pub trait Transport: Send + Sync {
    fn write(&self, msg: &[u8]) -> Result<usize, TransportError>;
    fn read(&self, buf: &mut Vec<u8>) -> Result<(), TransportError>;
    fn close(&self) -> Result<(), TransportError>;
}
