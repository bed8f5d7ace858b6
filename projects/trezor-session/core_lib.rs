//! Headless Trezor session layer: runs device operations and answers the
//! device's PIN, passphrase, button and recovery prompts through a
//! wallet-supplied [`InteractionHandler`].

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod messages;
pub mod operations;
pub mod session;
pub mod transport;
pub mod utils;

pub use config::SessionConfig;
pub use dispatcher::{ConfirmationPurpose, PinPurpose, RECOVERY_WORD_TOTAL};
pub use error::{Outcome, SessionError, SessionErrorKind, SessionResult, TransportError};
pub use handler::{CancelAction, CharacterInput, InteractionHandler};
pub use operations::{SignedTx, TxAckSource};
pub use session::DeviceSession;
pub use transport::{ProtocolAdapter, Transport};
