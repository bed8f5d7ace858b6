//! The wallet-side capability a [`DeviceSession`](crate::session::DeviceSession)
//! calls out to whenever the device needs the user.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::messages::{Cancel, CharacterAck, CharacterRequest};
use crate::transport::{ProtocolAdapter, Transport};

/// UI hooks for device interaction. Every method blocks the session until it
/// returns.
#[cfg_attr(test, mockall::automock)]
pub trait InteractionHandler: Send + Sync {
    /// Display `text` (typically "confirm on device"). `cancel` may be invoked
    /// later, from any thread, to abort the operation waiting on the device.
    fn show_message(&self, text: &str, cancel: CancelAction);

    /// `None` declines the prompt.
    fn get_pin(&self, prompt: &str) -> Option<String>;

    /// `None` declines the prompt. An empty passphrase is a valid answer.
    fn get_passphrase(&self, prompt: &str) -> Option<String>;

    /// The device cannot take a cancel in the middle of recovery, so a word
    /// is always required.
    fn get_word(&self, prompt: &str) -> String;

    /// `None` or an empty [`CharacterInput`] declines the prompt.
    fn get_char(&self, request: &CharacterRequest) -> Option<CharacterInput>;

    /// Called once when a wrapped operation ends, whatever its result, so any
    /// open prompt can be closed.
    fn finished(&self);
}

/// One step of character-by-character recovery entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterInput {
    pub character: Option<String>,
    pub delete: bool,
    pub done: bool,
}

impl CharacterInput {
    pub fn is_empty(&self) -> bool {
        self.character.as_deref().map_or(true, str::is_empty) && !self.delete && !self.done
    }
}

impl From<CharacterInput> for CharacterAck {
    fn from(input: CharacterInput) -> Self {
        CharacterAck {
            character: input.character.filter(|c| !c.is_empty()),
            delete: input.delete.then_some(true),
            done: input.done.then_some(true),
        }
    }
}

/// Out-of-band cancel bound to one session's transport.
///
/// Writes a `Cancel` straight to the transport instead of interrupting the
/// blocked call; the device then answers the pending request with a
/// cancellation `Failure`.
#[derive(Clone)]
pub struct CancelAction {
    transport: Arc<dyn Transport>,
}

impl CancelAction {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn invoke(&self) {
        debug!("writing Cancel to device");
        if let Err(e) = self.transport.send(Cancel {}.into()) {
            warn!("cancel: failed to reach device: {}", e);
        }
    }
}

impl fmt::Debug for CancelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelAction").finish_non_exhaustive()
    }
}
