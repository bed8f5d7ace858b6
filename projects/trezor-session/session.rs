use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::config::SessionConfig;
use crate::dispatcher::{CallbackDispatcher, ConfirmationPurpose, Dispatch, InteractionRequest};
use crate::error::{Outcome, SessionError, SessionResult};
use crate::handler::{CancelAction, InteractionHandler};
use crate::messages::{ClearSession, FailureType, Features, GetFeatures, Initialize, Message};
use crate::transport::{ProtocolAdapter, Transport};
use crate::utils;

/// One logical connection to one device.
///
/// Operations take `&mut self`: the device protocol is strictly one request
/// at a time, so a session must not be shared between concurrent callers.
/// Only [`CancelAction`] may touch the transport from another thread.
pub struct DeviceSession {
    transport: Arc<dyn Transport>,
    handler: Arc<dyn InteractionHandler>,
    dispatcher: CallbackDispatcher,
    coin_name: String,
    message_override: Option<ConfirmationPurpose>,
    features: Features,
}

/// Calls [`InteractionHandler::finished`] when dropped, so the handler hears
/// about the end of an operation on every exit path.
struct FinishedGuard {
    handler: Arc<dyn InteractionHandler>,
}

impl Drop for FinishedGuard {
    fn drop(&mut self) {
        self.handler.finished();
    }
}

/// Clears [`DeviceSession::message_override`] when dropped.
struct OverrideGuard<'a> {
    session: &'a mut DeviceSession,
}

impl Deref for OverrideGuard<'_> {
    type Target = DeviceSession;

    fn deref(&self) -> &DeviceSession {
        self.session
    }
}

impl DerefMut for OverrideGuard<'_> {
    fn deref_mut(&mut self) -> &mut DeviceSession {
        self.session
    }
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        self.session.message_override = None;
    }
}

impl DeviceSession {
    /// Run the `Initialize` handshake over an already-open transport and
    /// start a session with the reported features.
    pub fn open(
        transport: Arc<dyn Transport>,
        handler: Arc<dyn InteractionHandler>,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let features = match transport.handle(Initialize {}.into())? {
            Message::Features(f) => f,
            Message::Failure(f) => {
                return Err(SessionError::Device {
                    code: f.code.and_then(FailureType::from_i32),
                    message: f.message.unwrap_or_default(),
                })
            }
            other => return Err(SessionError::UnexpectedMessage(other.message_type())),
        };

        info!(
            device = %config.device_name,
            label = features.label(),
            "opened session with firmware {}.{}.{}",
            features.major_version(),
            features.minor_version(),
            features.patch_version()
        );

        Ok(Self {
            dispatcher: CallbackDispatcher::new(Arc::clone(&handler), config.device_name),
            transport,
            handler,
            coin_name: config.coin_name,
            message_override: None,
            features,
        })
    }

    pub fn device(&self) -> &str {
        self.dispatcher.device()
    }

    pub fn coin_name(&self) -> &str {
        &self.coin_name
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    /// The name given to the device by its owner.
    pub fn label(&self) -> &str {
        self.features.label()
    }

    /// `false` once the device has been wiped.
    pub fn is_initialized(&self) -> bool {
        self.features.initialized()
    }

    pub fn firmware_version(&self) -> (u32, u32, u32) {
        (
            self.features.major_version(),
            self.features.minor_version(),
            self.features.patch_version(),
        )
    }

    /// Compares the running firmware against `major.minor.patch`:
    /// `Greater` or `Equal` means the firmware is at least that version.
    pub fn at_least_version(&self, major: u32, minor: u32, patch: u32) -> Ordering {
        utils::compare_versions(self.firmware_version(), (major, minor, patch))
    }

    /// Prompt selection currently forced onto button confirmations. `None`
    /// outside of an override-scoped operation.
    pub fn message_override(&self) -> Option<ConfirmationPurpose> {
        self.message_override
    }

    /// Recovery words entered in the current recovery.
    pub fn step_counter(&self) -> u32 {
        self.dispatcher.step()
    }

    pub fn cancel_action(&self) -> CancelAction {
        CancelAction::new(Arc::clone(&self.transport))
    }

    /// Write a `Cancel` to the device outside the normal call flow.
    pub fn cancel(&self) {
        self.cancel_action().invoke();
    }

    /// Replace the features snapshot with a fresh one from the device. If the
    /// user cancels a prompt raised on the way, the old snapshot is kept.
    pub fn refresh_features(&mut self) -> SessionResult<()> {
        let outcome = self.call_expecting(GetFeatures {}.into(), |m| match m {
            Message::Features(f) => Some(f),
            _ => None,
        })?;
        match outcome {
            Outcome::Done(features) => self.features = features,
            Outcome::Cancelled => debug!("refresh_features: cancelled, keeping snapshot"),
        }
        Ok(())
    }

    /// Send `msg` and answer every interaction request until the device
    /// produces a terminal response.
    pub(crate) fn call(&mut self, msg: Message) -> SessionResult<Outcome<Message>> {
        let cancel = self.cancel_action();
        let mut response = self.transport.handle(msg)?;

        loop {
            let request = match InteractionRequest::classify(response) {
                Ok(request) => request,
                Err(terminal) => return Ok(Outcome::Done(terminal)),
            };

            match self.dispatcher.dispatch(request, self.message_override, &cancel)? {
                Dispatch::Reply(reply) => response = self.transport.handle(reply)?,
                Dispatch::Cancelled => return Ok(Outcome::Cancelled),
            }
        }
    }

    /// [`call`](Self::call), then pick the expected terminal response apart
    /// with `extract`. Anything `extract` rejects is an unexpected message.
    pub(crate) fn call_expecting<T>(
        &mut self,
        msg: Message,
        extract: impl FnOnce(Message) -> Option<T>,
    ) -> SessionResult<Outcome<T>> {
        match self.call(msg)? {
            Outcome::Done(response) => {
                let message_type = response.message_type();
                extract(response)
                    .map(Outcome::Done)
                    .ok_or(SessionError::UnexpectedMessage(message_type))
            }
            Outcome::Cancelled => Ok(Outcome::Cancelled),
        }
    }

    /// Run a device operation and signal [`InteractionHandler::finished`]
    /// exactly once afterwards, whether it completed, was cancelled or failed.
    pub fn run_wrapped<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> SessionResult<Outcome<T>>,
    ) -> SessionResult<Outcome<T>> {
        let _finished = FinishedGuard {
            handler: Arc::clone(&self.handler),
        };

        let result = op(self);
        match &result {
            Ok(Outcome::Done(_)) => debug!(operation, "completed"),
            Ok(Outcome::Cancelled) => debug!(operation, "cancelled by user"),
            Err(e) => error!(operation, "device operation failed: {}", e),
        }
        result
    }

    /// Force button confirmations inside `op` to use `purpose`'s prompt. The
    /// override is cleared before returning, on every path including unwinds.
    pub fn with_override<T>(
        &mut self,
        purpose: ConfirmationPurpose,
        op: impl FnOnce(&mut Self) -> SessionResult<T>,
    ) -> SessionResult<T> {
        self.message_override = Some(purpose);
        let mut scoped = OverrideGuard { session: self };
        op(&mut *scoped)
    }

    pub(crate) fn reset_recovery_step(&mut self) {
        self.dispatcher.reset_step();
    }

    /// Forget the cached PIN and passphrase so the next operation asks again.
    ///
    /// Never fails: a device that is gone has no session left to clear.
    #[instrument(level = "info", skip(self))]
    pub fn clear_session(&mut self) {
        info!("clear session: {}", self);
        match self.call(ClearSession {}.into()) {
            Ok(Outcome::Done(Message::Success(_))) => {}
            Ok(Outcome::Done(other)) => {
                warn!("clear_session: ignoring unexpected {:?}", other.message_type())
            }
            Ok(Outcome::Cancelled) => debug!("clear_session: cancelled"),
            Err(e) => warn!("clear_session: ignoring error: {}", e),
        }
    }

    /// Release the device after the wallet closes or the device is removed.
    /// Safe after any earlier failure; never fails.
    pub fn close(mut self) {
        info!("closing session {}", self);
        self.clear_session();
        if let Err(e) = self.transport.close() {
            warn!("close: ignoring transport error: {}", e);
        }
    }
}

impl fmt::Display for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.label(), self.features.device_id())
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device", &self.device())
            .field("label", &self.label())
            .field("message_override", &self.message_override)
            .field("step_counter", &self.step_counter())
            .finish_non_exhaustive()
    }
}
