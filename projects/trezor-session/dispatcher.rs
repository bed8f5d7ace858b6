//! Answers device-initiated interaction requests.
//!
//! Each request the device sends mid-operation must be met with exactly one
//! acknowledgement or `Cancel`, or the device stalls waiting for it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::handler::{CancelAction, InteractionHandler};
use crate::messages::{
    ButtonAck, ButtonRequest, ButtonRequestType, Cancel, CharacterAck, CharacterRequest, Failure,
    FailureType, Message, PassphraseAck, PinMatrixAck, PinMatrixRequestType, WordAck,
};

/// Words requested during recovery, as shown in the step prompt.
pub const RECOVERY_WORD_TOTAL: u32 = 24;

/// What a button confirmation is for. Selects the prompt shown while the
/// device waits for a physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationPurpose {
    TransactionOutputs,
    TransactionFee,
    SignMessage,
    Address,
    ChangePin,
    HomeScreen,
    Label,
    RemovePin,
    Passphrase,
    Generic,
}

impl ConfirmationPurpose {
    pub fn from_button_code(code: Option<i32>) -> Self {
        match code.and_then(ButtonRequestType::from_i32) {
            Some(ButtonRequestType::ConfirmOutput) => Self::TransactionOutputs,
            Some(ButtonRequestType::SignTx) => Self::TransactionFee,
            Some(ButtonRequestType::ProtectCall) => Self::SignMessage,
            Some(ButtonRequestType::Address) => Self::Address,
            _ => Self::Generic,
        }
    }

    pub fn prompt(self, device: &str) -> String {
        match self {
            Self::TransactionOutputs => {
                format!("Confirm transaction outputs on {} device to continue", device)
            }
            Self::TransactionFee => format!("Confirm transaction fee on {} device to continue", device),
            Self::SignMessage => format!("Confirm message to sign on {} device to continue", device),
            Self::Address => format!("Confirm address on {} device to continue", device),
            Self::ChangePin => format!("Confirm PIN change on {} device to continue", device),
            Self::HomeScreen => {
                format!("Confirm home screen change on {} device to continue", device)
            }
            Self::Label => format!("Confirm label change on {} device to continue", device),
            Self::RemovePin => format!("Confirm removal of PIN on {} device to continue", device),
            Self::Passphrase => format!("Confirm on {} device to continue", device),
            Self::Generic => format!("Check {} device to continue", device),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPurpose {
    Current,
    NewFirst,
    NewSecond,
    Generic,
}

impl PinPurpose {
    pub fn from_request_type(r#type: Option<i32>) -> Self {
        match r#type.and_then(PinMatrixRequestType::from_i32) {
            Some(PinMatrixRequestType::Current) => Self::Current,
            Some(PinMatrixRequestType::NewFirst) => Self::NewFirst,
            Some(PinMatrixRequestType::NewSecond) => Self::NewSecond,
            None => Self::Generic,
        }
    }

    pub fn prompt(self, device: &str) -> String {
        match self {
            Self::Current => format!("Enter your current {} PIN:", device),
            Self::NewFirst => format!("Enter a new {} PIN:", device),
            Self::NewSecond => format!(
                "Please re-enter your new {} PIN.\nNote the numbers have been shuffled!",
                device
            ),
            Self::Generic => format!("Please enter {} PIN", device),
        }
    }
}

/// A device message that needs an answer from the user before the device
/// will continue.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionRequest {
    Failure(Failure),
    ButtonConfirmation(ButtonRequest),
    PinEntry(PinPurpose),
    PassphraseEntry,
    WordEntry,
    CharacterEntry(CharacterRequest),
}

impl InteractionRequest {
    /// Splits off interaction requests; any other message is terminal for the
    /// current call and is handed back unchanged.
    pub fn classify(msg: Message) -> Result<Self, Message> {
        Ok(match msg {
            Message::Failure(x) => Self::Failure(x),
            Message::ButtonRequest(x) => Self::ButtonConfirmation(x),
            Message::PinMatrixRequest(x) => Self::PinEntry(PinPurpose::from_request_type(x.r#type)),
            Message::PassphraseRequest(_) => Self::PassphraseEntry,
            Message::WordRequest(_) => Self::WordEntry,
            Message::CharacterRequest(x) => Self::CharacterEntry(x),
            other => return Err(other),
        })
    }
}

/// What to do after a request has been handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Write this message to the device and keep reading.
    Reply(Message),
    /// The user cancelled; unwind without reporting an error.
    Cancelled,
}

fn is_cancellation(failure: &Failure) -> bool {
    matches!(
        failure.code.and_then(FailureType::from_i32),
        Some(FailureType::PinCancelled) | Some(FailureType::ActionCancelled)
    )
}

pub struct CallbackDispatcher {
    handler: Arc<dyn InteractionHandler>,
    device: String,
    step: u32,
}

impl CallbackDispatcher {
    pub fn new(handler: Arc<dyn InteractionHandler>, device: impl Into<String>) -> Self {
        Self {
            handler,
            device: device.into(),
            step: 0,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Recovery words answered since the last [`reset_step`](Self::reset_step).
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn reset_step(&mut self) {
        self.step = 0;
    }

    /// `message_override`, when set, decides the button prompt regardless of
    /// the request's own code.
    pub fn dispatch(
        &mut self,
        request: InteractionRequest,
        message_override: Option<ConfirmationPurpose>,
        cancel: &CancelAction,
    ) -> SessionResult<Dispatch> {
        let reply: Message = match request {
            InteractionRequest::Failure(failure) => {
                if is_cancellation(&failure) {
                    debug!("device reported user cancellation ({:?})", failure.code);
                    return Ok(Dispatch::Cancelled);
                }
                return Err(SessionError::Device {
                    code: failure.code.and_then(FailureType::from_i32),
                    message: failure.message.unwrap_or_default(),
                });
            }
            InteractionRequest::ButtonConfirmation(req) => {
                let purpose = message_override
                    .unwrap_or_else(|| ConfirmationPurpose::from_button_code(req.code));
                info!("ButtonRequest code {:?}, prompting as {:?}", req.code, purpose);
                self.handler.show_message(&purpose.prompt(&self.device), cancel.clone());
                ButtonAck {}.into()
            }
            InteractionRequest::PinEntry(purpose) => {
                match self.handler.get_pin(&purpose.prompt(&self.device)) {
                    Some(pin) if !pin.is_empty() => PinMatrixAck { pin }.into(),
                    _ => {
                        debug!("PIN entry declined");
                        Cancel {}.into()
                    }
                }
            }
            InteractionRequest::PassphraseEntry => {
                let prompt = format!("Please enter your {} passphrase", self.device);
                match self.handler.get_passphrase(&prompt) {
                    Some(passphrase) => PassphraseAck { passphrase }.into(),
                    None => {
                        debug!("passphrase entry declined");
                        Cancel {}.into()
                    }
                }
            }
            InteractionRequest::WordEntry => {
                self.step += 1;
                if self.step > RECOVERY_WORD_TOTAL {
                    warn!("recovery asked for word {} of {}", self.step, RECOVERY_WORD_TOTAL);
                }
                let prompt = format!(
                    "Step {}/{}.  Enter seed word as explained on your {}:",
                    self.step, RECOVERY_WORD_TOTAL, self.device
                );
                // A Cancel here would wedge the device; always answer.
                WordAck { word: self.handler.get_word(&prompt) }.into()
            }
            InteractionRequest::CharacterEntry(req) => match self.handler.get_char(&req) {
                Some(input) if !input.is_empty() => CharacterAck::from(input).into(),
                _ => {
                    debug!("character entry declined");
                    Cancel {}.into()
                }
            },
        };

        Ok(Dispatch::Reply(reply))
    }
}
