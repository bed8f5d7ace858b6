//! Device operations. Each one runs inside [`DeviceSession::run_wrapped`],
//! so the interaction handler is told when it ends.

use rand::RngCore;
use tracing::{info, warn};

use crate::dispatcher::ConfirmationPurpose;
use crate::error::{Outcome, SessionError, SessionResult};
use crate::messages::{
    ApplySettings, ChangePin, DecryptMessage, DecryptedMessage, EntropyAck, GetAddress,
    GetPublicKey, LoadDevice, Message, MessageSignature, PublicKey, RecoveryDevice, RequestType,
    ResetDevice, SignMessage, SignTx, TxAck, TxRequest, WipeDevice,
};
use crate::session::DeviceSession;
use crate::utils;

const ENTROPY_LEN: usize = 32;

/// Supplies the previous-transaction and current-transaction data the device
/// asks for while signing.
pub trait TxAckSource {
    fn tx_ack(&mut self, request: &TxRequest) -> SessionResult<TxAck>;
}

impl<F> TxAckSource for F
where
    F: FnMut(&TxRequest) -> SessionResult<TxAck>,
{
    fn tx_ack(&mut self, request: &TxRequest) -> SessionResult<TxAck> {
        self(request)
    }
}

/// Signatures (indexed by input) and the serialized transaction streamed back
/// by the device. `signatures` only reaches as far as the highest input the
/// device signed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedTx {
    pub signatures: Vec<Option<Vec<u8>>>,
    pub serialized_tx: Vec<u8>,
}

fn expect_success(msg: Message) -> Option<()> {
    matches!(msg, Message::Success(_)).then_some(())
}

impl DeviceSession {
    /// See [`utils::expand_derivation_path`].
    pub fn expand_derivation_path(path: &str) -> SessionResult<Vec<u32>> {
        utils::expand_derivation_path(path)
    }

    /// Settings-changing operations leave the cached features stale. The
    /// operation has already succeeded on the device, so a failed refresh
    /// only leaves the old snapshot in place.
    fn refresh_after(&mut self, outcome: Outcome<()>) -> Outcome<()> {
        if !outcome.is_cancelled() {
            if let Err(e) = self.refresh_features() {
                warn!("keeping stale features after failed refresh: {}", e);
            }
        }
        outcome
    }

    pub fn apply_settings(&mut self, settings: ApplySettings) -> SessionResult<Outcome<()>> {
        self.run_wrapped("apply_settings", |s| {
            let outcome = s.call_expecting(settings.into(), expect_success)?;
            Ok(s.refresh_after(outcome))
        })
    }

    pub fn change_pin(&mut self, remove: bool) -> SessionResult<Outcome<()>> {
        self.run_wrapped("change_pin", |s| {
            let outcome = s.call_expecting(ChangePin { remove: Some(remove) }.into(), expect_success)?;
            Ok(s.refresh_after(outcome))
        })
    }

    pub fn decrypt_message(
        &mut self,
        path: &[u32],
        nonce: &[u8],
        message: &[u8],
        hmac: &[u8],
    ) -> SessionResult<Outcome<DecryptedMessage>> {
        let request = DecryptMessage {
            address_n: path.to_vec(),
            nonce: Some(nonce.to_vec()),
            message: Some(message.to_vec()),
            hmac: Some(hmac.to_vec()),
        };
        self.run_wrapped("decrypt_message", |s| {
            s.call_expecting(request.into(), |m| match m {
                Message::DecryptedMessage(x) => Some(x),
                _ => None,
            })
        })
    }

    pub fn get_address(
        &mut self,
        coin_name: &str,
        path: &[u32],
        show_display: bool,
    ) -> SessionResult<Outcome<String>> {
        let request = GetAddress {
            address_n: path.to_vec(),
            coin_name: Some(coin_name.to_string()),
            show_display: Some(show_display),
        };
        self.run_wrapped("get_address", |s| {
            s.call_expecting(request.into(), |m| match m {
                Message::Address(x) => Some(x.address),
                _ => None,
            })
        })
    }

    pub fn get_public_node(&mut self, path: &[u32]) -> SessionResult<Outcome<PublicKey>> {
        let request = GetPublicKey {
            address_n: path.to_vec(),
            ..Default::default()
        };
        self.run_wrapped("get_public_node", |s| {
            s.call_expecting(request.into(), |m| match m {
                Message::PublicKey(x) => Some(x),
                _ => None,
            })
        })
    }

    pub fn load_device_by_mnemonic(
        &mut self,
        mnemonic: &str,
        pin: Option<&str>,
        passphrase_protection: bool,
        label: &str,
    ) -> SessionResult<Outcome<()>> {
        let request = LoadDevice {
            mnemonic: Some(mnemonic.to_string()),
            pin: pin.map(str::to_string),
            passphrase_protection: Some(passphrase_protection),
            label: Some(label.to_string()),
            ..Default::default()
        };
        self.run_wrapped("load_device_by_mnemonic", |s| {
            let outcome = s.call_expecting(request.into(), expect_success)?;
            Ok(s.refresh_after(outcome))
        })
    }

    pub fn load_device_by_xprv(
        &mut self,
        xprv: &str,
        pin: Option<&str>,
        passphrase_protection: bool,
        label: &str,
    ) -> SessionResult<Outcome<()>> {
        self.run_wrapped("load_device_by_xprv", |s| {
            let request = LoadDevice {
                node: Some(utils::decode_xprv(xprv)?),
                pin: pin.map(str::to_string),
                passphrase_protection: Some(passphrase_protection),
                label: Some(label.to_string()),
                ..Default::default()
            };
            let outcome = s.call_expecting(request.into(), expect_success)?;
            Ok(s.refresh_after(outcome))
        })
    }

    /// Seed recovery. Word prompts are numbered from 1 for every new recovery.
    pub fn recovery_device(
        &mut self,
        word_count: u32,
        passphrase_protection: bool,
        pin_protection: bool,
        label: &str,
    ) -> SessionResult<Outcome<()>> {
        let request = RecoveryDevice {
            word_count: Some(word_count),
            passphrase_protection: Some(passphrase_protection),
            pin_protection: Some(pin_protection),
            label: Some(label.to_string()),
            ..Default::default()
        };
        self.run_wrapped("recovery_device", |s| {
            s.reset_recovery_step();
            let outcome = s.call_expecting(request.into(), expect_success)?;
            info!("recovery finished after {} words", s.step_counter());
            Ok(s.refresh_after(outcome))
        })
    }

    /// Generate a new seed on the device. Host entropy is supplied when the
    /// device asks for it.
    pub fn reset_device(
        &mut self,
        strength: u32,
        passphrase_protection: bool,
        pin_protection: bool,
        label: &str,
    ) -> SessionResult<Outcome<()>> {
        let request = ResetDevice {
            strength: Some(strength),
            passphrase_protection: Some(passphrase_protection),
            pin_protection: Some(pin_protection),
            label: Some(label.to_string()),
            ..Default::default()
        };
        self.run_wrapped("reset_device", |s| {
            let mut msg: Message = request.into();
            loop {
                match s.call(msg)? {
                    Outcome::Done(Message::EntropyRequest(_)) => {
                        let mut entropy = vec![0u8; ENTROPY_LEN];
                        rand::thread_rng().fill_bytes(&mut entropy);
                        msg = EntropyAck { entropy: Some(entropy) }.into();
                    }
                    Outcome::Done(Message::Success(_)) => break,
                    Outcome::Done(other) => {
                        return Err(SessionError::UnexpectedMessage(other.message_type()))
                    }
                    Outcome::Cancelled => return Ok(Outcome::Cancelled),
                }
            }
            Ok(s.refresh_after(Outcome::Done(())))
        })
    }

    pub fn sign_message(
        &mut self,
        coin_name: &str,
        path: &[u32],
        message: &[u8],
    ) -> SessionResult<Outcome<MessageSignature>> {
        let request = SignMessage {
            address_n: path.to_vec(),
            message: message.to_vec(),
            coin_name: Some(coin_name.to_string()),
        };
        self.run_wrapped("sign_message", |s| {
            s.call_expecting(request.into(), |m| match m {
                Message::MessageSignature(x) => Some(x),
                _ => None,
            })
        })
    }

    /// Drive the `TxRequest` exchange until the device reports it is done.
    pub fn sign_tx(
        &mut self,
        coin_name: &str,
        inputs_count: u32,
        outputs_count: u32,
        source: &mut dyn TxAckSource,
    ) -> SessionResult<Outcome<SignedTx>> {
        let request = SignTx {
            outputs_count,
            inputs_count,
            coin_name: Some(coin_name.to_string()),
            ..Default::default()
        };
        self.run_wrapped("sign_tx", |s| {
            let mut signed = SignedTx::default();
            let mut msg: Message = request.into();
            loop {
                let tx_request = match s.call_expecting(msg, |m| match m {
                    Message::TxRequest(x) => Some(x),
                    _ => None,
                })? {
                    Outcome::Done(x) => x,
                    Outcome::Cancelled => return Ok(Outcome::Cancelled),
                };

                if let Some(serialized) = &tx_request.serialized {
                    if let (Some(index), Some(signature)) =
                        (serialized.signature_index, &serialized.signature)
                    {
                        if index >= inputs_count {
                            return Err(SessionError::MalformedResponse(format!(
                                "signature for input {} of {}",
                                index, inputs_count
                            )));
                        }
                        let index = index as usize;
                        if signed.signatures.len() <= index {
                            signed.signatures.resize(index + 1, None);
                        }
                        signed.signatures[index] = Some(signature.clone());
                    }
                    if let Some(chunk) = &serialized.serialized_tx {
                        signed.serialized_tx.extend_from_slice(chunk);
                    }
                }

                if tx_request.request_type() == RequestType::TxFinished {
                    return Ok(Outcome::Done(signed));
                }
                msg = source.tx_ack(&tx_request)?.into();
            }
        })
    }

    pub fn wipe_device(&mut self) -> SessionResult<Outcome<()>> {
        self.run_wrapped("wipe_device", |s| {
            let outcome = s.call_expecting(WipeDevice {}.into(), expect_success)?;
            Ok(s.refresh_after(outcome))
        })
    }

    /// Flip passphrase protection relative to the current features.
    pub fn toggle_passphrase(&mut self) -> SessionResult<Outcome<()>> {
        self.with_override(ConfirmationPurpose::Passphrase, |s| {
            let enabled = !s.features().passphrase_protection();
            s.apply_settings(ApplySettings {
                use_passphrase: Some(enabled),
                ..Default::default()
            })
        })
    }

    pub fn change_label(&mut self, label: &str) -> SessionResult<Outcome<()>> {
        self.with_override(ConfirmationPurpose::Label, |s| {
            s.apply_settings(ApplySettings {
                label: Some(label.to_string()),
                ..Default::default()
            })
        })
    }

    pub fn change_homescreen(&mut self, homescreen: &[u8]) -> SessionResult<Outcome<()>> {
        self.with_override(ConfirmationPurpose::HomeScreen, |s| {
            s.apply_settings(ApplySettings {
                homescreen: Some(homescreen.to_vec()),
                ..Default::default()
            })
        })
    }

    /// Set or change the PIN, or remove it when `remove` is true.
    pub fn set_pin(&mut self, remove: bool) -> SessionResult<Outcome<()>> {
        let purpose = if remove {
            ConfirmationPurpose::RemovePin
        } else {
            ConfirmationPurpose::ChangePin
        };
        self.with_override(purpose, |s| s.change_pin(remove))
    }

    pub fn address_from_derivation(&mut self, derivation: &str) -> SessionResult<Outcome<String>> {
        let path = utils::expand_derivation_path(derivation)?;
        let coin_name = self.coin_name().to_string();
        self.get_address(&coin_name, &path, false)
    }

    pub fn first_address(&mut self, derivation: &str) -> SessionResult<Outcome<String>> {
        self.address_from_derivation(derivation)
    }
}
