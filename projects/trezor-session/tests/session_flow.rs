use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mockall::mock;

use trezor_session::messages::{
    Address, ApplySettings, ButtonRequest, ButtonRequestType, CharacterRequest, EntropyRequest,
    Failure, FailureType, Features, Message, MessageType, PassphraseRequest, PinMatrixRequest,
    PinMatrixRequestType, RequestType, Success, TxAck, TxRequest, TxRequestSerializedType,
    WordRequest,
};
use trezor_session::{
    CancelAction, CharacterInput, DeviceSession, InteractionHandler, Outcome, SessionConfig,
    SessionError, SessionErrorKind, SessionResult, Transport, TransportError,
};

mock! {
    pub Handler {}

    impl InteractionHandler for Handler {
        fn show_message(&self, text: &str, cancel: CancelAction);
        fn get_pin(&self, prompt: &str) -> Option<String>;
        fn get_passphrase(&self, prompt: &str) -> Option<String>;
        fn get_word(&self, prompt: &str) -> String;
        fn get_char(&self, request: &CharacterRequest) -> Option<CharacterInput>;
        fn finished(&self);
    }
}

/// In-memory device: answers each read with the next scripted message and
/// records every frame written to it.
#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Message>>,
    written: Mutex<Vec<Message>>,
    fail_clear_session: bool,
}

impl ScriptedTransport {
    fn new(responses: impl IntoIterator<Item = Message>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        })
    }

    fn push(&self, responses: impl IntoIterator<Item = Message>) {
        self.responses.lock().unwrap().extend(responses);
    }

    fn written_types(&self) -> Vec<MessageType> {
        self.written.lock().unwrap().iter().map(Message::message_type).collect()
    }

    fn take_written(&self) -> Vec<Message> {
        std::mem::take(&mut *self.written.lock().unwrap())
    }
}

impl Transport for ScriptedTransport {
    fn write(&self, msg: &[u8]) -> Result<usize, TransportError> {
        let decoded = Message::decode(msg).map_err(|e| TransportError::Other(e.to_string()))?;
        if self.fail_clear_session && decoded.message_type() == MessageType::ClearSession {
            return Err(TransportError::Disconnected);
        }
        self.written.lock().unwrap().push(decoded);
        Ok(msg.len())
    }

    fn read(&self, buf: &mut Vec<u8>) -> Result<(), TransportError> {
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(TransportError::Disconnected)?;
        next.encode(buf).map_err(|e| TransportError::Other(e.to_string()))
    }

    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn features(passphrase_protection: bool) -> Message {
    Features {
        vendor: Some("bitcointrezor.com".to_owned()),
        major_version: Some(1),
        minor_version: Some(9),
        patch_version: Some(4),
        device_id: Some("D3A1".to_owned()),
        label: Some("Satoshi".to_owned()),
        initialized: Some(true),
        passphrase_protection: Some(passphrase_protection),
        ..Default::default()
    }
    .into()
}

fn success() -> Message {
    Success { message: None }.into()
}

fn failure(code: FailureType, text: &str) -> Message {
    Failure {
        code: Some(code as i32),
        message: Some(text.to_owned()),
    }
    .into()
}

fn button(code: ButtonRequestType) -> Message {
    ButtonRequest {
        code: Some(code as i32),
        data: None,
    }
    .into()
}

/// Opens a session over `transport`; the handshake response is queued here.
fn open(transport: &Arc<ScriptedTransport>, handler: MockHandler, passphrase: bool) -> DeviceSession {
    init_logging();
    transport.push([features(passphrase)]);
    let session = DeviceSession::open(transport.clone(), Arc::new(handler), SessionConfig::default())
        .expect("handshake");
    transport.take_written();
    session
}

fn handler_finishing_once() -> MockHandler {
    let mut handler = MockHandler::new();
    handler.expect_finished().times(1).return_const(());
    handler
}

#[test]
fn test_open_reads_features() {
    let transport = ScriptedTransport::new([]);
    let session = open(&transport, MockHandler::new(), false);

    assert_eq!(session.label(), "Satoshi");
    assert_eq!(session.to_string(), "Satoshi/D3A1");
    assert_eq!(session.device(), "Trezor");
    assert_eq!(session.firmware_version(), (1, 9, 4));
    assert!(session.at_least_version(1, 9, 0).is_ge());
    assert!(session.at_least_version(1, 10, 0).is_lt());
    assert!(session.is_initialized());
}

#[test]
fn test_open_fails_on_device_failure() {
    let transport = ScriptedTransport::new([failure(FailureType::FirmwareError, "bootloader")]);
    let err = DeviceSession::open(transport, Arc::new(MockHandler::new()), SessionConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), SessionErrorKind::Device);
    assert_eq!(err.to_string(), "bootloader");
}

#[test]
fn test_finished_once_on_success() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([Address { address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_owned() }.into()]);

    let outcome = session.get_address("Bitcoin", &[0x8000_002c, 0x8000_0000], false).unwrap();

    assert_eq!(outcome, Outcome::Done("1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_owned()));
    assert_eq!(transport.written_types(), vec![MessageType::GetAddress]);
}

#[test]
fn test_finished_once_on_error() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([failure(FailureType::ProcessError, "Invalid signature")]);

    let err = session.sign_message("Bitcoin", &[0], b"hello").unwrap_err();

    assert!(matches!(
        err,
        SessionError::Device { code: Some(FailureType::ProcessError), .. }
    ));
    assert_eq!(err.to_string(), "Invalid signature");
}

#[test]
fn test_finished_once_on_transport_loss() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);

    let err = session.get_public_node(&[0]).unwrap_err();

    assert_eq!(err.kind(), SessionErrorKind::Transport);
}

#[test]
fn test_cancellation_failure_is_not_an_error() {
    for code in [FailureType::ActionCancelled, FailureType::PinCancelled] {
        let transport = ScriptedTransport::new([]);
        let mut session = open(&transport, handler_finishing_once(), false);
        transport.push([failure(code, "Cancelled")]);

        let outcome = session.wipe_device().unwrap();

        assert!(outcome.is_cancelled());
    }
}

#[test]
fn test_declined_pin_sends_cancel_and_no_ack() {
    let transport = ScriptedTransport::new([]);
    let mut handler = handler_finishing_once();
    handler
        .expect_get_pin()
        .withf(|prompt| prompt == "Please enter Trezor PIN")
        .times(1)
        .returning(|_| None);
    let mut session = open(&transport, handler, false);
    transport.push([
        PinMatrixRequest { r#type: None }.into(),
        failure(FailureType::PinCancelled, "PIN cancelled"),
    ]);

    let outcome = session.get_address("Bitcoin", &[0], false).unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(
        transport.written_types(),
        vec![MessageType::GetAddress, MessageType::Cancel]
    );
}

#[test]
fn test_pin_and_passphrase_are_forwarded() {
    let transport = ScriptedTransport::new([]);
    let mut handler = handler_finishing_once();
    handler
        .expect_get_pin()
        .withf(|prompt| prompt == "Enter your current Trezor PIN:")
        .times(1)
        .returning(|_| Some("1234".to_owned()));
    handler
        .expect_get_passphrase()
        .withf(|prompt| prompt == "Please enter your Trezor passphrase")
        .times(1)
        .returning(|_| Some(String::new()));
    let mut session = open(&transport, handler, false);
    transport.push([
        PinMatrixRequest { r#type: Some(PinMatrixRequestType::Current as i32) }.into(),
        PassphraseRequest {}.into(),
        Address { address: "mxyz".to_owned() }.into(),
    ]);

    let outcome = session.get_address("Testnet", &[0], false).unwrap();

    assert_eq!(outcome.done().as_deref(), Some("mxyz"));
    assert_eq!(
        transport.written_types(),
        vec![MessageType::GetAddress, MessageType::PinMatrixAck, MessageType::PassphraseAck]
    );
}

#[test]
fn test_toggle_passphrase_uses_override_then_clears_it() {
    let transport = ScriptedTransport::new([]);
    let mut handler = handler_finishing_once();
    handler
        .expect_show_message()
        .withf(|text, _| text == "Confirm on Trezor device to continue")
        .times(1)
        .return_const(());
    let mut session = open(&transport, handler, false);
    transport.push([button(ButtonRequestType::ProtectCall), success(), features(true)]);

    let outcome = session.toggle_passphrase().unwrap();

    assert_eq!(outcome, Outcome::Done(()));
    assert_eq!(session.message_override(), None);
    assert!(session.features().passphrase_protection());

    let written = transport.take_written();
    assert_eq!(
        written[0],
        Message::from(ApplySettings {
            use_passphrase: Some(true),
            ..Default::default()
        })
    );
    assert_eq!(written[1].message_type(), MessageType::ButtonAck);
    assert_eq!(written[2].message_type(), MessageType::GetFeatures);
}

#[test]
fn test_override_cleared_after_failure() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([failure(FailureType::DataError, "Label too long")]);

    let err = session.change_label("a very long label").unwrap_err();

    assert_eq!(err.to_string(), "Label too long");
    assert_eq!(session.message_override(), None);
}

#[test]
fn test_toggle_passphrase_failure_clears_override() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([failure(FailureType::ProcessError, "Passphrase change refused")]);

    let err = session.toggle_passphrase().unwrap_err();

    assert_eq!(err.to_string(), "Passphrase change refused");
    assert_eq!(session.message_override(), None);
    assert!(!session.features().passphrase_protection());
    assert_eq!(transport.written_types(), vec![MessageType::ApplySettings]);
}

#[test]
fn test_failed_refresh_keeps_operation_success() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([success(), failure(FailureType::UnexpectedMessage, "Unknown message")]);

    let outcome = session.change_label("new").unwrap();

    assert_eq!(outcome, Outcome::Done(()));
    assert_eq!(session.label(), "Satoshi");
    assert_eq!(session.message_override(), None);
    assert_eq!(
        transport.written_types(),
        vec![MessageType::ApplySettings, MessageType::GetFeatures]
    );
}

#[test]
fn test_refresh_features_keeps_device_text() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, MockHandler::new(), false);
    transport.push([failure(FailureType::UnexpectedMessage, "Unknown message")]);

    let err = session.refresh_features().unwrap_err();

    assert!(matches!(
        err,
        SessionError::Device { code: Some(FailureType::UnexpectedMessage), .. }
    ));
    assert_eq!(err.to_string(), "Unknown message");
}

#[test]
fn test_refresh_features_answers_interaction_requests() {
    let transport = ScriptedTransport::new([]);
    let mut handler = MockHandler::new();
    handler
        .expect_show_message()
        .withf(|text, _| text == "Check Trezor device to continue")
        .times(1)
        .return_const(());
    let mut session = open(&transport, handler, false);
    transport.push([button(ButtonRequestType::Other), features(true)]);

    session.refresh_features().unwrap();

    assert!(session.features().passphrase_protection());
    assert_eq!(
        transport.written_types(),
        vec![MessageType::GetFeatures, MessageType::ButtonAck]
    );
}

/// Handler whose confirmation dialog crashes, as a broken UI would.
#[derive(Default)]
struct CrashingHandler {
    finished: AtomicUsize,
}

impl InteractionHandler for CrashingHandler {
    fn show_message(&self, _text: &str, _cancel: CancelAction) {
        panic!("confirmation dialog crashed");
    }

    fn get_pin(&self, _prompt: &str) -> Option<String> {
        None
    }

    fn get_passphrase(&self, _prompt: &str) -> Option<String> {
        None
    }

    fn get_word(&self, _prompt: &str) -> String {
        String::new()
    }

    fn get_char(&self, _request: &CharacterRequest) -> Option<CharacterInput> {
        None
    }

    fn finished(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_override_cleared_when_handler_panics() {
    init_logging();
    let handler = Arc::new(CrashingHandler::default());
    let transport = ScriptedTransport::new([features(false)]);
    let mut session = DeviceSession::open(transport.clone(), handler.clone(), SessionConfig::default())
        .expect("handshake");
    transport.push([button(ButtonRequestType::ProtectCall)]);

    let result = panic::catch_unwind(AssertUnwindSafe(|| session.change_label("new")));

    assert!(result.is_err());
    assert_eq!(session.message_override(), None);
    assert_eq!(handler.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_recovery_numbers_words_from_one() {
    let transport = ScriptedTransport::new([]);
    let mut handler = MockHandler::new();
    handler.expect_finished().times(2).return_const(());
    // Each step prompt must appear once per recovery.
    for step in 1..=24 {
        let expected = format!("Step {}/24.  Enter seed word as explained on your Trezor:", step);
        handler
            .expect_get_word()
            .withf(move |prompt| prompt == expected)
            .times(2)
            .returning(move |_| format!("word{}", step));
    }
    let mut session = open(&transport, handler, false);

    for _ in 0..2 {
        transport.push((0..24).map(|_| Message::from(WordRequest {})));
        transport.push([success(), features(false)]);

        let outcome = session.recovery_device(24, false, false, "Satoshi").unwrap();

        assert_eq!(outcome, Outcome::Done(()));
        assert_eq!(session.step_counter(), 24);
    }
}

#[test]
fn test_declined_character_entry_sends_cancel() {
    let transport = ScriptedTransport::new([]);
    let mut handler = handler_finishing_once();
    handler
        .expect_get_char()
        .withf(|request| request.word_pos == 0 && request.character_pos == 0)
        .times(1)
        .returning(|_| Some(CharacterInput::default()));
    let mut session = open(&transport, handler, false);
    transport.push([
        CharacterRequest { word_pos: 0, character_pos: 0 }.into(),
        failure(FailureType::ActionCancelled, "Cancelled"),
    ]);

    let outcome = session.recovery_device(12, false, false, "").unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(
        transport.written_types(),
        vec![MessageType::RecoveryDevice, MessageType::Cancel]
    );
}

#[test]
fn test_reset_device_supplies_entropy() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([EntropyRequest {}.into(), success(), features(false)]);

    let outcome = session.reset_device(256, false, true, "New").unwrap();

    assert_eq!(outcome, Outcome::Done(()));
    let written = transport.take_written();
    match &written[1] {
        Message::EntropyAck(ack) => assert_eq!(ack.entropy.as_ref().map(Vec::len), Some(32)),
        other => panic!("expected EntropyAck, got {:?}", other.message_type()),
    }
}

#[test]
fn test_sign_tx_collects_signatures() {
    let transport = ScriptedTransport::new([]);
    let mut handler = handler_finishing_once();
    handler.expect_show_message().times(2).return_const(());
    let mut session = open(&transport, handler, false);
    transport.push([
        TxRequest {
            request_type: Some(RequestType::TxInput as i32),
            ..Default::default()
        }
        .into(),
        button(ButtonRequestType::ConfirmOutput),
        button(ButtonRequestType::SignTx),
        TxRequest {
            request_type: Some(RequestType::TxOutput as i32),
            serialized: Some(TxRequestSerializedType {
                signature_index: Some(0),
                signature: Some(vec![0x30, 0x44]),
                serialized_tx: Some(vec![0x01, 0x00]),
            }),
            ..Default::default()
        }
        .into(),
        TxRequest {
            request_type: Some(RequestType::TxFinished as i32),
            serialized: Some(TxRequestSerializedType {
                serialized_tx: Some(vec![0x00, 0x00]),
                ..Default::default()
            }),
            ..Default::default()
        }
        .into(),
    ]);

    let mut acks = 0;
    let mut source = |_: &TxRequest| -> SessionResult<TxAck> {
        acks += 1;
        Ok(TxAck::default())
    };
    let signed = session
        .sign_tx("Bitcoin", 1, 1, &mut source)
        .unwrap()
        .done()
        .expect("signed");

    assert_eq!(acks, 2);
    assert_eq!(signed.signatures, vec![Some(vec![0x30, 0x44])]);
    assert_eq!(signed.serialized_tx, vec![0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn test_sign_tx_rejects_out_of_range_signature() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([TxRequest {
        request_type: Some(RequestType::TxInput as i32),
        serialized: Some(TxRequestSerializedType {
            signature_index: Some(5),
            signature: Some(vec![0x30]),
            serialized_tx: None,
        }),
        ..Default::default()
    }
    .into()]);

    let mut source = |_: &TxRequest| -> SessionResult<TxAck> { Ok(TxAck::default()) };
    let err = session.sign_tx("Bitcoin", 1, 1, &mut source).unwrap_err();

    assert!(matches!(err, SessionError::MalformedResponse(_)));
}

#[test]
fn test_sign_tx_signatures_grow_with_signed_inputs() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([TxRequest {
        request_type: Some(RequestType::TxFinished as i32),
        serialized: Some(TxRequestSerializedType {
            signature_index: Some(1),
            signature: Some(vec![0x30, 0x45]),
            serialized_tx: None,
        }),
        ..Default::default()
    }
    .into()]);

    let mut source = |_: &TxRequest| -> SessionResult<TxAck> { Ok(TxAck::default()) };
    let signed = session
        .sign_tx("Bitcoin", 1000, 1, &mut source)
        .unwrap()
        .done()
        .expect("signed");

    assert_eq!(signed.signatures, vec![None, Some(vec![0x30, 0x45])]);
}

#[test]
fn test_address_from_derivation_uses_configured_coin() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, handler_finishing_once(), false);
    transport.push([Address { address: "1abc".to_owned() }.into()]);

    let outcome = session.address_from_derivation("m/44'/0'/0'/0/0").unwrap();

    assert_eq!(outcome.done().as_deref(), Some("1abc"));
    match &transport.take_written()[0] {
        Message::GetAddress(req) => {
            assert_eq!(req.coin_name.as_deref(), Some("Bitcoin"));
            assert_eq!(req.address_n, vec![0x8000_002c, 0x8000_0000, 0x8000_0000, 0, 0]);
        }
        other => panic!("expected GetAddress, got {:?}", other.message_type()),
    }
}

#[test]
fn test_invalid_path_is_rejected_before_io() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, MockHandler::new(), false);

    let err = session.address_from_derivation("m/44x").unwrap_err();

    assert_eq!(err.kind(), SessionErrorKind::Validation);
    assert!(transport.written_types().is_empty());
}

#[test]
fn test_cancel_writes_cancel_frame() {
    let transport = ScriptedTransport::new([]);
    let session = open(&transport, MockHandler::new(), false);

    session.cancel_action().invoke();

    assert_eq!(transport.written_types(), vec![MessageType::Cancel]);
}

#[test]
fn test_close_ignores_clear_session_failure() {
    init_logging();
    let transport = Arc::new(ScriptedTransport {
        responses: Mutex::new(VecDeque::from([features(false)])),
        fail_clear_session: true,
        ..Default::default()
    });
    let session = DeviceSession::open(transport.clone(), Arc::new(MockHandler::new()), SessionConfig::default())
        .expect("handshake");

    session.close();

    assert_eq!(transport.written_types(), vec![MessageType::Initialize]);
}

#[test]
fn test_clear_session_after_device_removed() {
    let transport = ScriptedTransport::new([]);
    let mut session = open(&transport, MockHandler::new(), false);

    // No scripted response: the read fails as if the device were unplugged.
    session.clear_session();

    assert_eq!(transport.written_types(), vec![MessageType::ClearSession]);
}
