//! Protobuf definitions for the subset of the device protocol this crate speaks.
//! Field tags follow the device's `messages.proto` / `types.proto`.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FailureType {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    PinMismatch = 12,
    FirmwareError = 99,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ButtonRequestType {
    Other = 1,
    FeeOverThreshold = 2,
    ConfirmOutput = 3,
    ResetDevice = 4,
    ConfirmWord = 5,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    FirmwareCheck = 9,
    Address = 10,
    PublicKey = 11,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PinMatrixRequestType {
    Current = 1,
    NewFirst = 2,
    NewSecond = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RequestType {
    TxInput = 0,
    TxOutput = 1,
    TxMeta = 2,
    TxFinished = 3,
    TxExtraData = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum InputScriptType {
    SpendAddress = 0,
    SpendMultisig = 1,
    External = 2,
    SpendWitness = 3,
    SpendP2shWitness = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OutputScriptType {
    PayToAddress = 0,
    PayToScriptHash = 1,
    PayToMultisig = 2,
    PayToOpReturn = 3,
    PayToWitness = 4,
    PayToP2shWitness = 5,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HdNodeType {
    #[prost(uint32, required, tag = "1")]
    pub depth: u32,
    #[prost(uint32, required, tag = "2")]
    pub fingerprint: u32,
    #[prost(uint32, required, tag = "3")]
    pub child_num: u32,
    #[prost(bytes = "vec", required, tag = "4")]
    pub chain_code: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub private_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub public_key: Option<Vec<u8>>,
}

// Core device messages

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Initialize {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetFeatures {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Features {
    #[prost(string, optional, tag = "1")]
    pub vendor: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    pub major_version: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub minor_version: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub patch_version: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub bootloader_mode: Option<bool>,
    #[prost(string, optional, tag = "6")]
    pub device_id: Option<String>,
    #[prost(bool, optional, tag = "7")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "9")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "10")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "12")]
    pub initialized: Option<bool>,
    #[prost(bytes = "vec", optional, tag = "13")]
    pub revision: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "14")]
    pub bootloader_hash: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "15")]
    pub imported: Option<bool>,
    #[prost(bool, optional, tag = "16")]
    pub pin_cached: Option<bool>,
    #[prost(bool, optional, tag = "17")]
    pub passphrase_cached: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Success {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Failure {
    #[prost(enumeration = "FailureType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

// Device management

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangePin {
    #[prost(bool, optional, tag = "1")]
    pub remove: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WipeDevice {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplySettings {
    #[prost(string, optional, tag = "1")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub use_passphrase: Option<bool>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub homescreen: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClearSession {}

// Entropy

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntropyRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntropyAck {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub entropy: Option<Vec<u8>>,
}

// Recovery and setup

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadDevice {
    #[prost(string, optional, tag = "1")]
    pub mnemonic: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub node: Option<HdNodeType>,
    #[prost(string, optional, tag = "3")]
    pub pin: Option<String>,
    #[prost(bool, optional, tag = "4")]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "5")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "7")]
    pub skip_checksum: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResetDevice {
    #[prost(bool, optional, tag = "1")]
    pub display_random: Option<bool>,
    #[prost(uint32, optional, tag = "2")]
    pub strength: Option<u32>,
    #[prost(bool, optional, tag = "3")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub pin_protection: Option<bool>,
    #[prost(string, optional, tag = "5")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub label: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecoveryDevice {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub pin_protection: Option<bool>,
    #[prost(string, optional, tag = "4")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "6")]
    pub enforce_wordlist: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WordRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WordAck {
    #[prost(string, required, tag = "1")]
    pub word: String,
}

// PIN and passphrase

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PinMatrixRequest {
    #[prost(enumeration = "PinMatrixRequestType", optional, tag = "1")]
    pub r#type: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PinMatrixAck {
    #[prost(string, required, tag = "1")]
    pub pin: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PassphraseRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PassphraseAck {
    #[prost(string, required, tag = "1")]
    pub passphrase: String,
}

// User interaction

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ButtonRequest {
    #[prost(enumeration = "ButtonRequestType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub data: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ButtonAck {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CharacterRequest {
    #[prost(uint32, required, tag = "1")]
    pub word_pos: u32,
    #[prost(uint32, required, tag = "2")]
    pub character_pos: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CharacterAck {
    #[prost(string, optional, tag = "1")]
    pub character: Option<String>,
    #[prost(bool, optional, tag = "2")]
    pub delete: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub done: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cancel {}

// Bitcoin-specific messages

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPublicKey {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, optional, tag = "2")]
    pub ecdsa_curve_name: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub show_display: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublicKey {
    #[prost(message, optional, tag = "1")]
    pub node: Option<HdNodeType>,
    #[prost(string, optional, tag = "2")]
    pub xpub: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAddress {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, optional, tag = "2")]
    pub coin_name: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub show_display: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Address {
    #[prost(string, required, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignMessage {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub message: Vec<u8>,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageSignature {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DecryptMessage {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub nonce: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub message: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub hmac: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DecryptedMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub message: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub address: Option<String>,
}

// Transaction signing

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignTx {
    #[prost(uint32, required, tag = "1")]
    pub outputs_count: u32,
    #[prost(uint32, required, tag = "2")]
    pub inputs_count: u32,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
    #[prost(uint32, optional, tag = "4")]
    pub version: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub lock_time: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequestDetailsType {
    #[prost(uint32, optional, tag = "1")]
    pub request_index: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub tx_hash: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequestSerializedType {
    #[prost(uint32, optional, tag = "1")]
    pub signature_index: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub serialized_tx: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequest {
    #[prost(enumeration = "RequestType", optional, tag = "1")]
    pub request_type: Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub details: Option<TxRequestDetailsType>,
    #[prost(message, optional, tag = "3")]
    pub serialized: Option<TxRequestSerializedType>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxInputType {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub prev_hash: Vec<u8>,
    #[prost(uint32, required, tag = "3")]
    pub prev_index: u32,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub script_sig: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "5")]
    pub sequence: Option<u32>,
    #[prost(enumeration = "InputScriptType", optional, tag = "6")]
    pub script_type: Option<i32>,
    #[prost(uint64, optional, tag = "8")]
    pub amount: Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutputType {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(uint32, repeated, packed = "false", tag = "2")]
    pub address_n: Vec<u32>,
    #[prost(uint64, required, tag = "3")]
    pub amount: u64,
    #[prost(enumeration = "OutputScriptType", required, tag = "4")]
    pub script_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutputBinType {
    #[prost(uint64, required, tag = "1")]
    pub amount: u64,
    #[prost(bytes = "vec", required, tag = "2")]
    pub script_pubkey: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionType {
    #[prost(uint32, optional, tag = "1")]
    pub version: Option<u32>,
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<TxInputType>,
    #[prost(message, repeated, tag = "3")]
    pub bin_outputs: Vec<TxOutputBinType>,
    #[prost(uint32, optional, tag = "4")]
    pub lock_time: Option<u32>,
    #[prost(message, repeated, tag = "5")]
    pub outputs: Vec<TxOutputType>,
    #[prost(uint32, optional, tag = "6")]
    pub inputs_cnt: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub outputs_cnt: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAck {
    #[prost(message, optional, tag = "1")]
    pub tx: Option<TransactionType>,
}
