mod encoding;
mod macros;
mod protos;

pub use encoding::HEADER_LEN;
pub use protos::*;

use macros::device_message;

device_message!(
    // Core device messages
    Initialize = 0,
    Success = 2,
    Failure = 3,
    GetFeatures = 55,
    Features = 17,

    // Device management
    ChangePin = 4,
    WipeDevice = 5,
    ApplySettings = 25,
    ClearSession = 24,

    // Entropy
    EntropyRequest = 35,
    EntropyAck = 36,

    // Recovery and setup
    LoadDevice = 13,
    ResetDevice = 14,
    RecoveryDevice = 45,
    WordRequest = 46,
    WordAck = 47,

    // PIN and passphrase
    PinMatrixRequest = 18,
    PinMatrixAck = 19,
    PassphraseRequest = 41,
    PassphraseAck = 42,

    // User interaction
    ButtonRequest = 26,
    ButtonAck = 27,
    CharacterRequest = 80,
    CharacterAck = 81,
    Cancel = 20,

    // Bitcoin-specific messages
    GetPublicKey = 11,
    PublicKey = 12,
    GetAddress = 29,
    Address = 30,
    SignTx = 15,
    TxRequest = 21,
    TxAck = 22,
    SignMessage = 38,
    MessageSignature = 40,

    // Decryption
    DecryptMessage = 51,
    DecryptedMessage = 52,
);
