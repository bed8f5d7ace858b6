use std::cmp::Ordering;

use base58::FromBase58;
use semver::Version;
use sha2::{Digest, Sha256};

use crate::error::{SessionError, SessionResult};
use crate::messages::HdNodeType;

/// BIP-32 hardened-child flag.
pub const HARDENED: u32 = 0x8000_0000;

const XPRV_VERSIONS: [[u8; 4]; 2] = [
    [0x04, 0x88, 0xAD, 0xE4], // xprv
    [0x04, 0x35, 0x83, 0x94], // tprv
];
const XPRV_PAYLOAD_LEN: usize = 78;

/// Expand a slash-separated derivation path into child indices.
///
/// The first segment is a label (usually `m`) and is dropped. A trailing `'`
/// or a leading `-` hardens a component: `"m/0/1'/-2"` gives
/// `[0, 0x80000001, 0x80000002]`.
pub fn expand_derivation_path(path: &str) -> SessionResult<Vec<u32>> {
    let mut result = Vec::new();

    for component in path.split('/').skip(1) {
        let mut hardened = false;
        let mut number_str = component.to_string();
        if number_str.ends_with('\'') {
            number_str = number_str.replace('\'', "");
            hardened = true;
        }
        if number_str.starts_with('-') {
            hardened = true;
        }

        let number: i64 = number_str
            .parse()
            .map_err(|_| SessionError::InvalidPath(format!("invalid component '{}' in '{}'", component, path)))?;
        let index = u32::try_from(number.unsigned_abs())
            .map_err(|_| SessionError::InvalidPath(format!("component '{}' out of range in '{}'", component, path)))?;

        result.push(if hardened { index | HARDENED } else { index });
    }

    Ok(result)
}

/// Three-way comparison of two `(major, minor, patch)` firmware versions.
pub fn compare_versions(current: (u32, u32, u32), required: (u32, u32, u32)) -> Ordering {
    let as_version = |(major, minor, patch): (u32, u32, u32)| {
        Version::new(major.into(), minor.into(), patch.into())
    };
    as_version(current).cmp(&as_version(required))
}

fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Decode a base58check `xprv`/`tprv` string into the node layout `LoadDevice`
/// expects.
pub fn decode_xprv(xprv: &str) -> SessionResult<HdNodeType> {
    let invalid = |reason: &str| SessionError::InvalidExtendedKey(reason.to_string());

    let data = xprv
        .from_base58()
        .map_err(|e| SessionError::InvalidExtendedKey(format!("bad base58: {:?}", e)))?;
    if data.len() != XPRV_PAYLOAD_LEN + 4 {
        return Err(invalid("wrong length"));
    }

    let (payload, checksum) = data.split_at(XPRV_PAYLOAD_LEN);
    if sha256d(payload)[..4] != *checksum {
        return Err(invalid("checksum mismatch"));
    }
    if !XPRV_VERSIONS.iter().any(|v| payload[..4] == v[..]) {
        return Err(invalid("unknown version prefix"));
    }
    if payload[45] != 0 {
        return Err(invalid("does not contain a private key"));
    }

    Ok(HdNodeType {
        depth: u32::from(payload[4]),
        fingerprint: u32::from_be_bytes([payload[5], payload[6], payload[7], payload[8]]),
        child_num: u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]),
        chain_code: payload[13..45].to_vec(),
        private_key: Some(payload[46..78].to_vec()),
        public_key: None,
    })
}
