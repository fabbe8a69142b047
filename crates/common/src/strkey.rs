//! Stellar strkey validation.
//!
//! Account and contract addresses are base32-encoded payloads consisting of a version byte,
//! a 32-byte key and a CRC16-XModem checksum (little-endian).

use base32::Alphabet;
use derive_more::{Display, Error};

/// Version byte of an account address (`G...`).
const VERSION_ACCOUNT_ID: u8 = 6 << 3;

/// Version byte of a contract address (`C...`).
const VERSION_CONTRACT: u8 = 2 << 3;

/// Length of a decoded strkey: version byte, key and checksum.
const DECODED_LEN: usize = 1 + 32 + 2;

/// Base32 alphabet used by strkeys.
const ALPHABET: Alphabet = Alphabet::Rfc4648 { padding: false };

/// Strkey decoding errors.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum StrKeyError {
    /// Value is not a valid unpadded base32 string.
    #[display(fmt = "invalid base32 encoding")]
    InvalidEncoding,

    /// Decoded payload has an unexpected length.
    #[display(fmt = "invalid strkey length: {}", _0)]
    InvalidLength(#[error(ignore)] usize),

    /// Version byte does not belong to any supported address type.
    #[display(fmt = "unsupported version byte: {:#04x}", _0)]
    UnsupportedVersion(#[error(ignore)] u8),

    /// Version byte belongs to a different address type.
    #[display(fmt = "expected {} address, got {}", expected, actual)]
    UnexpectedKind {
        /// Expected address kind.
        expected: AddressKind,

        /// Actual address kind.
        actual: AddressKind,
    },

    /// Checksum does not match the payload.
    #[display(fmt = "checksum mismatch")]
    ChecksumMismatch,
}

/// Supported address types.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum AddressKind {
    /// Regular account (`G...`).
    #[display(fmt = "account")]
    Account,

    /// Smart contract (`C...`).
    #[display(fmt = "contract")]
    Contract,
}

impl AddressKind {
    fn version(self) -> u8 {
        match self {
            AddressKind::Account => VERSION_ACCOUNT_ID,
            AddressKind::Contract => VERSION_CONTRACT,
        }
    }

    fn from_version(version: u8) -> Option<Self> {
        match version {
            VERSION_ACCOUNT_ID => Some(AddressKind::Account),
            VERSION_CONTRACT => Some(AddressKind::Contract),
            _ => None,
        }
    }
}

/// Encode a 32-byte key as an address of the provided kind.
pub fn encode(kind: AddressKind, key: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(DECODED_LEN);
    payload.push(kind.version());
    payload.extend_from_slice(key);

    let checksum = crc16_xmodem(&payload);
    payload.extend_from_slice(&checksum.to_le_bytes());

    base32::encode(ALPHABET, &payload)
}

/// Decode any supported address, returning its kind and raw key.
pub fn decode(address: &str) -> Result<(AddressKind, [u8; 32]), StrKeyError> {
    let decoded = base32::decode(ALPHABET, address).ok_or(StrKeyError::InvalidEncoding)?;

    if decoded.len() != DECODED_LEN {
        return Err(StrKeyError::InvalidLength(decoded.len()));
    }

    let kind =
        AddressKind::from_version(decoded[0]).ok_or(StrKeyError::UnsupportedVersion(decoded[0]))?;

    let checksum_pos = DECODED_LEN - 2;
    let checksum = u16::from_le_bytes([decoded[checksum_pos], decoded[checksum_pos + 1]]);

    if checksum != crc16_xmodem(&decoded[..checksum_pos]) {
        return Err(StrKeyError::ChecksumMismatch);
    }

    let mut key = [0; 32];
    key.copy_from_slice(&decoded[1..checksum_pos]);

    Ok((kind, key))
}

/// Validate that the provided value is an address of the expected kind.
pub fn validate(expected: AddressKind, address: &str) -> Result<(), StrKeyError> {
    let (actual, _) = decode(address)?;

    if actual != expected {
        return Err(StrKeyError::UnexpectedKind { expected, actual });
    }

    Ok(())
}

/// Validate that the provided value is either an account or a contract address.
pub fn validate_any(address: &str) -> Result<AddressKind, StrKeyError> {
    decode(address).map(|(kind, _)| kind)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for byte in data {
        crc ^= (*byte as u16) << 8;

        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
