// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical binary serialization of transactions.
//!
//! Covers the field subset used by [`Transaction`]. Fields are written in
//! canonical order (type code, then field code), each preceded by its
//! field ID. Variable-length fields carry a length prefix.

use super::signing::{decode_address, sha512_half, KeyError, Wallet};
use super::transactions::{Amount, IssuedAmount, Transaction, TransactionKind};
use super::types::NATIVE_CURRENCY;

/// Prefix of the payload that single-signing covers ("STX\0").
const HASH_PREFIX_SIGN: [u8; 4] = [0x53, 0x54, 0x58, 0x00];

/// Prefix used to compute a signed transaction's ID ("TXN\0").
const HASH_PREFIX_TRANSACTION_ID: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

const TYPE_UINT16: u8 = 1;
const TYPE_UINT32: u8 = 2;
const TYPE_AMOUNT: u8 = 6;
const TYPE_BLOB: u8 = 7;
const TYPE_ACCOUNT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FieldId {
    type_code: u8,
    field_code: u8,
}

const fn field(type_code: u8, field_code: u8) -> FieldId {
    FieldId {
        type_code,
        field_code,
    }
}

const TRANSACTION_TYPE: FieldId = field(TYPE_UINT16, 2);
const FLAGS: FieldId = field(TYPE_UINT32, 2);
const SEQUENCE: FieldId = field(TYPE_UINT32, 4);
const LAST_LEDGER_SEQUENCE: FieldId = field(TYPE_UINT32, 27);
const SET_FLAG: FieldId = field(TYPE_UINT32, 33);
const CLEAR_FLAG: FieldId = field(TYPE_UINT32, 34);
const AMOUNT: FieldId = field(TYPE_AMOUNT, 1);
const LIMIT_AMOUNT: FieldId = field(TYPE_AMOUNT, 3);
const FEE: FieldId = field(TYPE_AMOUNT, 8);
const SIGNING_PUB_KEY: FieldId = field(TYPE_BLOB, 3);
const TXN_SIGNATURE: FieldId = field(TYPE_BLOB, 4);
const ACCOUNT: FieldId = field(TYPE_ACCOUNT, 1);
const DESTINATION: FieldId = field(TYPE_ACCOUNT, 3);

const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
const MAX_SIGNIFICANT_DIGITS: usize = 16;
const MIN_EXPONENT: i32 = -96;
const MAX_EXPONENT: i32 = 80;
const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// Errors raised while serializing a transaction.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid amount `{0}`")]
    InvalidAmount(String),

    #[error("Invalid currency code `{0}`")]
    InvalidCurrency(String),

    #[error("Missing field {0}")]
    MissingField(&'static str),

    #[error("Blob too long: {0} bytes")]
    BlobTooLong(usize),

    #[error(transparent)]
    Account(#[from] KeyError),
}

/// A signed transaction ready for `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Uppercase hex of the serialized transaction
    pub tx_blob: String,
    /// Transaction ID
    pub hash: String,
}

fn encode_field_id(id: FieldId) -> Vec<u8> {
    let (t, f) = (id.type_code, id.field_code);
    match (t < 16, f < 16) {
        (true, true) => vec![(t << 4) | f],
        (true, false) => vec![t << 4, f],
        (false, true) => vec![f, t],
        (false, false) => vec![0, t, f],
    }
}

fn encode_length_prefix(len: usize) -> Result<Vec<u8>, CodecError> {
    if len <= 192 {
        Ok(vec![len as u8])
    } else if len <= 12_480 {
        let rest = len - 193;
        Ok(vec![193 + (rest >> 8) as u8, (rest & 0xFF) as u8])
    } else {
        Err(CodecError::BlobTooLong(len))
    }
}

fn encode_blob(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = encode_length_prefix(bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(out)
}

fn encode_account(address: &str) -> Result<Vec<u8>, CodecError> {
    let id = decode_address(address)?;
    encode_blob(&id)
}

/// Encode a currency code as its 160-bit ledger form.
///
/// Three-character codes use the standard layout (ASCII at bytes 12..15);
/// 40 hex characters are taken verbatim. `XRP` is never an issued code.
pub fn encode_currency(code: &str) -> Result<[u8; 20], CodecError> {
    let mut out = [0u8; 20];

    if code.len() == 3 {
        if code == NATIVE_CURRENCY || !code.bytes().all(is_standard_currency_char) {
            return Err(CodecError::InvalidCurrency(code.to_string()));
        }
        out[12..15].copy_from_slice(code.as_bytes());
        return Ok(out);
    }

    if code.len() == 40 {
        let bytes = hex::decode(code).map_err(|_| CodecError::InvalidCurrency(code.to_string()))?;
        if bytes[0] == 0 {
            // Reserved for the standard layout.
            return Err(CodecError::InvalidCurrency(code.to_string()));
        }
        out.copy_from_slice(&bytes);
        return Ok(out);
    }

    Err(CodecError::InvalidCurrency(code.to_string()))
}

fn is_standard_currency_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"?!@#$%^&*<>(){}[]|".contains(&b)
}

/// Encode a decimal string as the 64-bit issued-value field.
///
/// Layout: not-native bit, sign bit, 8-bit exponent (biased by 97),
/// 54-bit mantissa normalized into `[10^15, 10^16)`.
pub fn encode_issued_value(value: &str) -> Result<[u8; 8], CodecError> {
    let invalid = || CodecError::InvalidAmount(value.to_string());
    let text = value.trim();

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (decimal, exp_part) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let mut exponent: i32 = match exp_part {
        Some(e) => e.parse().map_err(|_| invalid())?,
        None => 0,
    };

    let (int_part, frac_part) = match decimal.split_once('.') {
        Some((i, f)) => (i, f),
        None => (decimal, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    exponent = i32::try_from(frac_part.len())
        .ok()
        .and_then(|len| exponent.checked_sub(len))
        .ok_or_else(invalid)?;
    let digits: String = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0x8000_0000_0000_0000u64.to_be_bytes());
    }

    let significant = digits.trim_end_matches('0');
    exponent = i32::try_from(digits.len() - significant.len())
        .ok()
        .and_then(|zeros| exponent.checked_add(zeros))
        .ok_or_else(invalid)?;
    if significant.len() > MAX_SIGNIFICANT_DIGITS {
        return Err(invalid());
    }

    let mut mantissa: u64 = significant.parse().map_err(|_| invalid())?;
    while mantissa < MIN_MANTISSA {
        mantissa *= 10;
        exponent = exponent.checked_sub(1).ok_or_else(invalid)?;
    }

    if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(invalid());
    }

    let mut bits = 0x8000_0000_0000_0000u64 | mantissa;
    if !negative {
        bits |= 0x4000_0000_0000_0000;
    }
    bits |= ((exponent + 97) as u64) << 54;
    Ok(bits.to_be_bytes())
}

fn encode_drops(drops: u64) -> Result<Vec<u8>, CodecError> {
    if drops > MAX_DROPS {
        return Err(CodecError::InvalidAmount(drops.to_string()));
    }
    Ok((drops | 0x4000_0000_0000_0000).to_be_bytes().to_vec())
}

fn encode_issued(amount: &IssuedAmount) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(48);
    out.extend_from_slice(&encode_issued_value(&amount.value)?);
    out.extend_from_slice(&encode_currency(&amount.currency)?);
    out.extend_from_slice(&decode_address(&amount.issuer)?);
    Ok(out)
}

fn encode_amount(amount: &Amount) -> Result<Vec<u8>, CodecError> {
    match amount {
        Amount::Drops(drops) => encode_drops(*drops),
        Amount::Issued(issued) => encode_issued(issued),
    }
}

/// Serialize a transaction. `signature` is omitted when producing the
/// signing payload.
pub fn encode(
    tx: &Transaction,
    signing_pub_key: &[u8],
    signature: Option<&[u8]>,
) -> Result<Vec<u8>, CodecError> {
    let sequence = tx.sequence.ok_or(CodecError::MissingField("Sequence"))?;
    let fee = tx.fee_drops.ok_or(CodecError::MissingField("Fee"))?;

    let mut fields: Vec<(FieldId, Vec<u8>)> = vec![
        (TRANSACTION_TYPE, tx.type_code().to_be_bytes().to_vec()),
        (FLAGS, tx.flags.to_be_bytes().to_vec()),
        (SEQUENCE, sequence.to_be_bytes().to_vec()),
        (FEE, encode_drops(fee)?),
        (SIGNING_PUB_KEY, encode_blob(signing_pub_key)?),
        (ACCOUNT, encode_account(&tx.account)?),
    ];

    if let Some(lls) = tx.last_ledger_sequence {
        fields.push((LAST_LEDGER_SEQUENCE, lls.to_be_bytes().to_vec()));
    }
    if let Some(sig) = signature {
        fields.push((TXN_SIGNATURE, encode_blob(sig)?));
    }

    match &tx.kind {
        TransactionKind::Payment {
            destination,
            amount,
        } => {
            fields.push((AMOUNT, encode_amount(amount)?));
            fields.push((DESTINATION, encode_account(destination)?));
        }
        TransactionKind::TrustSet { limit_amount } => {
            fields.push((LIMIT_AMOUNT, encode_issued(limit_amount)?));
        }
        TransactionKind::AccountSet {
            set_flag,
            clear_flag,
        } => {
            if let Some(flag) = set_flag {
                fields.push((SET_FLAG, flag.to_be_bytes().to_vec()));
            }
            if let Some(flag) = clear_flag {
                fields.push((CLEAR_FLAG, flag.to_be_bytes().to_vec()));
            }
        }
    }

    fields.sort_by_key(|(id, _)| *id);

    let mut out = Vec::with_capacity(256);
    for (id, bytes) in fields {
        out.extend_from_slice(&encode_field_id(id));
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

/// Bytes covered by a single signature.
pub fn signing_payload(tx: &Transaction, signing_pub_key: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut payload = HASH_PREFIX_SIGN.to_vec();
    payload.extend_from_slice(&encode(tx, signing_pub_key, None)?);
    Ok(payload)
}

/// Transaction ID of a serialized signed transaction.
pub fn transaction_hash(blob: &[u8]) -> String {
    let mut data = HASH_PREFIX_TRANSACTION_ID.to_vec();
    data.extend_from_slice(blob);
    hex::encode_upper(sha512_half(&data))
}

/// Sign an autofilled transaction with the wallet's key.
pub fn sign(wallet: &Wallet, tx: &Transaction) -> Result<SignedTransaction, CodecError> {
    let public_key = wallet.public_key();
    let payload = signing_payload(tx, &public_key)?;
    let signature = wallet.sign(&payload)?;
    let blob = encode(tx, &public_key, Some(&signature))?;

    Ok(SignedTransaction {
        hash: transaction_hash(&blob),
        tx_blob: hex::encode_upper(&blob),
    })
}
