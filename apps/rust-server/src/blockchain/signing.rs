// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key handling for XRP Ledger accounts.
//!
//! Wallet secrets are stored as family seeds (`s...`). A seed expands into
//! a keypair (secp256k1 by default, ed25519 for `sEd...` seeds) and the
//! keypair's public key hashes to the account's classic address (`r...`).
//!
//! ## Derivation (secp256k1)
//!
//! 1. Root private key: first `SHA512Half(seed || seq)` that is a valid scalar
//! 2. Root public generator: compressed root public key (33 bytes)
//! 3. Account key: first valid `SHA512Half(generator || 0u32 || seq)`, added
//!    to the root private key modulo the curve order
//!
//! Addresses are `RIPEMD160(SHA256(public_key))` in base58check using the
//! ledger's own alphabet.

use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::SecretKey;
use rand::{rngs::OsRng, RngCore};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

const SEED_VERSION_SECP256K1: &[u8] = &[0x21];
const SEED_VERSION_ED25519: &[u8] = &[0x01, 0xE1, 0x4B];
const ACCOUNT_ID_VERSION: &[u8] = &[0x00];
const ED25519_KEY_PREFIX: u8 = 0xED;

/// Errors raised while decoding seeds/addresses or deriving keys.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid base58 encoding: {0}")]
    Base58(String),

    #[error("Checksum mismatch")]
    Checksum,

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// First half of SHA-512, the ledger's standard hash.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

fn checksum(payload: &[u8]) -> [u8; 4] {
    let hash = Sha256::digest(Sha256::digest(payload));
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_check(version: &[u8], payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(version.len() + payload.len() + 4);
    bytes.extend_from_slice(version);
    bytes.extend_from_slice(payload);
    let sum = checksum(&bytes);
    bytes.extend_from_slice(&sum);
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

fn decode_check(encoded: &str) -> Result<Vec<u8>, KeyError> {
    let bytes = bs58::decode(encoded.trim())
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| KeyError::Base58(e.to_string()))?;

    if bytes.len() < 5 {
        return Err(KeyError::Base58("payload too short".to_string()));
    }

    let (body, sum) = bytes.split_at(bytes.len() - 4);
    if checksum(body).as_slice() != sum {
        return Err(KeyError::Checksum);
    }
    Ok(body.to_vec())
}

/// Hash a public key into its 20-byte account ID.
pub fn account_id_from_public_key(public_key: &[u8]) -> [u8; 20] {
    let hash = Ripemd160::digest(Sha256::digest(public_key));
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash);
    out
}

/// Encode an account ID as a classic address.
pub fn encode_address(account_id: &[u8; 20]) -> String {
    encode_check(ACCOUNT_ID_VERSION, account_id)
}

/// Decode a classic address into its account ID.
pub fn decode_address(address: &str) -> Result<[u8; 20], KeyError> {
    let body = decode_check(address).map_err(|e| KeyError::InvalidAddress(format!("{address}: {e}")))?;
    if body.len() != 21 || body[0] != ACCOUNT_ID_VERSION[0] {
        return Err(KeyError::InvalidAddress(address.to_string()));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&body[1..]);
    Ok(out)
}

/// Whether the string is a well-formed classic address.
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

/// Signature scheme of a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Secp256k1,
    Ed25519,
}

/// 16 bytes of seed entropy tagged with its signature scheme.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    entropy: [u8; 16],
    algorithm: KeyAlgorithm,
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seed")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Seed {
    /// Fresh random seed from the OS RNG.
    pub fn random(algorithm: KeyAlgorithm) -> Self {
        let mut entropy = [0u8; 16];
        OsRng.fill_bytes(&mut entropy);
        Self { entropy, algorithm }
    }

    /// Parse a base58 family seed.
    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        let body = decode_check(encoded).map_err(|e| KeyError::InvalidSeed(e.to_string()))?;

        let (algorithm, entropy) = match body.len() {
            17 if body[..1] == *SEED_VERSION_SECP256K1 => (KeyAlgorithm::Secp256k1, &body[1..]),
            19 if body[..3] == *SEED_VERSION_ED25519 => (KeyAlgorithm::Ed25519, &body[3..]),
            _ => {
                return Err(KeyError::InvalidSeed(
                    "unrecognized seed version or length".to_string(),
                ))
            }
        };

        let mut out = [0u8; 16];
        out.copy_from_slice(entropy);
        Ok(Self {
            entropy: out,
            algorithm,
        })
    }

    /// Base58 family seed string.
    pub fn encode(&self) -> String {
        let version = match self.algorithm {
            KeyAlgorithm::Secp256k1 => SEED_VERSION_SECP256K1,
            KeyAlgorithm::Ed25519 => SEED_VERSION_ED25519,
        };
        encode_check(version, &self.entropy)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Expand the seed into the account keypair (account index 0).
    pub fn derive_keypair(&self) -> Result<KeyPair, KeyError> {
        match self.algorithm {
            KeyAlgorithm::Ed25519 => {
                let private = sha512_half(&self.entropy);
                Ok(KeyPair::Ed25519(ed25519_dalek::SigningKey::from_bytes(
                    &private,
                )))
            }
            KeyAlgorithm::Secp256k1 => {
                let root = derive_secret(&self.entropy, None)?;
                let generator = root.public_key().to_encoded_point(true);
                let intermediate = derive_secret(generator.as_bytes(), Some(0))?;

                let sum = *root.to_nonzero_scalar() + *intermediate.to_nonzero_scalar();
                let account = SecretKey::from_bytes(&sum.to_repr())
                    .map_err(|_| KeyError::Derivation("account scalar is zero".to_string()))?;

                Ok(KeyPair::Secp256k1(k256::ecdsa::SigningKey::from(account)))
            }
        }
    }
}

/// First `SHA512Half(prefix || discriminator? || seq)` that is a valid
/// secp256k1 secret scalar.
fn derive_secret(prefix: &[u8], discriminator: Option<u32>) -> Result<SecretKey, KeyError> {
    let mut buf = Vec::with_capacity(prefix.len() + 8);
    for seq in 0..u32::MAX {
        buf.clear();
        buf.extend_from_slice(prefix);
        if let Some(d) = discriminator {
            buf.extend_from_slice(&d.to_be_bytes());
        }
        buf.extend_from_slice(&seq.to_be_bytes());

        let candidate = sha512_half(&buf);
        if let Ok(secret) = SecretKey::from_slice(&candidate) {
            return Ok(secret);
        }
    }
    Err(KeyError::Derivation(
        "no valid scalar in sequence space".to_string(),
    ))
}

/// Account signing key.
#[derive(Clone)]
pub enum KeyPair {
    Secp256k1(k256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair({})", hex::encode_upper(self.public_key()))
    }
}

impl KeyPair {
    /// Public key as carried in `SigningPubKey` (33 bytes).
    pub fn public_key(&self) -> Vec<u8> {
        match self {
            KeyPair::Secp256k1(key) => key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
            KeyPair::Ed25519(key) => {
                let mut out = Vec::with_capacity(33);
                out.push(ED25519_KEY_PREFIX);
                out.extend_from_slice(key.verifying_key().as_bytes());
                out
            }
        }
    }

    pub fn account_id(&self) -> [u8; 20] {
        account_id_from_public_key(&self.public_key())
    }

    pub fn address(&self) -> String {
        encode_address(&self.account_id())
    }

    /// Sign a transaction signing payload.
    ///
    /// secp256k1 signs `SHA512Half(payload)` and returns a low-S DER
    /// signature; ed25519 signs the payload itself.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            KeyPair::Secp256k1(key) => {
                let digest = sha512_half(payload);
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash(&digest)
                    .map_err(|e| KeyError::Signing(e.to_string()))?;
                let signature = signature.normalize_s().unwrap_or(signature);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::Ed25519(key) => Ok(key.sign(payload).to_bytes().to_vec()),
        }
    }
}

/// A ledger account that this service can sign for.
#[derive(Clone)]
pub struct Wallet {
    seed: String,
    address: String,
    keys: KeyPair,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Generate a new secp256k1 wallet.
    pub fn generate() -> Result<Self, KeyError> {
        Self::generate_with(KeyAlgorithm::Secp256k1)
    }

    pub fn generate_with(algorithm: KeyAlgorithm) -> Result<Self, KeyError> {
        Self::from_parsed_seed(Seed::random(algorithm))
    }

    /// Restore a wallet from its family seed.
    pub fn from_seed(seed: &str) -> Result<Self, KeyError> {
        Self::from_parsed_seed(Seed::decode(seed)?)
    }

    fn from_parsed_seed(seed: Seed) -> Result<Self, KeyError> {
        let keys = seed.derive_keypair()?;
        Ok(Self {
            seed: seed.encode(),
            address: keys.address(),
            keys,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Family seed. Internal use only, never returned through the API.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.keys.public_key()
    }

    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.keys.sign(payload)
    }
}
