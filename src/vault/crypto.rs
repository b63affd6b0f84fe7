//! Cipher scheme shared by the credential vault and the export container.
//!
//! AES-256-GCM with a fresh 96-bit nonce per write. The default key is
//! machine-bound: derived once per process from the host name and user name
//! via Argon2id with a fixed application salt. No passphrase is requested or
//! stored, and the same machine + user always rederives the same key.
//! Payloads are colon-joined hex fields: `nonce:tag:ciphertext`, or
//! `salt:nonce:tag:ciphertext` for passphrase-keyed containers.

use std::sync::OnceLock;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{MemoryError, Result};

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const SALT_SIZE: usize = 16;

/// Fixed application salt for the machine-bound key. Not secret; the
/// secrecy comes from the derived key never leaving the machine.
const MACHINE_SALT: &[u8] = b"memento-vault-v1";

/// Argon2id cost parameters: 64 MiB, 3 passes, 4 lanes.
fn kdf() -> Result<Argon2<'static>> {
    let params = Params::new(65536, 3, 4, Some(KEY_SIZE))
        .map_err(|e| MemoryError::Crypto(format!("bad KDF params: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn derive_key(seed: &[u8], salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let mut key = [0u8; KEY_SIZE];
    kdf()?
        .hash_password_into(seed, salt, &mut key)
        .map_err(|e| MemoryError::Crypto(format!("key derivation failed: {}", e)))?;
    Ok(key)
}

/// The machine-bound key, derived at most once per process.
fn machine_key() -> Result<&'static [u8; KEY_SIZE]> {
    static KEY: OnceLock<[u8; KEY_SIZE]> = OnceLock::new();
    if let Some(k) = KEY.get() {
        return Ok(k);
    }
    let host = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
    let seed = format!("{}:{}", host, whoami::username());
    let key = derive_key(seed.as_bytes(), MACHINE_SALT)?;
    Ok(KEY.get_or_init(|| key))
}

fn seal(key: &[u8; KEY_SIZE], plaintext: &str) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the 16-byte tag to the ciphertext; split it back out
    // so the payload carries the tag as its own field.
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| MemoryError::Crypto(format!("encryption failed: {}", e)))?;
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);

    Ok((nonce_bytes.to_vec(), tag, sealed))
}

fn open(key: &[u8; KEY_SIZE], nonce: &[u8], tag: &[u8], ciphertext: &[u8]) -> Result<String> {
    if nonce.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
        return Err(MemoryError::VaultUnreadable("payload".to_string()));
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut sealed = ciphertext.to_vec();
    sealed.extend_from_slice(tag);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed.as_slice())
        .map_err(|_| MemoryError::VaultUnreadable("payload".to_string()))?;

    String::from_utf8(plaintext).map_err(|_| MemoryError::VaultUnreadable("payload".to_string()))
}

/// Encrypt with the machine-bound key. Payload: `nonce:tag:ciphertext`.
pub fn encrypt(plaintext: &str) -> Result<String> {
    let (nonce, tag, ct) = seal(machine_key()?, plaintext)?;
    Ok(format!(
        "{}:{}:{}",
        hex::encode(nonce),
        hex::encode(tag),
        hex::encode(ct)
    ))
}

/// Decrypt a machine-bound payload. Authentication or format failures come
/// back as [`MemoryError::VaultUnreadable`], never as wrong data.
pub fn decrypt(payload: &str) -> Result<String> {
    let fields = decode_fields(payload, 3)?;
    open(machine_key()?, &fields[0], &fields[1], &fields[2])
}

/// Encrypt with a user-supplied passphrase, for portable export containers.
/// Payload: `salt:nonce:tag:ciphertext`. The extra leading field is how
/// import tells the two schemes apart.
pub fn encrypt_with_passphrase(plaintext: &str, passphrase: &str) -> Result<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(passphrase.as_bytes(), &salt)?;
    let (nonce, tag, ct) = seal(&key, plaintext)?;
    Ok(format!(
        "{}:{}:{}:{}",
        hex::encode(salt),
        hex::encode(nonce),
        hex::encode(tag),
        hex::encode(ct)
    ))
}

/// Decrypt a passphrase-keyed payload.
pub fn decrypt_with_passphrase(payload: &str, passphrase: &str) -> Result<String> {
    let fields = decode_fields(payload, 4)?;
    let key = derive_key(passphrase.as_bytes(), &fields[0])?;
    open(&key, &fields[1], &fields[2], &fields[3])
}

/// Number of colon-joined fields in a payload; distinguishes machine-bound
/// (3) from passphrase-keyed (4) containers.
pub fn field_count(payload: &str) -> usize {
    payload.trim().split(':').count()
}

fn decode_fields(payload: &str, expected: usize) -> Result<Vec<Vec<u8>>> {
    let parts: Vec<&str> = payload.trim().split(':').collect();
    if parts.len() != expected {
        return Err(MemoryError::VaultUnreadable("payload".to_string()));
    }
    parts
        .iter()
        .map(|p| hex::decode(p).map_err(|_| MemoryError::VaultUnreadable("payload".to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_machine_key() {
        let encrypted = encrypt("LOGIN=bob").unwrap();
        assert_eq!(decrypt(&encrypted).unwrap(), "LOGIN=bob");
    }

    #[test]
    fn payload_has_three_hex_fields() {
        let encrypted = encrypt("data").unwrap();
        let parts: Vec<&str> = encrypted.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), NONCE_SIZE * 2);
        assert_eq!(parts[1].len(), TAG_SIZE * 2);
        assert!(parts.iter().all(|p| hex::decode(p).is_ok()));
    }

    #[test]
    fn nonce_is_fresh_per_write() {
        let a = encrypt("same").unwrap();
        let b = encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_payload_is_unreadable() {
        let encrypted = encrypt("secret").unwrap();
        let mut parts: Vec<String> = encrypted.split(':').map(String::from).collect();
        // Flip a ciphertext byte.
        let mut ct = hex::decode(&parts[2]).unwrap();
        ct[0] ^= 0xff;
        parts[2] = hex::encode(ct);
        let result = decrypt(&parts.join(":"));
        assert!(matches!(result, Err(MemoryError::VaultUnreadable(_))));
    }

    #[test]
    fn foreign_key_is_unreadable_not_wrong_data() {
        // Simulate a payload produced under a different machine identity.
        let foreign = derive_key(b"otherhost:otheruser", MACHINE_SALT).unwrap();
        let (nonce, tag, ct) = seal(&foreign, "secret").unwrap();
        let payload = format!(
            "{}:{}:{}",
            hex::encode(nonce),
            hex::encode(tag),
            hex::encode(ct)
        );
        assert!(matches!(
            decrypt(&payload),
            Err(MemoryError::VaultUnreadable(_))
        ));
    }

    #[test]
    fn passphrase_roundtrip_and_wrong_passphrase() {
        let sealed = encrypt_with_passphrase("bundle", "hunter2").unwrap();
        assert_eq!(field_count(&sealed), 4);
        assert_eq!(decrypt_with_passphrase(&sealed, "hunter2").unwrap(), "bundle");
        assert!(decrypt_with_passphrase(&sealed, "wrong").is_err());
    }

    #[test]
    fn malformed_payloads_are_unreadable() {
        assert!(decrypt("not-hex-at-all").is_err());
        assert!(decrypt("aa:bb").is_err());
        assert!(decrypt("zz:zz:zz").is_err());
    }
}
