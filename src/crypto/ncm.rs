//! The three scheme encoders. Constants and byte order are fixed by the
//! remote side; any deviation is rejected silently by the server.

use rand::Rng;
use serde::Serialize;

use super::{decrypt, encrypt, hex_str, md5_hex, rsa, AesMode};
use crate::error::Result;
use crate::types::Form;

const AES_IV: &[u8] = b"0102030405060708";
const PRESET_KEY: &[u8] = b"0CoJUm6Qyw8W8jud";
const LINUXAPI_KEY: &[u8] = b"rFgB&h#%2?^eDg:Q";
const EAPI_KEY: &[u8] = b"e82ckenh8dichen8";
const BASE62: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// weapi: double AES-CBC under a fresh session key, with the session key
/// itself transported via raw RSA. Non-deterministic by design.
pub fn weapi<T: Serialize>(object: &T) -> Result<Form> {
    let text = serde_json::to_string(object)?;

    let mut sec_key = [0u8; 16];
    rand::thread_rng().fill(&mut sec_key[..]);
    for b in &mut sec_key {
        *b = BASE62[*b as usize % 62];
    }

    let params = encrypt(AesMode::Cbc, PRESET_KEY, Some(AES_IV), text.as_bytes())
        .map(|data| super::encode(&data))
        .and_then(|data| encrypt(AesMode::Cbc, &sec_key, Some(AES_IV), data.as_bytes()))
        .map(|data| super::encode(&data))?;

    // The server recovers the AES key from the RSA block, so the remapped
    // bytes are what gets encrypted, reversed.
    let mut reversed = sec_key;
    reversed.reverse();
    let enc_sec_key = hex_str::encode_low(&rsa::public_key().encrypt(&reversed));

    Ok(vec![("params", params), ("encSecKey", enc_sec_key)])
}

/// linuxapi: single AES-ECB pass, uppercase hex. Pure function of the
/// payload.
pub fn linuxapi<T: Serialize>(object: &T) -> Result<Form> {
    let text = serde_json::to_string(object)?;
    let eparams = encrypt(AesMode::Ecb, LINUXAPI_KEY, None, text.as_bytes())
        .map(|data| hex_str::encode_up(&data))?;
    Ok(vec![("eparams", eparams)])
}

/// eapi: MD5 digest over a fixed envelope, then AES-ECB, uppercase hex.
pub fn eapi<T: Serialize>(url: &str, object: &T) -> Result<Form> {
    let text = serde_json::to_string(object)?;
    let message = format!("nobody{}use{}md5forencrypt", url, text);
    let digest = md5_hex(message.as_bytes())?;
    let data = format!("{}-36cd479b6b5-{}-36cd479b6b5-{}", url, text, digest);
    let params = encrypt(AesMode::Ecb, EAPI_KEY, None, data.as_bytes())
        .map(|data| hex_str::encode_up(&data))?;
    Ok(vec![("params", params)])
}

/// Raw decrypt of an eapi response body.
pub fn eapi_decrypt(data: &[u8]) -> Result<Vec<u8>> {
    decrypt(AesMode::Ecb, EAPI_KEY, None, data)
}

/// Decode an eapi response body to JSON. Some error bodies are sent
/// unencrypted, so a failed decrypt-then-parse falls back to parsing the
/// raw bytes; only the double failure surfaces an error.
pub fn eapi_decode(data: &[u8]) -> Result<serde_json::Value> {
    if let Ok(plain) = eapi_decrypt(data) {
        if let Ok(value) = serde_json::from_slice(&plain) {
            return Ok(value);
        }
    }
    log::warn!("eapi body did not decrypt to json, parsing as plaintext");
    serde_json::from_slice(data).map_err(Into::into)
}
