use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::hash::{Hasher, MessageDigest};
use openssl::symm::{Cipher, Crypter, Mode};

use crate::error::{Error, Result};

pub mod ncm;
pub mod rsa;

/// AES-128, PKCS#7 padding. CBC requires an IV; ECB must not be given one
/// (the remote protocol depends on these exact combinations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesMode {
    Cbc,
    Ecb,
}

impl AesMode {
    fn cipher(self) -> Cipher {
        match self {
            AesMode::Cbc => Cipher::aes_128_cbc(),
            AesMode::Ecb => Cipher::aes_128_ecb(),
        }
    }

    fn check_iv(self, iv: Option<&[u8]>) -> Result<()> {
        match (self, iv) {
            (AesMode::Cbc, None) => Err(Error::MissingIv),
            (AesMode::Ecb, Some(_)) => Err(Error::UnexpectedIv),
            _ => Ok(()),
        }
    }
}

pub fn encrypt(mode: AesMode, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    mode.check_iv(iv)?;
    run(mode.cipher(), Mode::Encrypt, key, iv, data)
}

pub fn decrypt(mode: AesMode, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    mode.check_iv(iv)?;
    run(mode.cipher(), Mode::Decrypt, key, iv, data)
}

fn run(cipher: Cipher, mode: Mode, key: &[u8], iv: Option<&[u8]>, data: &[u8]) -> Result<Vec<u8>> {
    let mut crypter = Crypter::new(cipher, mode, key, iv)?;
    let block_size = cipher.block_size();
    let mut output = vec![0; data.len() + block_size];

    let mut count = crypter.update(data, &mut output)?;
    count += crypter.finalize(&mut output[count..])?;
    output.truncate(count);

    Ok(output)
}

pub fn digest(digest_type: MessageDigest, data: &[u8]) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new(digest_type)?;
    hasher.update(data)?;
    Ok(hasher.finish()?.to_vec())
}

pub fn md5_hex(data: &[u8]) -> Result<String> {
    digest(MessageDigest::md5(), data).map(hex::encode)
}

pub fn encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

pub fn decode(data: &[u8]) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(data)
}

pub mod hex_str {
    pub fn encode_low(data: &[u8]) -> String {
        hex::encode(data)
    }

    pub fn encode_up(data: &[u8]) -> String {
        hex::encode_upper(data)
    }
}
