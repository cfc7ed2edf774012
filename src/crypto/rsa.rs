//! Textbook RSA over the service's embedded public key.
//!
//! The server expects raw modular exponentiation of the session key with no
//! padding scheme, so the usual library entry points do not apply. The key
//! constant uses a fixed pseudo-DER layout and is parsed with a small
//! recursive-descent reader rather than a general X.509 parser.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// rsaEncryption OID blob, including the surrounding SEQUENCE header and
/// NULL parameter, exactly as it appears in the embedded key.
const RSA_OID: [u8; 15] = [
    0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01, 0x05, 0x00,
];

pub const PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----\n\
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDgtQn2JZ34ZC28NWYpAUd98iZ37BUrX/aKzmFbt7clFSs6sXqHauqKWqdtLkF2KexO40H1YTX8z2lSgBBOAxLsvaklV8k4cBFK9snQXE9/DDaFt6Rr7iVZMldczhC0JNgTz+SHXT6CBHuX3e9SdB1Ua44oncaTWz7OBGLbCiK45wIDAQAB\n\
-----END PUBLIC KEY-----";

static PUBLIC_KEY: Lazy<RsaPublicKey> =
    Lazy::new(|| RsaPublicKey::from_pem(PUBLIC_KEY_PEM).expect("embedded rsa public key"));

/// The embedded key, parsed once for the process lifetime.
pub fn public_key() -> &'static RsaPublicKey {
    &PUBLIC_KEY
}

/// {modulus, exponent} as unsigned big-endian buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub modulus: Vec<u8>,
    pub exponent: Vec<u8>,
}

impl RsaPublicKey {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let body: String = pem
            .lines()
            .filter(|line| !line.starts_with('-'))
            .collect();
        let der = super::decode(body.as_bytes()).map_err(|_| Error::MalformedKey)?;
        Self::from_der(&der)
    }

    fn from_der(der: &[u8]) -> Result<Self> {
        let mut reader = DerReader::new(der);

        reader.expect_tag(0x30)?; // SubjectPublicKeyInfo SEQUENCE
        reader.read_length()?;
        if reader.take(RSA_OID.len())? != RSA_OID {
            return Err(Error::MalformedKey);
        }
        reader.expect_tag(0x03)?; // BIT STRING wrapping the key
        reader.read_length()?;
        if reader.read_byte()? != 0x00 {
            // unused-bits count, always zero here
            return Err(Error::MalformedKey);
        }
        reader.expect_tag(0x30)?; // RSAPublicKey SEQUENCE
        reader.read_length()?;

        reader.expect_tag(0x02)?; // INTEGER modulus
        let mut modulus_len = reader.read_length()?;
        if reader.peek() == Some(0x00) {
            // sign pad on a high top bit
            reader.read_byte()?;
            modulus_len -= 1;
        }
        let modulus = reader.take(modulus_len)?.to_vec();

        reader.expect_tag(0x02)?; // INTEGER exponent
        let exponent_len = reader.read_length()?;
        let exponent = reader.take(exponent_len)?.to_vec();

        Ok(RsaPublicKey { modulus, exponent })
    }

    /// Raw RSA: interprets `data` as an unsigned big-endian integer and
    /// returns `data ^ e mod n`, minimally encoded (no fixed-length zero
    /// padding of the output).
    pub fn encrypt(&self, data: &[u8]) -> Vec<u8> {
        mod_exp(data, &self.exponent, &self.modulus)
    }
}

/// Byte cursor over the decoded key body. Only the layout the embedded
/// constant actually uses is recognized: one-byte (0x81) and two-byte
/// (0x82) long-form lengths, plus the bare short form.
struct DerReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::MalformedKey)?;
        if end > self.buf.len() {
            return Err(Error::MalformedKey);
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.take(1).map(|b| b[0])
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn expect_tag(&mut self, tag: u8) -> Result<()> {
        if self.read_byte()? != tag {
            return Err(Error::MalformedKey);
        }
        Ok(())
    }

    fn read_length(&mut self) -> Result<usize> {
        match self.read_byte()? {
            n @ 0x00..=0x7F => Ok(n as usize),
            0x81 => Ok(self.read_byte()? as usize),
            0x82 => {
                let high = self.read_byte()? as usize;
                let low = self.read_byte()? as usize;
                Ok(high << 8 | low)
            }
            _ => Err(Error::MalformedKey),
        }
    }
}

/// `base ^ exponent mod modulus` over unsigned big-endian buffers, always
/// interpreted as non-negative regardless of the top bit. Binary
/// square-and-multiply; this runs once per call, not in a hot loop.
pub fn mod_exp(base: &[u8], exponent: &[u8], modulus: &[u8]) -> Vec<u8> {
    let mut a = BigUint::from_bytes_be(base);
    let mut q = BigUint::from_bytes_be(exponent);
    let n = BigUint::from_bytes_be(modulus);
    let mut r: BigUint = One::one();
    while !q.is_zero() {
        if q.bit(0) {
            r = (r * &a) % &n;
        }
        q >>= 1;
        a = (&a * &a) % &n;
    }
    r.to_bytes_be()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_exp_small() {
        // 4^13 mod 497 = 445
        assert_eq!(mod_exp(&[4], &[13], &[1, 241]), vec![1, 189]);
        // x^0 mod n = 1
        assert_eq!(mod_exp(&[7], &[0], &[0, 13]), vec![1]);
    }

    #[test]
    fn test_parse_embedded_key() {
        let key = RsaPublicKey::from_pem(PUBLIC_KEY_PEM).unwrap();
        assert_eq!(key.modulus.len(), 128);
        assert_eq!(key.modulus[0], 0xE0); // top bit set, pad byte stripped
        assert_eq!(key.exponent, vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_public_key_memoized() {
        let a = public_key() as *const RsaPublicKey;
        let b = public_key() as *const RsaPublicKey;
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_key_rejected() {
        let truncated = "-----BEGIN PUBLIC KEY-----\nMIGfMA0G\n-----END PUBLIC KEY-----";
        match RsaPublicKey::from_pem(truncated) {
            Err(Error::MalformedKey) => {}
            other => panic!("expected MalformedKey, got {:?}", other),
        }
    }

    #[test]
    fn test_rsa_known_vector() {
        // Regression pin: all-0x01 16-byte buffer under the embedded key.
        let out = public_key().encrypt(&[0x01; 16]);
        assert_eq!(
            hex::encode(&out),
            "2a8ef8d6872e94268d15abcb2890d058135f151eba2c9a5d5d0e21642ed10dd3\
             ac22fa520883ba8e17391273a4a3ed8cef4e25043e304940ea4ff7f3ec721b95\
             33dfca2ea21bf2907cec61f02b273712ef188ab7b6da3e3ec4093078485392a6\
             c691186e4f941e9baa1aa7d752f472f574f4f69c71207ebb3bbd72edb58d8ca5"
        );
    }
}
