//! [rfc-4648](https://www.rfc-editor.org/rfc/rfc4648#section-6) base32 codec used to carry secrets as text.
//!
//! Decoding is padding tolerant: `=` characters are skipped wherever they appear and
//! the trailing bits that do not fill a whole byte are dropped.
//!
//! ```
//! use tfa_rs::base32;
//!
//! assert_eq!(base32::encode(b"foobar"), "MZXW6YTBOI");
//! assert_eq!(base32::decode("MZXW6YTBOI======").unwrap(), b"foobar");
//! assert!(base32::decode("mzxw6").is_err());
//! ```

/// The 32 symbols, in value order. `=` is only ever accepted as padding.
pub const ALPHABET: [u8; 32] = *b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

pub const PADDING: u8 = b'=';

/// Different ways decoding base32 text failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base32Error {
    /// Input contained a character outside of `A-Z`, `2-7` and `=`.
    InvalidCharacter(char),
}

impl std::error::Error for Base32Error {}

impl std::fmt::Display for Base32Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base32Error::InvalidCharacter(c) => {
                write!(f, "Invalid base32 string: unexpected character {:?}", c)
            }
        }
    }
}

fn value_of(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

/// Encode bytes, 5 bits per character. The last group is filled with zero bits, no `=` is emitted.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u16 = 0;
    let mut bits = 0;

    for byte in data {
        buffer = (buffer << 8) | u16::from(*byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode base32 text into bytes.
///
/// # Errors
///
/// Will return [Base32Error::InvalidCharacter] for the first character that is neither part of
/// the alphabet nor padding. Lowercase input is rejected.
pub fn decode(text: &str) -> Result<Vec<u8>, Base32Error> {
    // Validate everything before producing output, so a bad tail can't yield a partial secret.
    if let Some(c) = text
        .chars()
        .find(|c| !c.is_ascii() || (*c as u8 != PADDING && value_of(*c as u8).is_none()))
    {
        return Err(Base32Error::InvalidCharacter(c));
    }

    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u16 = 0;
    let mut bits = 0;

    for value in text.bytes().filter_map(value_of) {
        buffer = (buffer << 5) | u16::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}
