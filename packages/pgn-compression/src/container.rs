//! Container framing shared by all codecs.
//!
//! ```text
//! +-------------------+
//! | scheme tag (1)    |  Scheme as u8
//! +-------------------+
//! | format version (1)|  FORMAT_VERSION
//! +-------------------+
//! | payload           |  scheme specific
//! +-------------------+
//! ```
//!
//! Counts inside payloads are LEB128 varints.

use crate::error::{CorruptStreamError, PgnCompressionError, Result};
use std::fmt;
use std::str::FromStr;

pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Scheme {
    /// Fixed table trained on opening-book lines.
    OpeningHuffman = 1,
    /// Table computed from, and shipped with, each input.
    DynamicHuffman = 2,
    /// Fixed-width binary records, no entropy coding.
    Bincode = 3,
    /// Fixed table trained on complete annotated games.
    Huffman = 4,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [
        Scheme::OpeningHuffman,
        Scheme::DynamicHuffman,
        Scheme::Bincode,
        Scheme::Huffman,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Scheme> {
        Scheme::ALL.into_iter().find(|scheme| scheme.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::OpeningHuffman => "opening-huffman",
            Scheme::DynamicHuffman => "dynamic-huffman",
            Scheme::Bincode => "bincode",
            Scheme::Huffman => "huffman",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown scheme {s:?} (expected one of: opening-huffman, dynamic-huffman, bincode, huffman)"
                )
            })
    }
}

/// Starts a container for `scheme`.
pub fn new_container(scheme: Scheme) -> Vec<u8> {
    vec![scheme.tag(), FORMAT_VERSION]
}

/// Reads the header and returns the scheme that produced `data`.
pub fn detect_scheme(data: &[u8]) -> Result<Scheme> {
    if data.len() < HEADER_LEN {
        return Err(CorruptStreamError::Truncated {
            needed: HEADER_LEN,
            available: data.len(),
        }
        .into());
    }
    let (tag, version) = (data[0], data[1]);
    match Scheme::from_tag(tag) {
        Some(scheme) if version == FORMAT_VERSION => Ok(scheme),
        _ => Err(PgnCompressionError::UnsupportedScheme { tag, version }),
    }
}

/// Checks the header against `expected` and returns the payload.
pub fn open(data: &[u8], expected: Scheme) -> Result<&[u8]> {
    let found = detect_scheme(data)?;
    if found != expected {
        return Err(CorruptStreamError::SchemeMismatch { expected, found }.into());
    }
    Ok(&data[HEADER_LEN..])
}

pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Reads a varint at `*pos` and advances `*pos` past it.
pub fn read_varint(data: &[u8], pos: &mut usize) -> std::result::Result<u64, CorruptStreamError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = *data.get(*pos).ok_or(CorruptStreamError::Truncated {
            needed: *pos + 1,
            available: data.len(),
        })?;
        *pos += 1;

        let bits = (byte & 0x7F) as u64;
        if (shift == 63 && bits > 1) || shift > 63 {
            return Err(CorruptStreamError::VarintOverflow);
        }
        value |= bits << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_names() {
        for scheme in Scheme::ALL {
            assert_eq!(scheme.name().parse::<Scheme>().unwrap(), scheme);
            assert_eq!(Scheme::from_tag(scheme.tag()), Some(scheme));
        }
        assert!("zlib".parse::<Scheme>().is_err());
        assert_eq!(Scheme::from_tag(0), None);
    }

    #[test]
    fn test_header() {
        let container = new_container(Scheme::DynamicHuffman);
        assert_eq!(container, vec![2, FORMAT_VERSION]);
        assert_eq!(detect_scheme(&container).unwrap(), Scheme::DynamicHuffman);
        assert_eq!(open(&container, Scheme::DynamicHuffman).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_bad_headers() {
        assert!(matches!(
            detect_scheme(&[9, FORMAT_VERSION]),
            Err(PgnCompressionError::UnsupportedScheme { tag: 9, .. })
        ));
        assert!(matches!(
            detect_scheme(&[1, FORMAT_VERSION + 1]),
            Err(PgnCompressionError::UnsupportedScheme { tag: 1, .. })
        ));
        assert!(matches!(
            detect_scheme(&[1]),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::Truncated { .. }))
        ));
        assert!(matches!(
            open(&[3, FORMAT_VERSION], Scheme::Huffman),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::SchemeMismatch {
                expected: Scheme::Huffman,
                found: Scheme::Bincode,
            }))
        ));
    }

    #[test]
    fn test_varints() {
        let values = [0u64, 1, 127, 128, 300, 16_384, u32::MAX as u64, u64::MAX];
        let mut buf = Vec::new();
        for value in values {
            write_varint(&mut buf, value);
        }
        assert_eq!(&buf[..4], &[0, 1, 0x7F, 0x80]);

        let mut pos = 0;
        for value in values {
            assert_eq!(read_varint(&buf, &mut pos).unwrap(), value);
        }
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn test_varint_errors() {
        let mut pos = 0;
        assert!(matches!(
            read_varint(&[0x80, 0x80], &mut pos),
            Err(CorruptStreamError::Truncated { needed: 3, available: 2 })
        ));

        let mut pos = 0;
        assert_eq!(
            read_varint(&[0xFF; 11], &mut pos),
            Err(CorruptStreamError::VarintOverflow)
        );
    }
}
