use crate::container::{self, Scheme};
use crate::dynamic_huffman::DynamicHuffman;
use crate::error::{CorruptStreamError, Result};
use crate::fixed_huffman::{GenericHuffman, OpeningHuffman};
use crate::structural::BincodeCodec;

/// A PGN compression scheme.
///
/// `decode` only parses a container; `decompress` additionally requires the
/// decoded text to compress back to the very same bytes, so every container
/// it accepts has exactly one preimage.
pub trait PgnCodec {
    const SCHEME: Scheme;

    fn compress(&self, pgn: &str) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Result<String>;

    fn decompress(&self, data: &[u8]) -> Result<String> {
        let pgn = self.decode(data)?;
        if self.compress(&pgn)? != data {
            log::warn!(
                "{}: rejecting {} byte container that does not re-encode to itself",
                Self::SCHEME,
                data.len()
            );
            return Err(CorruptStreamError::NonCanonical.into());
        }
        Ok(pgn)
    }
}

pub fn compress(scheme: Scheme, pgn: &str) -> Result<Vec<u8>> {
    match scheme {
        Scheme::OpeningHuffman => OpeningHuffman.compress(pgn),
        Scheme::DynamicHuffman => DynamicHuffman.compress(pgn),
        Scheme::Bincode => BincodeCodec.compress(pgn),
        Scheme::Huffman => GenericHuffman.compress(pgn),
    }
}

/// Decompresses with whichever scheme the header names.
pub fn decompress(data: &[u8]) -> Result<String> {
    match container::detect_scheme(data)? {
        Scheme::OpeningHuffman => OpeningHuffman.decompress(data),
        Scheme::DynamicHuffman => DynamicHuffman.decompress(data),
        Scheme::Bincode => BincodeCodec.decompress(data),
        Scheme::Huffman => GenericHuffman.decompress(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PgnCompressionError;

    #[test]
    fn test_dispatch_tags_match() {
        for scheme in Scheme::ALL {
            let compressed = compress(scheme, "1. f3 e5 2. g4 Qh4# 0-1").unwrap();
            assert_eq!(container::detect_scheme(&compressed).unwrap(), scheme);
            assert_eq!(decompress(&compressed).unwrap(), "1. f3 e5 2. g4 Qh4# 0-1");
        }
    }

    #[test]
    fn test_unknown_scheme() {
        assert!(matches!(
            decompress(&[0x7F, container::FORMAT_VERSION, 0]),
            Err(PgnCompressionError::UnsupportedScheme { tag: 0x7F, .. })
        ));
    }
}
