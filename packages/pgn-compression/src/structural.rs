//! Structural codec: the token sequence as fixed-width bincode records.
//!
//! No entropy coding. Every variant is a `u32` discriminant followed by its
//! fields; strings and the sequence itself carry `u64` length prefixes. The
//! output is large but its size is a simple function of the token count,
//! which makes it a useful baseline for the Huffman schemes.

use crate::codec::PgnCodec;
use crate::container::{self, Scheme};
use crate::error::{CorruptStreamError, PgnCompressionError, Result};
use crate::pgn_tokens::{detokenize, tokenize, Symbol};
use bincode::Options;

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

fn payload_options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit)
        .reject_trailing_bytes()
}

impl PgnCodec for BincodeCodec {
    const SCHEME: Scheme = Scheme::Bincode;

    fn compress(&self, pgn: &str) -> Result<Vec<u8>> {
        let symbols = tokenize(pgn);
        let payload = payload_options(u64::MAX)
            .serialize(&symbols)
            .map_err(|e| PgnCompressionError::Encoding(e.to_string()))?;

        let mut out = container::new_container(Self::SCHEME);
        out.extend(payload);
        log::debug!(
            "{}: {} bytes in, {} symbols, {} bytes out",
            Self::SCHEME,
            pgn.len(),
            symbols.len(),
            out.len()
        );
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        let payload = container::open(data, Self::SCHEME)?;
        let symbols: Vec<Symbol> = payload_options(payload.len() as u64)
            .deserialize(payload)
            .map_err(|e| CorruptStreamError::PayloadDecode(e.to_string()))?;
        Ok(detokenize(&symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_layout() {
        let compressed = BincodeCodec.compress("1. e4").unwrap();
        let mut expected = vec![Scheme::Bincode.tag(), container::FORMAT_VERSION];
        expected.extend(3u64.to_le_bytes());
        // MoveNumber { number: 1, dots: 1 }
        expected.extend(3u32.to_le_bytes());
        expected.extend(1u32.to_le_bytes());
        expected.push(1);
        // Space
        expected.extend(0u32.to_le_bytes());
        // Move("e4")
        expected.extend(4u32.to_le_bytes());
        expected.extend(2u64.to_le_bytes());
        expected.extend(b"e4");
        assert_eq!(compressed, expected);
    }

    #[test]
    fn test_round_trip() {
        let pgn = "[White \"Anderssen\"]\n\n1. e4 e5 2. f4 exf4 {King's Gambit} 1-0\r\n";
        let compressed = BincodeCodec.compress(pgn).unwrap();
        assert_eq!(BincodeCodec.decompress(&compressed).unwrap(), pgn);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut compressed = BincodeCodec.compress("e4").unwrap();
        compressed.push(0);
        assert!(matches!(
            BincodeCodec.decompress(&compressed),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::PayloadDecode(_)))
        ));
    }

    #[test]
    fn test_non_canonical_symbols_rejected() {
        // `e4` spelled as raw text decodes fine but tokenizes to a move.
        let mut data = container::new_container(Scheme::Bincode);
        data.extend(
            payload_options(u64::MAX)
                .serialize(&vec![Symbol::Raw("e4".to_string())])
                .unwrap(),
        );
        assert_eq!(BincodeCodec.decode(&data).unwrap(), "e4");
        assert!(matches!(
            BincodeCodec.decompress(&data),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::NonCanonical))
        ));
    }
}
