//! Huffman codecs over the pre-trained tables in [`crate::trained_tables`].
//!
//! ```text
//! +--------------------+
//! | header (2)         |
//! +--------------------+
//! | symbol count       |  varint
//! +--------------------+
//! | codes              |  MSB first, zero padded
//! +--------------------+
//! ```
//!
//! A symbol outside the table's vocabulary is sent as the escape code, the
//! Elias-gamma coded byte length of its text and then each byte through the
//! table's byte codes. No table travels with the data.

use crate::bit_stream::{BitReader, BitWriter};
use crate::codec::PgnCodec;
use crate::container::{self, read_varint, write_varint, Scheme};
use crate::error::{CorruptStreamError, PgnCompressionError, Result};
use crate::pgn_tokens::tokenize;
use crate::trained_tables::{self, TableEntry, TrainedTable};

/// Table trained on opening-book lines. Best for short move sequences
/// without tags or comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpeningHuffman;

/// Table trained on complete annotated games.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericHuffman;

impl PgnCodec for OpeningHuffman {
    const SCHEME: Scheme = Scheme::OpeningHuffman;

    fn compress(&self, pgn: &str) -> Result<Vec<u8>> {
        encode(trained_tables::opening()?, Self::SCHEME, pgn)
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        decode(trained_tables::opening()?, Self::SCHEME, data)
    }
}

impl PgnCodec for GenericHuffman {
    const SCHEME: Scheme = Scheme::Huffman;

    fn compress(&self, pgn: &str) -> Result<Vec<u8>> {
        encode(trained_tables::generic()?, Self::SCHEME, pgn)
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        decode(trained_tables::generic()?, Self::SCHEME, data)
    }
}

fn encode(table: &TrainedTable, scheme: Scheme, pgn: &str) -> Result<Vec<u8>> {
    let escape = table
        .symbols
        .code(&TableEntry::Escape)
        .ok_or_else(|| PgnCompressionError::Encoding("trained table has no escape code".to_string()))?;

    let symbols = tokenize(pgn);
    let mut writer = BitWriter::new();
    let mut escaped = 0usize;
    for symbol in &symbols {
        if let Some(code) = table.symbols.code(&TableEntry::Symbol(symbol.clone())) {
            writer.write_code(code);
            continue;
        }

        escaped += 1;
        let text = symbol.to_string();
        writer.write_code(escape);
        writer.write_gamma(text.len() as u64);
        for byte in text.bytes() {
            let code = table.bytes.code(&byte).ok_or_else(|| {
                PgnCompressionError::Encoding(format!("byte {byte:#04x} has no code"))
            })?;
            writer.write_code(code);
        }
    }

    let mut out = container::new_container(scheme);
    write_varint(&mut out, symbols.len() as u64);
    out.extend(writer.finish());
    log::debug!(
        "{scheme}: {} bytes in, {} symbols ({escaped} escaped), {} bytes out",
        pgn.len(),
        symbols.len(),
        out.len()
    );
    Ok(out)
}

fn decode(table: &TrainedTable, scheme: Scheme, data: &[u8]) -> Result<String> {
    let payload = container::open(data, scheme)?;
    let mut pos = 0;
    let symbol_count = read_varint(payload, &mut pos)?;
    let mut reader = BitReader::new(&payload[pos..]);
    // Every symbol takes at least one bit.
    if symbol_count > reader.bits_remaining() as u64 {
        return Err(CorruptStreamError::UnexpectedEndOfBits.into());
    }

    let mut text = Vec::with_capacity(payload.len() * 2);
    for _ in 0..symbol_count {
        match table.symbols.decode(&mut reader)? {
            TableEntry::Symbol(symbol) => text.extend_from_slice(symbol.to_string().as_bytes()),
            TableEntry::Escape => {
                let len = reader.read_gamma()?;
                if len > reader.bits_remaining() as u64 {
                    return Err(CorruptStreamError::UnexpectedEndOfBits.into());
                }
                for _ in 0..len {
                    text.push(*table.bytes.decode(&mut reader)?);
                }
            }
        }
    }
    reader.finish()?;

    String::from_utf8(text).map_err(|_| CorruptStreamError::InvalidUtf8.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_line_is_compact() {
        let pgn = "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *";
        let compressed = OpeningHuffman.compress(pgn).unwrap();
        assert_eq!(&compressed[..2], &[Scheme::OpeningHuffman.tag(), container::FORMAT_VERSION]);
        assert!(compressed.len() < pgn.len() * 2 / 3, "{} bytes", compressed.len());
        assert_eq!(OpeningHuffman.decompress(&compressed).unwrap(), pgn);
    }

    #[test]
    fn test_escaped_symbols() {
        let pgn = "[Event \"Casual\"]\n1. e4 ⩲ e5 {Grüße} 2. Nf3 Nbd7 0-0 ½-½";
        for scheme in [Scheme::OpeningHuffman, Scheme::Huffman] {
            let compressed = crate::codec::compress(scheme, pgn).unwrap();
            assert_eq!(crate::codec::decompress(&compressed).unwrap(), pgn);
        }
    }

    #[test]
    fn test_empty_input() {
        let compressed = GenericHuffman.compress("").unwrap();
        assert_eq!(compressed, vec![Scheme::Huffman.tag(), container::FORMAT_VERSION, 0]);
        assert_eq!(GenericHuffman.decompress(&compressed).unwrap(), "");
    }

    #[test]
    fn test_count_larger_than_stream() {
        let mut compressed = GenericHuffman.compress("e4").unwrap();
        compressed[2] = 100;
        assert!(matches!(
            GenericHuffman.decompress(&compressed),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::UnexpectedEndOfBits))
        ));
    }

    #[test]
    fn test_extra_bytes_rejected() {
        let mut compressed = GenericHuffman.compress("1. d4 d5").unwrap();
        compressed.push(0);
        assert!(matches!(
            GenericHuffman.decompress(&compressed),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::TrailingBits { .. }))
        ));
    }

    #[test]
    fn test_tables_are_not_interchangeable() {
        let compressed = OpeningHuffman.compress("1. e4 c5").unwrap();
        assert!(matches!(
            GenericHuffman.decompress(&compressed),
            Err(PgnCompressionError::CorruptStream(CorruptStreamError::SchemeMismatch { .. }))
        ));
    }
}
