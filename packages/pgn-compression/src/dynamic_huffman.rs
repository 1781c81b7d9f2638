//! Huffman codec with a table computed from each input.
//!
//! ```text
//! +--------------------+
//! | header (2)         |
//! +--------------------+
//! | symbol count       |  varint
//! +--------------------+
//! | table length       |  varint, bytes
//! +--------------------+
//! | table              |  bincode, varint integers
//! +--------------------+
//! | codes              |  MSB first, zero padded
//! +--------------------+
//! ```
//!
//! The table is stored canonically: the number of codes of each length and
//! the symbols in code order. Codes are rebuilt from that alone.

use crate::bit_stream::{BitReader, BitWriter};
use crate::codec::PgnCodec;
use crate::container::{self, read_varint, write_varint, Scheme};
use crate::error::{CorruptStreamError, PgnCompressionError, Result};
use crate::huffman_code::{CodeTable, FrequencyTable};
use crate::pgn_tokens::{detokenize, tokenize, Symbol};
use bincode::Options;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicHuffman;

#[derive(Serialize, Deserialize)]
struct SerializedTable {
    length_counts: Vec<u32>,
    symbols: Vec<Symbol>,
}

fn table_options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .with_limit(limit)
        .reject_trailing_bytes()
}

impl PgnCodec for DynamicHuffman {
    const SCHEME: Scheme = Scheme::DynamicHuffman;

    fn compress(&self, pgn: &str) -> Result<Vec<u8>> {
        let symbols = tokenize(pgn);
        let frequencies: FrequencyTable<Symbol> = symbols.iter().collect();
        let table = CodeTable::build(&frequencies)?;

        let serialized = SerializedTable {
            length_counts: table.length_counts().to_vec(),
            symbols: table.symbols().cloned().collect(),
        };
        let table_bytes = table_options(u64::MAX)
            .serialize(&serialized)
            .map_err(|e| PgnCompressionError::Encoding(e.to_string()))?;

        let mut writer = BitWriter::new();
        for symbol in &symbols {
            let code = table
                .code(symbol)
                .ok_or_else(|| PgnCompressionError::Encoding(format!("no code for {symbol:?}")))?;
            writer.write_code(code);
        }

        let mut out = container::new_container(Self::SCHEME);
        write_varint(&mut out, symbols.len() as u64);
        write_varint(&mut out, table_bytes.len() as u64);
        out.extend(table_bytes);
        out.extend(writer.finish());
        log::debug!(
            "{}: {} bytes in, {} symbols, {} distinct, {} bytes out",
            Self::SCHEME,
            pgn.len(),
            symbols.len(),
            table.len(),
            out.len()
        );
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        let payload = container::open(data, Self::SCHEME)?;
        let mut pos = 0;
        let symbol_count = read_varint(payload, &mut pos)?;
        let table_len = read_varint(payload, &mut pos)?;

        let table_end = pos.saturating_add(usize::try_from(table_len).unwrap_or(usize::MAX));
        if table_end > payload.len() {
            return Err(CorruptStreamError::Truncated {
                needed: container::HEADER_LEN.saturating_add(table_end),
                available: data.len(),
            }
            .into());
        }

        let serialized: SerializedTable = table_options(table_len)
            .deserialize(&payload[pos..table_end])
            .map_err(|e| CorruptStreamError::TableDecode(e.to_string()))?;
        let table = CodeTable::from_canonical(serialized.symbols, serialized.length_counts)?;

        let mut reader = BitReader::new(&payload[table_end..]);
        if symbol_count > reader.bits_remaining() as u64 {
            return Err(CorruptStreamError::UnexpectedEndOfBits.into());
        }
        let mut symbols = Vec::with_capacity(symbol_count as usize);
        for _ in 0..symbol_count {
            symbols.push(table.decode(&mut reader)?.clone());
        }
        reader.finish()?;

        Ok(detokenize(&symbols))
    }
}
