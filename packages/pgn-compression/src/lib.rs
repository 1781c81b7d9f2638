//! PGN compression library
//!
//! This library compresses chess games written in Portable Game Notation into
//! compact byte containers and restores the exact original text. Four schemes
//! are available:
//!
//! - **opening-huffman**: Huffman codes trained on opening-book lines
//! - **huffman**: Huffman codes trained on complete annotated games
//! - **dynamic-huffman**: a Huffman table computed from, and shipped with, the input
//! - **bincode**: fixed-width binary records, no entropy coding
//!
//! Every container starts with a scheme tag and a format version, so
//! [`decompress_pgn`] works without knowing which scheme was used.

pub mod bit_stream;
pub mod codec;
pub mod container;
pub mod dynamic_huffman;
pub mod error;
pub mod fixed_huffman;
pub mod huffman_code;
pub mod pgn_tokens;
pub mod structural;
mod trained_tables;

pub use codec::PgnCodec;
pub use container::{Scheme, FORMAT_VERSION};
pub use dynamic_huffman::DynamicHuffman;
pub use error::{CorruptStreamError, PgnCompressionError};
pub use fixed_huffman::{GenericHuffman, OpeningHuffman};
pub use huffman_code::{CodeTable, FrequencyTable};
pub use pgn_tokens::{detokenize, tokenize, Symbol};
pub use structural::BincodeCodec;

/// Compress PGN text with the opening-book table
///
/// # Examples
///
/// ```
/// use pgn_compression::{opening_huffman_compress_pgn_str, opening_huffman_decompress_pgn_str};
///
/// let pgn = "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *";
/// let compressed = opening_huffman_compress_pgn_str(pgn).unwrap();
/// assert!(compressed.len() < pgn.len());
/// assert_eq!(opening_huffman_decompress_pgn_str(&compressed).unwrap(), pgn);
/// ```
pub fn opening_huffman_compress_pgn_str(pgn: &str) -> Result<Vec<u8>, PgnCompressionError> {
    OpeningHuffman.compress(pgn)
}

/// Decompress a container produced by [`opening_huffman_compress_pgn_str`]
pub fn opening_huffman_decompress_pgn_str(compressed: &[u8]) -> Result<String, PgnCompressionError> {
    OpeningHuffman.decompress(compressed)
}

/// Compress PGN text with a table built from the text itself
///
/// # Examples
///
/// ```
/// use pgn_compression::{dynamic_huffman_compress_pgn_str, dynamic_huffman_decompress_pgn_str};
///
/// let pgn = "[Event \"?\"]\n\n1. d4 d5 2. c4 e6 {QGD} 1/2-1/2";
/// let compressed = dynamic_huffman_compress_pgn_str(pgn).unwrap();
/// assert_eq!(dynamic_huffman_decompress_pgn_str(&compressed).unwrap(), pgn);
/// ```
pub fn dynamic_huffman_compress_pgn_str(pgn: &str) -> Result<Vec<u8>, PgnCompressionError> {
    DynamicHuffman.compress(pgn)
}

/// Decompress a container produced by [`dynamic_huffman_compress_pgn_str`]
pub fn dynamic_huffman_decompress_pgn_str(compressed: &[u8]) -> Result<String, PgnCompressionError> {
    DynamicHuffman.decompress(compressed)
}

/// Serialize the PGN token sequence without entropy coding
pub fn bincode_compress_pgn_str(pgn: &str) -> Result<Vec<u8>, PgnCompressionError> {
    BincodeCodec.compress(pgn)
}

/// Decompress a container produced by [`bincode_compress_pgn_str`]
pub fn bincode_decompress_pgn_str(compressed: &[u8]) -> Result<String, PgnCompressionError> {
    BincodeCodec.decompress(compressed)
}

/// Compress PGN text with the table trained on complete games
///
/// # Examples
///
/// ```
/// use pgn_compression::{huffman_compress_pgn_str, huffman_decompress_pgn_str};
///
/// let pgn = "1. e4 c5 2. Nf3 d6 {Najdorf ahead} 3. d4 cxd4 *";
/// let compressed = huffman_compress_pgn_str(pgn).unwrap();
/// assert_eq!(huffman_decompress_pgn_str(&compressed).unwrap(), pgn);
/// ```
pub fn huffman_compress_pgn_str(pgn: &str) -> Result<Vec<u8>, PgnCompressionError> {
    GenericHuffman.compress(pgn)
}

/// Decompress a container produced by [`huffman_compress_pgn_str`]
pub fn huffman_decompress_pgn_str(compressed: &[u8]) -> Result<String, PgnCompressionError> {
    GenericHuffman.decompress(compressed)
}

/// Compress PGN text with any scheme
///
/// # Examples
///
/// ```
/// use pgn_compression::{compress_pgn, decompress_pgn, Scheme};
///
/// let scheme: Scheme = "dynamic-huffman".parse().unwrap();
/// let compressed = compress_pgn(scheme, "1. d4 Nf6 *").unwrap();
/// assert_eq!(decompress_pgn(&compressed).unwrap(), "1. d4 Nf6 *");
/// ```
pub fn compress_pgn(scheme: Scheme, pgn: &str) -> Result<Vec<u8>, PgnCompressionError> {
    codec::compress(scheme, pgn)
}

/// Compress raw bytes, which must be valid UTF-8
pub fn compress_pgn_bytes(scheme: Scheme, pgn: &[u8]) -> Result<Vec<u8>, PgnCompressionError> {
    let pgn = std::str::from_utf8(pgn)?;
    codec::compress(scheme, pgn)
}

/// Decompress a container produced by any scheme
pub fn decompress_pgn(compressed: &[u8]) -> Result<String, PgnCompressionError> {
    codec::decompress(compressed)
}

/// Read the scheme a container was produced with
pub fn detect_scheme(compressed: &[u8]) -> Result<Scheme, PgnCompressionError> {
    container::detect_scheme(compressed)
}
