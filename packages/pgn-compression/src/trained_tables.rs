//! The two pre-trained code tables used by the fixed-table Huffman codecs.
//!
//! Each table is trained once per process from a corpus compiled into the
//! binary and is read-only afterwards. The vocabulary is every symbol a
//! fixed table can code directly: whitespace, variation brackets, results,
//! annotations, common NAGs, move numbers up to a ceiling, and every
//! non-disambiguated SAN move with and without a check or mate suffix.
//! Every vocabulary entry starts with weight 1 and gains
//! [`TRAINING_WEIGHT`] per occurrence in the corpus, so moves the corpus
//! never played still get a (long) code. Corpus symbols outside the
//! vocabulary count towards [`TableEntry::Escape`], and their text trains the
//! byte table used to spell escaped symbols out.

use crate::error::{PgnCompressionError, Result};
use crate::huffman_code::{CodeTable, FrequencyTable};
use crate::pgn_tokens::{tokenize, Annotation, GameResult, SanMove, Symbol};
use std::sync::OnceLock;

const GENERIC_CORPUS: &str = include_str!("../data/generic.pgn");
const OPENING_CORPUS: &str = include_str!("../data/openings.pgn");

pub const GENERIC_MAX_MOVE_NUMBER: u32 = 150;
pub const OPENING_MAX_MOVE_NUMBER: u32 = 40;
pub const TRAINING_WEIGHT: u64 = 8;

const FILES: &[u8] = b"abcdefgh";
const RANKS: &[u8] = b"12345678";
const PIECES: &[u8] = b"NBRQK";
const PROMOTIONS: &[u8] = b"NBRQ";

static GENERIC: OnceLock<std::result::Result<TrainedTable, String>> = OnceLock::new();
static OPENING: OnceLock<std::result::Result<TrainedTable, String>> = OnceLock::new();

/// An entry of a fixed table's alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TableEntry {
    Symbol(Symbol),
    /// The next symbol is spelled out byte by byte.
    Escape,
}

#[derive(Debug)]
pub struct TrainedTable {
    pub symbols: CodeTable<TableEntry>,
    pub bytes: CodeTable<u8>,
}

impl TrainedTable {
    pub fn train(corpus: &str, max_move_number: u32) -> Result<TrainedTable> {
        let mut symbol_weights = FrequencyTable::new();
        for symbol in vocabulary(max_move_number) {
            symbol_weights.add(&TableEntry::Symbol(symbol), 1);
        }
        symbol_weights.add(&TableEntry::Escape, 1);

        let mut byte_weights = FrequencyTable::new();
        for byte in 0..=u8::MAX {
            byte_weights.add(&byte, 1);
        }

        for symbol in tokenize(corpus) {
            let entry = TableEntry::Symbol(symbol);
            if symbol_weights.contains(&entry) {
                symbol_weights.add(&entry, TRAINING_WEIGHT);
                continue;
            }
            symbol_weights.add(&TableEntry::Escape, TRAINING_WEIGHT);
            if let TableEntry::Symbol(symbol) = entry {
                for byte in symbol.to_string().bytes() {
                    byte_weights.add(&byte, TRAINING_WEIGHT);
                }
            }
        }

        let table = TrainedTable {
            symbols: CodeTable::build(&symbol_weights)?,
            bytes: CodeTable::build(&byte_weights)?,
        };
        log::debug!(
            "trained fixed table: {} vocabulary entries, escape weight {}, longest code {} bits",
            table.symbols.len(),
            symbol_weights.count(&TableEntry::Escape),
            table.symbols.max_code_len()
        );
        Ok(table)
    }
}

/// Table trained on complete annotated games.
pub fn generic() -> Result<&'static TrainedTable> {
    cached(&GENERIC, GENERIC_CORPUS, GENERIC_MAX_MOVE_NUMBER)
}

/// Table trained on opening-book lines.
pub fn opening() -> Result<&'static TrainedTable> {
    cached(&OPENING, OPENING_CORPUS, OPENING_MAX_MOVE_NUMBER)
}

fn cached(
    cell: &'static OnceLock<std::result::Result<TrainedTable, String>>,
    corpus: &str,
    max_move_number: u32,
) -> Result<&'static TrainedTable> {
    cell.get_or_init(|| TrainedTable::train(corpus, max_move_number).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| PgnCompressionError::Encoding(message.clone()))
}

fn vocabulary(max_move_number: u32) -> Vec<Symbol> {
    let mut symbols = vec![
        Symbol::Space,
        Symbol::Newline,
        Symbol::Whitespace("\r".to_string()),
        Symbol::Whitespace("\t".to_string()),
        Symbol::VariationStart,
        Symbol::VariationEnd,
    ];
    symbols.extend(GameResult::ALL.map(Symbol::Result));
    symbols.extend(Annotation::ALL.map(Symbol::Annotation));
    symbols.extend((1..=22).map(Symbol::Nag));
    for number in 1..=max_move_number {
        symbols.push(Symbol::MoveNumber { number, dots: 1 });
        symbols.push(Symbol::MoveNumber { number, dots: 3 });
    }
    symbols.extend(
        san_spellings()
            .iter()
            .filter_map(|text| SanMove::parse_exact(text))
            .map(Symbol::Move),
    );
    symbols
}

/// Pawn moves, piece moves without disambiguation and castling, each with
/// no suffix, `+` and `#`.
fn san_spellings() -> Vec<String> {
    let mut bodies = Vec::new();
    for (file_index, &file) in FILES.iter().enumerate() {
        for &rank in RANKS {
            let square = format!("{}{}", file as char, rank as char);

            let pawn_targets: Vec<String> = if rank == b'1' || rank == b'8' {
                PROMOTIONS
                    .iter()
                    .map(|&role| format!("{square}={}", role as char))
                    .collect()
            } else {
                vec![square.clone()]
            };
            for target in &pawn_targets {
                bodies.push(target.clone());
                for from in [file_index.wrapping_sub(1), file_index + 1] {
                    if let Some(&from_file) = FILES.get(from) {
                        bodies.push(format!("{}x{target}", from_file as char));
                    }
                }
            }

            for &piece in PIECES {
                bodies.push(format!("{}{square}", piece as char));
                bodies.push(format!("{}x{square}", piece as char));
            }
        }
    }
    bodies.push("O-O".to_string());
    bodies.push("O-O-O".to_string());

    bodies
        .iter()
        .flat_map(|body| ["", "+", "#"].map(|suffix| format!("{body}{suffix}")))
        .collect()
}
