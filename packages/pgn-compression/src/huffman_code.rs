//! Canonical Huffman codes over an arbitrary symbol type.
//!
//! Construction is fully deterministic. Every symbol has an *order*: its
//! insertion index in the [`FrequencyTable`]. The merge heap is keyed on
//! `(weight, order)`; merged nodes get the orders `symbol_count + 0`,
//! `symbol_count + 1`, ... in creation order, so on equal weights leaves
//! always win over merged nodes and earlier symbols over later ones. Codes
//! are then handed out canonically by `(length, order)`, which means a table
//! is fully described by its symbols in canonical order plus the number of
//! codes of each length.

use crate::bit_stream::{BitReader, Code};
use crate::error::{CorruptStreamError, PgnCompressionError};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

pub const MAX_CODE_LEN: usize = 64;

/// Symbol counts, kept in first-insertion order.
#[derive(Debug, Clone)]
pub struct FrequencyTable<S> {
    symbols: Vec<S>,
    counts: Vec<u64>,
    index: HashMap<S, usize>,
}

impl<S: Clone + Eq + Hash> FrequencyTable<S> {
    pub fn new() -> Self {
        FrequencyTable {
            symbols: Vec::new(),
            counts: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn record(&mut self, symbol: &S) {
        self.add(symbol, 1);
    }

    /// Adds `weight` to `symbol`, inserting it (possibly with weight 0) if new.
    pub fn add(&mut self, symbol: &S, weight: u64) {
        match self.index.get(symbol) {
            Some(&i) => self.counts[i] = self.counts[i].saturating_add(weight),
            None => {
                self.index.insert(symbol.clone(), self.symbols.len());
                self.symbols.push(symbol.clone());
                self.counts.push(weight);
            }
        }
    }

    pub fn count(&self, symbol: &S) -> u64 {
        self.index.get(symbol).map_or(0, |&i| self.counts[i])
    }

    pub fn contains(&self, symbol: &S) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> {
        self.symbols.iter().zip(self.counts.iter().copied())
    }
}

impl<S: Clone + Eq + Hash> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: Clone + Eq + Hash + 'a> FromIterator<&'a S> for FrequencyTable<S> {
    fn from_iter<I: IntoIterator<Item = &'a S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for symbol in iter {
            table.record(symbol);
        }
        table
    }
}

/// Prefix-free codes in canonical order.
#[derive(Debug, Clone)]
pub struct CodeTable<S> {
    /// Sorted by (code length, symbol order).
    entries: Vec<(S, Code)>,
    lookup: HashMap<S, Code>,
    /// `length_counts[l - 1]` symbols have a code of length `l`.
    length_counts: Vec<u32>,
}

impl<S: Clone + Eq + Hash> CodeTable<S> {
    /// Builds a table from counts. Zero-count symbols get no code; a lone
    /// symbol gets the 1-bit code `0`.
    pub fn build(frequencies: &FrequencyTable<S>) -> Result<Self, PgnCompressionError> {
        let leaves: Vec<(usize, u64)> = frequencies
            .counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .collect();

        let depths = match leaves.len() {
            0 => Vec::new(),
            1 => vec![1],
            _ => merge_depths(&leaves, frequencies.len()),
        };

        let mut sized: Vec<(usize, usize)> = leaves
            .iter()
            .zip(depths)
            .map(|(&(order, _), depth)| (order, depth))
            .collect();
        if let Some(&(_, depth)) = sized.iter().find(|(_, depth)| *depth > MAX_CODE_LEN) {
            return Err(PgnCompressionError::Encoding(format!(
                "Huffman code length {depth} exceeds {MAX_CODE_LEN} bits"
            )));
        }
        sized.sort_by_key(|&(order, depth)| (depth, order));

        let canonical = sized
            .into_iter()
            .map(|(order, depth)| (frequencies.symbols[order].clone(), depth as u8))
            .collect();
        let table = Self::assign(canonical);
        log::trace!(
            "built Huffman table: {} symbols, max code length {}",
            table.len(),
            table.max_code_len()
        );
        Ok(table)
    }

    /// Rebuilds a table from symbols already in canonical order and the
    /// number of codes per length.
    pub fn from_canonical(symbols: Vec<S>, length_counts: Vec<u32>) -> Result<Self, CorruptStreamError> {
        if length_counts.len() > MAX_CODE_LEN {
            return Err(CorruptStreamError::CodeLengthOverflow {
                length: length_counts.len(),
            });
        }
        let declared: u64 = length_counts.iter().map(|&c| c as u64).sum();
        if declared != symbols.len() as u64 {
            return Err(CorruptStreamError::InconsistentTable(
                "length counts disagree with the number of symbols",
            ));
        }

        let mut available: u128 = 1;
        for &count in &length_counts {
            available <<= 1;
            available = available
                .checked_sub(count as u128)
                .ok_or(CorruptStreamError::InconsistentTable("oversubscribed code lengths"))?;
        }

        let mut lengths = Vec::with_capacity(symbols.len());
        for (i, &count) in length_counts.iter().enumerate() {
            lengths.extend(std::iter::repeat((i + 1) as u8).take(count as usize));
        }
        let canonical: Vec<(S, u8)> = symbols.into_iter().zip(lengths).collect();

        let table = Self::assign(canonical);
        if table.lookup.len() != table.entries.len() {
            return Err(CorruptStreamError::InconsistentTable("duplicate symbol"));
        }
        Ok(table)
    }

    /// Hands out codes to `(symbol, length)` pairs sorted canonically.
    fn assign(canonical: Vec<(S, u8)>) -> Self {
        let mut entries = Vec::with_capacity(canonical.len());
        let mut lookup = HashMap::with_capacity(canonical.len());
        let mut length_counts = Vec::new();

        let mut next: u64 = 0;
        let mut previous_len = 0u8;
        for (i, (symbol, len)) in canonical.into_iter().enumerate() {
            if i > 0 {
                next = (next + 1) << (len - previous_len);
            }
            previous_len = len;

            if length_counts.len() < len as usize {
                length_counts.resize(len as usize, 0);
            }
            length_counts[len as usize - 1] += 1;

            let code = Code { bits: next, len };
            lookup.insert(symbol.clone(), code);
            entries.push((symbol, code));
        }

        CodeTable {
            entries,
            lookup,
            length_counts,
        }
    }

    pub fn code(&self, symbol: &S) -> Option<Code> {
        self.lookup.get(symbol).copied()
    }

    /// Reads one code from `reader`.
    pub fn decode(&self, reader: &mut BitReader) -> Result<&S, CorruptStreamError> {
        let start = reader.position();
        let mut code: u128 = 0;
        let mut first: u128 = 0;
        let mut index: usize = 0;
        for &count in &self.length_counts {
            code |= reader.read_bit()? as u128;
            let count = count as u128;
            if code >= first && code - first < count {
                return Ok(&self.entries[index + (code - first) as usize].0);
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(CorruptStreamError::InvalidCode { position: start })
    }

    /// Symbols and codes in canonical order.
    pub fn entries(&self) -> &[(S, Code)] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &S> {
        self.entries.iter().map(|(symbol, _)| symbol)
    }

    pub fn length_counts(&self) -> &[u32] {
        &self.length_counts
    }

    pub fn max_code_len(&self) -> usize {
        self.length_counts.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Leaf depths of the merge tree, in `leaves` order.
fn merge_depths(leaves: &[(usize, u64)], symbol_count: usize) -> Vec<usize> {
    let n = leaves.len();
    let mut parent = vec![usize::MAX; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize, usize)>> = leaves
        .iter()
        .enumerate()
        .map(|(node, &(order, weight))| Reverse((weight, order, node)))
        .collect();

    for merge in 0..n - 1 {
        let (Some(Reverse((wa, _, a))), Some(Reverse((wb, _, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        let node = n + merge;
        parent[a] = node;
        parent[b] = node;
        heap.push(Reverse((wa.saturating_add(wb), symbol_count + merge, node)));
    }

    // Parents are always created after their children, so walking ids
    // downwards from the root visits every parent first.
    let mut depth = vec![0usize; 2 * n - 1];
    for node in (0..2 * n - 2).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    depth.truncate(n);
    depth
}
