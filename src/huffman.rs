//! Huffman compression and decompression
//!
//! Implements classic Huffman coding for symbol-level compression. The
//! decoder rebuilds the exact tree the encoder used from the frequency
//! table alone, so ties in the merge order are broken by heap insertion
//! sequence rather than anything that depends on heap internals.

use crate::error::CompressError;
use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::io::Cursor;

/// Byte -> occurrence count, iterated in ascending byte order.
pub type FrequencyTable = BTreeMap<u8, u64>;

/// Everything besides the coded bits that [`decode`] needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanMetadata {
    pub freq: FrequencyTable,
    /// Zero bits appended to reach a byte boundary, 0..=7.
    pub padding: u8,
    pub original_size: u64,
}

impl HuffmanMetadata {
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }
}

#[derive(Debug)]
struct HuffNode {
    freq: u64,
    seq: usize,
    symbol: Option<u8>,
    left: Option<Box<HuffNode>>,
    right: Option<Box<HuffNode>>,
}

impl HuffNode {
    fn leaf(symbol: u8, freq: u64, seq: usize) -> Self {
        Self {
            freq,
            seq,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    fn internal(left: HuffNode, right: Option<HuffNode>, seq: usize) -> Self {
        Self {
            freq: left.freq + right.as_ref().map_or(0, |r| r.freq),
            seq,
            symbol: None,
            left: Some(Box::new(left)),
            right: right.map(Box::new),
        }
    }
}

impl Eq for HuffNode {}
impl PartialEq for HuffNode {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}
impl PartialOrd for HuffNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HuffNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on (freq, insertion sequence)
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Count occurrences of every byte in `data`.
pub fn frequency_table(data: &[u8]) -> FrequencyTable {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(symbol, &count)| (symbol as u8, count))
        .collect()
}

fn build_tree(freq: &FrequencyTable) -> Option<HuffNode> {
    let mut heap = BinaryHeap::with_capacity(freq.len());
    let mut seq = 0;
    for (&symbol, &count) in freq {
        heap.push(HuffNode::leaf(symbol, count, seq));
        seq += 1;
    }

    if heap.len() == 1 {
        // A lone symbol still needs one bit, so hang it under a synthetic root.
        let leaf = heap.pop()?;
        return Some(HuffNode::internal(leaf, None, seq));
    }

    while heap.len() > 1 {
        let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
            break;
        };
        heap.push(HuffNode::internal(left, Some(right), seq));
        seq += 1;
    }

    heap.pop()
}

fn build_codes(node: &HuffNode, prefix: Vec<bool>, codes: &mut [Vec<bool>]) {
    if let Some(sym) = node.symbol {
        let code = if prefix.is_empty() { vec![false] } else { prefix };
        codes[sym as usize] = code;
        return;
    }
    if let Some(ref left) = node.left {
        let mut p = prefix.clone();
        p.push(false);
        build_codes(left, p, codes);
    }
    if let Some(ref right) = node.right {
        let mut p = prefix;
        p.push(true);
        build_codes(right, p, codes);
    }
}

/// Per-symbol code table for `freq`, indexed by byte value. Absent symbols
/// map to an empty code.
pub fn code_table(freq: &FrequencyTable) -> Vec<Vec<bool>> {
    let mut codes = vec![Vec::new(); 256];
    if let Some(tree) = build_tree(freq) {
        build_codes(&tree, Vec::new(), &mut codes);
    }
    codes
}

/// Huffman-code `data`. Empty input yields empty output and empty metadata.
pub fn encode(data: &[u8]) -> Result<(Vec<u8>, HuffmanMetadata), CompressError> {
    if data.is_empty() {
        return Ok((Vec::new(), HuffmanMetadata::default()));
    }

    let freq = frequency_table(data);
    let codes = code_table(&freq);

    let bit_count: u64 = freq
        .iter()
        .map(|(&sym, &count)| count * codes[sym as usize].len() as u64)
        .sum();
    let padding = ((8 - bit_count % 8) % 8) as u8;

    let mut output = Vec::with_capacity(((bit_count + 7) / 8) as usize);
    {
        let mut writer = BitWriter::endian(&mut output, BigEndian);
        for &b in data {
            for &bit in &codes[b as usize] {
                writer.write_bit(bit)?;
            }
        }
        writer.byte_align()?;
    }

    Ok((
        output,
        HuffmanMetadata {
            freq,
            padding,
            original_size: data.len() as u64,
        },
    ))
}

fn check_metadata(meta: &HuffmanMetadata) -> Result<(), CompressError> {
    if meta.padding > 7 {
        return Err(CompressError::MetadataMismatch(format!(
            "padding {} exceeds 7 bits",
            meta.padding
        )));
    }
    let mut total: u64 = 0;
    for (&sym, &count) in &meta.freq {
        if count == 0 {
            return Err(CompressError::MetadataMismatch(format!(
                "zero frequency for symbol {sym}"
            )));
        }
        total = total
            .checked_add(count)
            .ok_or_else(|| CompressError::MetadataMismatch("frequency sum overflows".into()))?;
    }
    if total != meta.original_size {
        return Err(CompressError::MetadataMismatch(format!(
            "frequencies sum to {total} but original size is {}",
            meta.original_size
        )));
    }
    Ok(())
}

/// Decode bits produced by [`encode`].
///
/// `meta` must be the metadata returned alongside `coded`; a different but
/// internally consistent frequency table decodes to unspecified bytes.
pub fn decode(coded: &[u8], meta: &HuffmanMetadata) -> Result<Vec<u8>, CompressError> {
    if meta.is_empty() {
        if meta.original_size != 0 {
            return Err(CompressError::MetadataMismatch(format!(
                "empty frequency table for {} symbols",
                meta.original_size
            )));
        }
        return Ok(Vec::new());
    }
    check_metadata(meta)?;

    let total_bits = coded.len() as u64 * 8;
    if u64::from(meta.padding) > total_bits {
        return Err(CompressError::Truncated("huffman padding"));
    }
    let usable_bits = total_bits - u64::from(meta.padding);
    // every symbol costs at least one bit
    if meta.original_size > usable_bits {
        return Err(CompressError::Truncated("huffman bitstream"));
    }

    let root = build_tree(&meta.freq)
        .ok_or_else(|| CompressError::HuffmanError("empty tree".into()))?;

    let original_size = meta.original_size as usize;
    let mut output = Vec::with_capacity(original_size);
    let mut reader = BitReader::endian(Cursor::new(coded), BigEndian);
    let mut node = &root;
    let mut consumed: u64 = 0;

    while output.len() < original_size {
        if consumed == usable_bits {
            return Err(CompressError::Truncated("huffman bitstream"));
        }
        let bit = reader.read_bit()?;
        consumed += 1;

        let next = if bit {
            node.right.as_deref()
        } else {
            node.left.as_deref()
        };
        node = next.ok_or_else(|| {
            let at = consumed - 1;
            CompressError::HuffmanError(format!("no branch for bit {} at {at}", bit as u8))
        })?;

        if let Some(sym) = node.symbol {
            output.push(sym);
            node = &root;
        }
    }

    Ok(output)
}
