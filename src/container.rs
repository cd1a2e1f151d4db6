//! Self-describing container for pipeline output
//!
//! Layout (all integers little-endian):
//! `[magic "CK"][version:u8][pipeline:u8][input_len:u64]`
//! `[symbol_count:u16][(symbol:u8, freq:u64) * symbol_count]`
//! `[padding:u8][payload_len:u64][coded_len:u64][coded bytes]`
//!
//! `payload_len` is the Huffman original size, i.e. the length of the
//! packed pipeline payload before entropy coding.

use crate::error::CompressError;
use crate::huffman::{FrequencyTable, HuffmanMetadata};

pub const MAGIC: [u8; 2] = *b"CK";
pub const VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineId {
    Bwt = 0,
    Lz77 = 1,
}

impl PipelineId {
    pub fn name(self) -> &'static str {
        match self {
            PipelineId::Bwt => "bwt",
            PipelineId::Lz77 => "lz77",
        }
    }
}

impl TryFrom<u8> for PipelineId {
    type Error = CompressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PipelineId::Bwt),
            1 => Ok(PipelineId::Lz77),
            other => Err(CompressError::UnknownPipeline(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub pipeline: PipelineId,
    pub input_len: u64,
    pub meta: HuffmanMetadata,
    pub coded: Vec<u8>,
}

/// Bounds-checked little-endian cursor over a borrowed buffer.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn bytes(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> Result<&'a [u8], CompressError> {
        if len > self.remaining() {
            return Err(CompressError::Truncated(what));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], CompressError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, what)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, CompressError> {
        Ok(self.array::<1>(what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16, CompressError> {
        self.array(what).map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, CompressError> {
        self.array(what).map(u32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self, what: &'static str) -> Result<u64, CompressError> {
        self.array(what).map(u64::from_le_bytes)
    }
}

impl Container {
    pub fn to_bytes(&self) -> Vec<u8> {
        let symbols = self.meta.freq.len();
        let header = 2 + 1 + 1 + 8 + 2 + symbols * 9 + 1 + 8 + 8;
        let mut output = Vec::with_capacity(header + self.coded.len());
        output.extend_from_slice(&MAGIC);
        output.push(VERSION);
        output.push(self.pipeline as u8);
        output.extend_from_slice(&self.input_len.to_le_bytes());

        // at most 256 distinct byte values
        output.extend_from_slice(&(symbols as u16).to_le_bytes());
        for (&symbol, &freq) in &self.meta.freq {
            output.push(symbol);
            output.extend_from_slice(&freq.to_le_bytes());
        }

        output.push(self.meta.padding);
        output.extend_from_slice(&self.meta.original_size.to_le_bytes());
        output.extend_from_slice(&(self.coded.len() as u64).to_le_bytes());
        output.extend_from_slice(&self.coded);
        output
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CompressError> {
        let mut reader = ByteReader::new(data);

        if reader.bytes(MAGIC.len(), "magic")? != MAGIC {
            return Err(CompressError::BadMagic);
        }
        let version = reader.u8("version")?;
        if version != VERSION {
            return Err(CompressError::UnsupportedVersion(version));
        }
        let pipeline = PipelineId::try_from(reader.u8("pipeline id")?)?;
        let input_len = reader.u64("input length")?;

        let symbols = reader.u16("symbol count")? as usize;
        if symbols > 256 {
            return Err(CompressError::MetadataMismatch(format!(
                "{symbols} symbols in frequency table"
            )));
        }
        let mut freq = FrequencyTable::new();
        let mut previous: Option<u8> = None;
        for _ in 0..symbols {
            let symbol = reader.u8("frequency symbol")?;
            let count = reader.u64("frequency count")?;
            if previous.is_some_and(|p| p >= symbol) {
                return Err(CompressError::MetadataMismatch(format!(
                    "frequency table symbol {symbol} out of order"
                )));
            }
            previous = Some(symbol);
            freq.insert(symbol, count);
        }

        let padding = reader.u8("padding")?;
        let original_size = reader.u64("payload length")?;
        let coded_len = reader.u64("coded length")?;
        let coded_len =
            usize::try_from(coded_len).map_err(|_| CompressError::Truncated("coded bytes"))?;
        let coded = reader.bytes(coded_len, "coded bytes")?.to_vec();

        if reader.remaining() != 0 {
            return Err(CompressError::TrailingData(reader.remaining()));
        }

        Ok(Self {
            pipeline,
            input_len,
            meta: HuffmanMetadata {
                freq,
                padding,
                original_size,
            },
            coded,
        })
    }
}

/// Read only the pipeline id, for dispatching a blob to its codec.
pub fn peek_pipeline(data: &[u8]) -> Result<PipelineId, CompressError> {
    let mut reader = ByteReader::new(data);
    if reader.bytes(MAGIC.len(), "magic")? != MAGIC {
        return Err(CompressError::BadMagic);
    }
    let version = reader.u8("version")?;
    if version != VERSION {
        return Err(CompressError::UnsupportedVersion(version));
    }
    PipelineId::try_from(reader.u8("pipeline id")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman;

    fn sample() -> Container {
        let (coded, meta) = huffman::encode(b"container sample").unwrap();
        Container {
            pipeline: PipelineId::Lz77,
            input_len: 16,
            meta,
            coded,
        }
    }

    #[test]
    fn test_container_roundtrip() {
        let container = sample();
        let bytes = container.to_bytes();
        assert_eq!(&bytes[..2], b"CK");
        assert_eq!(Container::from_bytes(&bytes).unwrap(), container);
        assert_eq!(peek_pipeline(&bytes).unwrap(), PipelineId::Lz77);
    }

    #[test]
    fn test_container_empty_metadata() {
        let container = Container {
            pipeline: PipelineId::Bwt,
            input_len: 0,
            meta: HuffmanMetadata::default(),
            coded: Vec::new(),
        };
        let bytes = container.to_bytes();
        assert_eq!(Container::from_bytes(&bytes).unwrap(), container);
    }

    #[test]
    fn test_container_bad_magic() {
        let mut bytes = sample().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(Container::from_bytes(&bytes), Err(CompressError::BadMagic)));
    }

    #[test]
    fn test_container_bad_version_and_pipeline() {
        let mut bytes = sample().to_bytes();
        bytes[2] = 9;
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(CompressError::UnsupportedVersion(9))
        ));
        let mut bytes = sample().to_bytes();
        bytes[3] = 7;
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(CompressError::UnknownPipeline(7))
        ));
    }

    #[test]
    fn test_container_truncated_everywhere() {
        let bytes = sample().to_bytes();
        for len in 0..bytes.len() {
            assert!(
                matches!(Container::from_bytes(&bytes[..len]), Err(CompressError::Truncated(_))),
                "prefix of {len} bytes parsed"
            );
        }
    }

    #[test]
    fn test_container_trailing_data() {
        let mut bytes = sample().to_bytes();
        bytes.push(0);
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(CompressError::TrailingData(1))
        ));
    }

    #[test]
    fn test_container_unsorted_symbols() {
        let mut bytes = sample().to_bytes();
        // first table entry starts after magic, version, pipeline, input_len, count
        let first = 2 + 1 + 1 + 8 + 2;
        bytes[first + 9] = bytes[first];
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(CompressError::MetadataMismatch(_))
        ));
    }
}
