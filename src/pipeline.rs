//! Codec pipelines
//!
//! - BWT pipeline: BWT -> MTF -> RLE -> Huffman, block by block (bzip2-style)
//! - LZ77 pipeline: LZ77 -> Huffman (deflate-style)
//!
//! Both wrap their Huffman output in a [`Container`] carrying every piece
//! of metadata the inverse needs.

use crate::config::CompressionConfig;
use crate::container::{peek_pipeline, ByteReader, Container, PipelineId};
use crate::error::CompressError;
use crate::lz77::{self, Lz77Compressor};
use crate::{bwt, huffman, mtf, rle};
use tracing::debug;

/// Uniform byte-buffer codec contract. Alternate backends implement this
/// to be swapped in through the registry.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extension including the leading dot.
    fn extension(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError>;
}

fn seal(
    pipeline: PipelineId,
    input_len: usize,
    payload: &[u8],
) -> Result<Vec<u8>, CompressError> {
    let (coded, meta) = huffman::encode(payload)?;
    debug!(
        pipeline = pipeline.name(),
        input_len,
        payload_len = payload.len(),
        coded_len = coded.len(),
        "sealed container"
    );
    Ok(Container {
        pipeline,
        input_len: input_len as u64,
        meta,
        coded,
    }
    .to_bytes())
}

/// Parse the container, check its pipeline and recover the packed payload.
fn open(expected: PipelineId, data: &[u8]) -> Result<(u64, Vec<u8>), CompressError> {
    let container = Container::from_bytes(data)?;
    if container.pipeline != expected {
        return Err(CompressError::PipelineMismatch {
            expected: expected.name(),
            found: container.pipeline.name(),
        });
    }
    let payload = huffman::decode(&container.coded, &container.meta)?;
    Ok((container.input_len, payload))
}

fn check_len(expected: u64, output: &[u8]) -> Result<(), CompressError> {
    if output.len() as u64 != expected {
        return Err(CompressError::SizeMismatch {
            expected: expected as usize,
            actual: output.len(),
        });
    }
    Ok(())
}

/// Burrows-Wheeler pipeline.
///
/// Payload before Huffman coding:
/// `[block_count:u32]` then per block `[bwt_index:u32][run_count:u32][runs]`.
#[derive(Debug, Clone)]
pub struct BwtCodec {
    block_size: usize,
}

impl BwtCodec {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.clamp(1, u32::MAX as usize),
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self::new(config.bwt_block_size())
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for BwtCodec {
    fn default() -> Self {
        Self::from_config(&CompressionConfig::default())
    }
}

impl Codec for BwtCodec {
    fn name(&self) -> &'static str {
        "bwt"
    }

    fn extension(&self) -> &'static str {
        ".bwt"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let blocks = data.chunks(self.block_size).len();
        let mut payload = Vec::with_capacity(data.len() / 2 + 4);
        payload.extend_from_slice(&(blocks as u32).to_le_bytes());

        for block in data.chunks(self.block_size) {
            let transformed = bwt::transform(block);
            let runs = rle::encode(&mtf::encode(&transformed.data));
            payload.extend_from_slice(&(transformed.index as u32).to_le_bytes());
            payload.extend_from_slice(&(runs.len() as u32).to_le_bytes());
            payload.extend_from_slice(&rle::to_bytes(&runs));
        }

        debug!(input_len = data.len(), blocks, block_size = self.block_size, "bwt pipeline");
        seal(PipelineId::Bwt, data.len(), &payload)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let (input_len, payload) = open(PipelineId::Bwt, data)?;
        let mut reader = ByteReader::new(&payload);
        let blocks = reader.u32("block count")?;

        let mut output = Vec::new();
        for _ in 0..blocks {
            let index = reader.u32("bwt index")? as usize;
            let run_count = reader.u32("run count")? as usize;
            let run_bytes = reader.bytes(run_count * 2, "rle runs")?;
            let runs = rle::from_bytes(run_bytes)?;
            let transformed = mtf::decode(&rle::decode(&runs));
            output.extend(bwt::inverse_transform(&transformed, index)?);
        }
        if reader.remaining() != 0 {
            return Err(CompressError::TrailingData(reader.remaining()));
        }

        check_len(input_len, &output)?;
        Ok(output)
    }
}

/// LZ77 pipeline; the payload is the framed token stream.
#[derive(Debug, Clone, Default)]
pub struct Lz77Codec {
    compressor: Lz77Compressor,
}

impl Lz77Codec {
    pub fn new(compressor: Lz77Compressor) -> Self {
        Self { compressor }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self::new(
            Lz77Compressor::new(config.lz77_window, config.lz77_lookahead)
                .with_prune_interval(config.lz77_prune_interval),
        )
    }
}

impl Codec for Lz77Codec {
    fn name(&self) -> &'static str {
        "lz77"
    }

    fn extension(&self) -> &'static str {
        ".lz77"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let tokens = self.compressor.compress(data);
        let payload = lz77::serialize_tokens(&tokens)?;
        debug!(
            input_len = data.len(),
            tokens = tokens.len(),
            window = self.compressor.window(),
            "lz77 pipeline"
        );
        seal(PipelineId::Lz77, data.len(), &payload)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let (input_len, payload) = open(PipelineId::Lz77, data)?;
        let tokens = lz77::deserialize_tokens(&payload)?;
        let output = lz77::decompress(&tokens)?;
        check_len(input_len, &output)?;
        Ok(output)
    }
}

/// Build the codec a blob was produced by, based on its header.
pub fn codec_for_blob(
    data: &[u8],
    config: &CompressionConfig,
) -> Result<Box<dyn Codec>, CompressError> {
    Ok(match peek_pipeline(data)? {
        PipelineId::Bwt => Box::new(BwtCodec::from_config(config)),
        PipelineId::Lz77 => Box::new(Lz77Codec::from_config(config)),
    })
}
