//! classic-compress: reference lossless codecs built from classical primitives.
//!
//! Primitives:
//! - Huffman coding for entropy coding
//! - LZ77 for sliding-window dictionary matching
//! - Burrows-Wheeler transform, move-to-front and run-length encoding
//!
//! Composed into two pipelines:
//! - BWT -> MTF -> RLE -> Huffman (bzip2-style)
//! - LZ77 -> Huffman (deflate-style)
//!
//! Output is a self-describing container; it is not compatible with gzip,
//! bzip2 or zstd.

pub mod bwt;
pub mod config;
pub mod container;
pub mod error;
pub mod huffman;
pub mod lz77;
pub mod mtf;
pub mod pipeline;
pub mod registry;
pub mod rle;
pub mod stream;

use crate::config::CompressionConfig;
use crate::error::CompressError;

pub use crate::pipeline::{BwtCodec, Codec, Lz77Codec};
pub use crate::registry::CodecRegistry;

/// Compression pipeline selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompressionMethod {
    Bwt,
    Lz77,
}

/// Compressed output plus a summary of the run
#[derive(Debug, Clone)]
pub struct CompressedOutput {
    pub method: CompressionMethod,
    pub original_size: usize,
    pub compressed_size: usize,
    /// Self-describing container blob.
    pub data: Vec<u8>,
    pub ratio: f64,
    /// Shannon entropy of the input, bits per byte.
    pub entropy_bits: f64,
}

/// The main compressor engine
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    /// Create a new compressor with the given configuration
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Codec implementing `method` under this configuration
    pub fn codec(&self, method: CompressionMethod) -> Box<dyn Codec> {
        match method {
            CompressionMethod::Bwt => Box::new(BwtCodec::from_config(&self.config)),
            CompressionMethod::Lz77 => Box::new(Lz77Codec::from_config(&self.config)),
        }
    }

    /// Compress data using the specified pipeline. Empty input is valid.
    pub fn compress(
        &self,
        data: &[u8],
        method: CompressionMethod,
    ) -> Result<CompressedOutput, CompressError> {
        let compressed = self.codec(method).compress(data)?;

        let ratio = if data.is_empty() {
            1.0
        } else {
            compressed.len() as f64 / data.len() as f64
        };

        Ok(CompressedOutput {
            method,
            original_size: data.len(),
            compressed_size: compressed.len(),
            data: compressed,
            ratio,
            entropy_bits: shannon_entropy(data),
        })
    }

    /// Decompress a previous [`Compressor::compress`] result
    pub fn decompress(&self, output: &CompressedOutput) -> Result<Vec<u8>, CompressError> {
        let data = self.codec(output.method).decompress(&output.data)?;
        if data.len() != output.original_size {
            return Err(CompressError::SizeMismatch {
                expected: output.original_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Decompress a bare container blob, choosing the pipeline from its header
    pub fn decompress_blob(&self, blob: &[u8]) -> Result<Vec<u8>, CompressError> {
        pipeline::codec_for_blob(blob, &self.config)?.decompress(blob)
    }
}

/// Compute Shannon entropy of data in bits per byte
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let len = data.len() as f64;
    huffman::frequency_table(data)
        .values()
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_bwt() {
        let compressor = Compressor::default();
        let data = b"hello world hello world hello world";
        let result = compressor.compress(data, CompressionMethod::Bwt).unwrap();
        assert!(result.compressed_size > 0);
        assert_eq!(result.original_size, data.len());
        assert_eq!(result.method, CompressionMethod::Bwt);
    }

    #[test]
    fn test_compress_empty() {
        let compressor = Compressor::default();
        for method in [CompressionMethod::Bwt, CompressionMethod::Lz77] {
            let result = compressor.compress(b"", method).unwrap();
            assert_eq!(result.ratio, 1.0);
            assert!(compressor.decompress(&result).unwrap().is_empty());
        }
    }

    #[test]
    fn test_roundtrip_lz77() {
        let compressor = Compressor::default();
        let data = b"the quick brown fox jumps over the lazy dog";
        let compressed = compressor.compress(data, CompressionMethod::Lz77).unwrap();
        let decompressed = compressor.decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_decompress_blob_dispatch() {
        let compressor = Compressor::default();
        let data = b"dispatch on the header byte".repeat(4);
        for method in [CompressionMethod::Bwt, CompressionMethod::Lz77] {
            let compressed = compressor.compress(&data, method).unwrap();
            assert_eq!(compressor.decompress_blob(&compressed.data).unwrap(), data);
        }
    }

    #[test]
    fn test_large_lookahead_config_roundtrip() {
        let compressor = Compressor::new(CompressionConfig {
            lz77_lookahead: 70_000,
            ..CompressionConfig::default()
        });
        let data = vec![0u8; 100_000];
        let result = compressor.compress(&data, CompressionMethod::Lz77).unwrap();
        assert_eq!(compressor.decompress(&result).unwrap(), data);
    }

    #[test]
    fn test_entropy_computation() {
        let uniform = vec![42u8; 100];
        assert!(shannon_entropy(&uniform) < 0.01, "uniform data should have ~0 entropy");
        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&all) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_compression_ratio() {
        let compressor = Compressor::default();
        let data = "aaaaaaaaaa".repeat(100);
        for method in [CompressionMethod::Bwt, CompressionMethod::Lz77] {
            let result = compressor.compress(data.as_bytes(), method).unwrap();
            assert!(result.ratio < 1.0, "repetitive data should compress well");
        }
    }
}
