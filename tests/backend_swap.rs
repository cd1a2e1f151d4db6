//! Swapping an alternate backend in through the registry

use classic_compress::config::CompressionConfig;
use classic_compress::error::CompressError;
use classic_compress::{Codec, CodecRegistry};
use std::io::{Read, Write};

/// Stand-in for a system-provided codec.
struct DeflateCodec {
    level: u32,
}

impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn extension(&self) -> &'static str {
        ".lz77"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let level = flate2::Compression::new(self.level);
        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), level);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        let mut decoder = flate2::read::DeflateDecoder::new(data);
        let mut output = Vec::new();
        decoder.read_to_end(&mut output)?;
        Ok(output)
    }
}

fn registry() -> CodecRegistry {
    let mut registry = CodecRegistry::with_defaults();
    registry.register(".lz77", "system", |config| {
        Box::new(DeflateCodec { level: config.level })
    });
    registry
}

#[test]
fn test_both_implementations_listed() {
    assert_eq!(registry().available_implementations("LZ77"), vec!["custom", "system"]);
}

#[test]
fn test_swapped_backend_roundtrip() -> anyhow::Result<()> {
    let registry = registry();
    let config = CompressionConfig::default();
    let data = b"swap the backend without touching callers ".repeat(30);

    for implementation in ["custom", "system"] {
        let codec = registry.codec(".lz77", implementation, &config)?;
        let blob = codec.compress(&data)?;
        assert_eq!(codec.decompress(&blob)?, data, "{implementation}");
    }
    Ok(())
}

#[test]
fn test_backends_are_not_interchangeable() -> anyhow::Result<()> {
    let registry = registry();
    let config = CompressionConfig::default();
    let system = registry.codec(".lz77", "system", &config)?;
    let custom = registry.codec(".lz77", "custom", &config)?;

    let blob = system.compress(b"deflate output is not a container")?;
    assert!(custom.decompress(&blob).is_err());
    Ok(())
}
