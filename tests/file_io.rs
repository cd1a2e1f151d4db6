//! File and stream adapters with progress reporting

use classic_compress::config::CompressionConfig;
use classic_compress::error::CompressError;
use classic_compress::stream::{compress_file, decompress_file};
use classic_compress::CodecRegistry;
use std::fs;

#[test]
fn test_file_roundtrip_reports_progress() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.txt");
    let archive = dir.path().join("input.bwt");
    let restored = dir.path().join("restored.txt");

    let data = b"file contents for the bwt pipeline\n".repeat(500);
    fs::write(&input, &data)?;

    let config = CompressionConfig {
        io_chunk_size: 1024,
        ..CompressionConfig::default()
    };
    let codec = CodecRegistry::with_defaults().codec_for_path(&archive, "custom", &config)?;

    let mut calls = Vec::new();
    let mut hook = |done: u64, total: u64| calls.push((done, total));
    let written = compress_file(
        codec.as_ref(),
        &input,
        &archive,
        config.io_chunk_size,
        Some(&mut hook),
    )?;
    assert_eq!(written, fs::metadata(&archive)?.len());

    let total = data.len() as u64;
    assert_eq!(calls.first(), Some(&(0, total)));
    assert_eq!(calls.last(), Some(&(total, total)));
    assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(calls.iter().all(|&(done, t)| t == total && done <= total));

    decompress_file(codec.as_ref(), &archive, &restored, config.io_chunk_size, None)?;
    assert_eq!(fs::read(&restored)?, data);
    Ok(())
}

#[test]
fn test_empty_file_roundtrip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("empty");
    let archive = dir.path().join("empty.lz77");
    let restored = dir.path().join("empty.out");
    fs::write(&input, b"")?;

    let config = CompressionConfig::default();
    let codec = CodecRegistry::with_defaults().codec_for_path(&archive, "", &config)?;
    compress_file(codec.as_ref(), &input, &archive, config.io_chunk_size, None)?;
    decompress_file(codec.as_ref(), &archive, &restored, config.io_chunk_size, None)?;
    assert!(fs::read(&restored)?.is_empty());
    Ok(())
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompressionConfig::default();
    let codec = CodecRegistry::with_defaults()
        .codec(".bwt", "custom", &config)
        .unwrap();
    let result = compress_file(
        codec.as_ref(),
        &dir.path().join("missing"),
        &dir.path().join("out.bwt"),
        config.io_chunk_size,
        None,
    );
    assert!(matches!(result, Err(CompressError::IoError(_))));
    assert!(!dir.path().join("out.bwt").exists());
}

#[test]
fn test_corrupt_archive_leaves_output_untouched() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("bad.lz77");
    let output = dir.path().join("out.txt");
    fs::write(&archive, b"not a container")?;
    fs::write(&output, b"precious existing contents")?;

    let config = CompressionConfig::default();
    let codec = CodecRegistry::with_defaults().codec_for_path(&archive, "", &config)?;
    let result = decompress_file(codec.as_ref(), &archive, &output, config.io_chunk_size, None);

    assert!(matches!(result, Err(CompressError::BadMagic)));
    assert_eq!(fs::read(&output)?, b"precious existing contents");
    Ok(())
}

#[test]
fn test_failed_decode_creates_no_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("bad.bwt");
    let output = dir.path().join("never.txt");
    fs::write(&archive, b"CK")?;

    let config = CompressionConfig::default();
    let codec = CodecRegistry::with_defaults().codec_for_path(&archive, "", &config)?;
    let result = decompress_file(codec.as_ref(), &archive, &output, config.io_chunk_size, None);

    assert!(matches!(result, Err(CompressError::Truncated(_))));
    assert!(!output.exists());
    Ok(())
}
