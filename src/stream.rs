//! Reader/writer and file adapters around [`Codec`]
//!
//! Codecs work on whole buffers, so these adapters drain the source in
//! chunks (reporting progress as they go), run the codec once, and write
//! the result to the sink. File outputs are only created once the codec
//! has succeeded.

use crate::error::CompressError;
use crate::pipeline::Codec;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Progress hook receiving `(processed, total)`. Calls are monotonically
/// non-decreasing in `processed`, which never exceeds `total`.
pub type Progress<'a> = Option<&'a mut dyn FnMut(u64, u64)>;

fn report(progress: &mut Progress<'_>, processed: u64, total: u64) {
    if let Some(hook) = progress.as_deref_mut() {
        hook(processed.min(total), total);
    }
}

/// Read `reader` to the end in `chunk_size` pieces. With an unknown total
/// the running count is reported as both values.
pub fn read_all<R: Read>(
    mut reader: R,
    chunk_size: usize,
    total: Option<u64>,
    progress: &mut Progress<'_>,
) -> Result<Vec<u8>, CompressError> {
    let mut buffer = Vec::with_capacity(total.unwrap_or(0).min(1 << 24) as usize);
    let mut chunk = vec![0u8; chunk_size.max(1)];
    let mut processed: u64 = 0;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        buffer.extend_from_slice(&chunk[..n]);
        processed += n as u64;
        report(progress, processed, total.unwrap_or(processed));
    }

    Ok(buffer)
}

pub fn compress_stream<R: Read, W: Write>(
    codec: &dyn Codec,
    reader: R,
    mut writer: W,
    chunk_size: usize,
    total: Option<u64>,
    mut progress: Progress<'_>,
) -> Result<u64, CompressError> {
    let input = read_all(reader, chunk_size, total, &mut progress)?;
    let output = codec.compress(&input)?;
    writer.write_all(&output)?;
    writer.flush()?;
    debug!(
        codec = codec.name(),
        input_len = input.len(),
        output_len = output.len(),
        "compressed stream"
    );
    Ok(output.len() as u64)
}

pub fn decompress_stream<R: Read, W: Write>(
    codec: &dyn Codec,
    reader: R,
    mut writer: W,
    chunk_size: usize,
    total: Option<u64>,
    mut progress: Progress<'_>,
) -> Result<u64, CompressError> {
    let input = read_all(reader, chunk_size, total, &mut progress)?;
    let output = codec.decompress(&input)?;
    writer.write_all(&output)?;
    writer.flush()?;
    debug!(
        codec = codec.name(),
        input_len = input.len(),
        output_len = output.len(),
        "decompressed stream"
    );
    Ok(output.len() as u64)
}

/// Read the whole of `input`, run `apply` on it and only then write the
/// result to `output`, so a failing codec leaves any existing file alone.
fn transform_file(
    codec: &dyn Codec,
    input: &Path,
    output: &Path,
    chunk_size: usize,
    mut progress: Progress<'_>,
    apply: impl FnOnce(&[u8]) -> Result<Vec<u8>, CompressError>,
) -> Result<u64, CompressError> {
    let source = File::open(input)?;
    let total = source.metadata()?.len();

    report(&mut progress, 0, total);
    let data = read_all(BufReader::new(source), chunk_size, Some(total), &mut progress)?;
    let result = apply(&data)?;

    let mut sink = BufWriter::new(File::create(output)?);
    sink.write_all(&result)?;
    sink.flush()?;
    report(&mut progress, total, total);

    debug!(
        codec = codec.name(),
        input = %input.display(),
        output = %output.display(),
        input_len = data.len(),
        output_len = result.len(),
        "wrote file"
    );
    Ok(result.len() as u64)
}

/// Compress the file at `input` into `output`, reporting progress against
/// the input file size.
pub fn compress_file(
    codec: &dyn Codec,
    input: &Path,
    output: &Path,
    chunk_size: usize,
    progress: Progress<'_>,
) -> Result<u64, CompressError> {
    transform_file(codec, input, output, chunk_size, progress, |data| {
        codec.compress(data)
    })
}

/// Decompress the archive at `input` into `output`. `output` is not
/// touched unless the archive decodes cleanly.
pub fn decompress_file(
    codec: &dyn Codec,
    input: &Path,
    output: &Path,
    chunk_size: usize,
    progress: Progress<'_>,
) -> Result<u64, CompressError> {
    transform_file(codec, input, output, chunk_size, progress, |data| {
        codec.decompress(data)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Lz77Codec;
    use std::io::Cursor;

    #[test]
    fn test_stream_roundtrip_with_progress() {
        let codec = Lz77Codec::default();
        let data = b"streamed bytes ".repeat(100);
        let mut calls = Vec::new();
        let mut hook = |done: u64, total: u64| calls.push((done, total));

        let mut blob = Vec::new();
        compress_stream(
            &codec,
            Cursor::new(&data),
            &mut blob,
            64,
            Some(data.len() as u64),
            Some(&mut hook),
        )
        .unwrap();

        assert_eq!(calls.len(), (data.len() + 63) / 64);
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(calls.last(), Some(&(data.len() as u64, data.len() as u64)));

        let mut restored = Vec::new();
        decompress_stream(&codec, Cursor::new(&blob), &mut restored, 64, None, None).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_progress_clamped_to_total() {
        let mut calls = Vec::new();
        let mut hook = |done: u64, total: u64| calls.push((done, total));
        let mut progress: Progress<'_> = Some(&mut hook);
        // the source turns out larger than advertised
        read_all(Cursor::new(vec![1u8; 100]), 30, Some(50), &mut progress).unwrap();
        assert!(calls.iter().all(|&(done, total)| done <= total));
    }
}
