//! Run-length encoding with runs capped at 255

use crate::error::CompressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub byte: u8,
    /// 1..=255
    pub count: u8,
}

pub fn encode(data: &[u8]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let byte = data[i];
        let mut count = 1usize;
        while i + count < data.len() && data[i + count] == byte && count < u8::MAX as usize {
            count += 1;
        }
        runs.push(Run {
            byte,
            count: count as u8,
        });
        i += count;
    }
    runs
}

pub fn decode(runs: &[Run]) -> Vec<u8> {
    let total: usize = runs.iter().map(|r| r.count as usize).sum();
    let mut output = Vec::with_capacity(total);
    for run in runs {
        output.extend(std::iter::repeat(run.byte).take(run.count as usize));
    }
    output
}

/// Flatten runs into interleaved `byte, count` pairs.
pub fn to_bytes(runs: &[Run]) -> Vec<u8> {
    let mut output = Vec::with_capacity(runs.len() * 2);
    for run in runs {
        output.push(run.byte);
        output.push(run.count);
    }
    output
}

pub fn from_bytes(data: &[u8]) -> Result<Vec<Run>, CompressError> {
    if data.len() % 2 != 0 {
        return Err(CompressError::MalformedRle(format!(
            "odd buffer length {}",
            data.len()
        )));
    }
    data.chunks_exact(2)
        .map(|pair| {
            let (byte, count) = (pair[0], pair[1]);
            if count == 0 {
                return Err(CompressError::MalformedRle(format!("zero-length run of {byte}")));
            }
            Ok(Run { byte, count })
        })
        .collect()
}
