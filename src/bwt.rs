//! Burrows-Wheeler transform
//!
//! Rotations are ordered with cyclic prefix doubling rather than by
//! materialising them. Identical rotations keep ascending rotation order,
//! which matches a stable sort of the explicit rotation table.

use crate::error::CompressError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BwtResult {
    /// Last column of the sorted rotation table.
    pub data: Vec<u8>,
    /// Sorted rank of the unrotated input.
    pub index: usize,
}

/// Start positions of all cyclic rotations of `data` in sorted order.
fn sorted_rotations(data: &[u8]) -> Vec<usize> {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = data.iter().map(|&b| b as usize).collect();
    let mut next_rank = vec![0usize; n];

    order.sort_by_key(|&i| (rank[i], i));

    // After round k, rank orders rotations by their first 2k bytes.
    let mut k = 1;
    while k < n {
        order.sort_by_key(|&i| (rank[i], rank[(i + k) % n], i));

        next_rank[order[0]] = 0;
        for w in 1..n {
            let (prev, cur) = (order[w - 1], order[w]);
            let same = rank[prev] == rank[cur] && rank[(prev + k) % n] == rank[(cur + k) % n];
            next_rank[cur] = next_rank[prev] + usize::from(!same);
        }
        std::mem::swap(&mut rank, &mut next_rank);

        if rank[order[n - 1]] == n - 1 {
            break;
        }
        k *= 2;
    }

    order
}

pub fn transform(data: &[u8]) -> BwtResult {
    let n = data.len();
    if n == 0 {
        return BwtResult {
            data: Vec::new(),
            index: 0,
        };
    }

    let order = sorted_rotations(data);
    let mut last = Vec::with_capacity(n);
    let mut index = 0;
    for (rank, &start) in order.iter().enumerate() {
        last.push(data[(start + n - 1) % n]);
        if start == 0 {
            index = rank;
        }
    }

    BwtResult { data: last, index }
}

/// Invert [`transform`] through the LF mapping.
pub fn inverse_transform(data: &[u8], index: usize) -> Result<Vec<u8>, CompressError> {
    let n = data.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if index >= n {
        return Err(CompressError::InvalidBwtIndex { index, len: n });
    }

    // Counting sort by byte is stable, so equal bytes keep position order.
    let mut starts = [0usize; 256];
    for &b in data {
        starts[b as usize] += 1;
    }
    let mut total = 0;
    for slot in starts.iter_mut() {
        let count = *slot;
        *slot = total;
        total += count;
    }
    let mut next = vec![0usize; n];
    for (pos, &b) in data.iter().enumerate() {
        next[starts[b as usize]] = pos;
        starts[b as usize] += 1;
    }

    let mut output = Vec::with_capacity(n);
    let mut cur = next[index];
    for _ in 0..n {
        output.push(data[cur]);
        cur = next[cur];
    }

    Ok(output)
}
