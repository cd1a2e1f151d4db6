//! Move-to-front recoding
//!
//! Encoder and decoder start from the identity permutation and apply the
//! same update, so no side information is needed.

fn initial_symbols() -> Vec<u8> {
    (0..=255).collect()
}

pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut symbols = initial_symbols();
    let mut output = Vec::with_capacity(data.len());

    for &byte in data {
        let index = symbols
            .iter()
            .position(|&s| s == byte)
            .expect("all 256 byte values stay in the list");
        output.push(index as u8);
        symbols.remove(index);
        symbols.insert(0, byte);
    }

    output
}

pub fn decode(indices: &[u8]) -> Vec<u8> {
    let mut symbols = initial_symbols();
    let mut output = Vec::with_capacity(indices.len());

    for &index in indices {
        let byte = symbols.remove(index as usize);
        output.push(byte);
        symbols.insert(0, byte);
    }

    output
}
