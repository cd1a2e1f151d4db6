//! LZ77 sliding-window dictionary matching
//!
//! Match candidates are found through a dictionary keyed by 3-byte
//! prefixes. Candidate lists are kept in insertion order, and the first
//! candidate reaching the longest length wins, so output is fully
//! determined by the input and the window parameters.

use crate::error::CompressError;
use std::collections::HashMap;
use tracing::trace;

pub const DEFAULT_WINDOW: usize = 32768;
pub const DEFAULT_LOOKAHEAD: usize = 258;
pub const DEFAULT_PRUNE_INTERVAL: usize = 1000;
pub const MIN_MATCH: usize = 3;
/// Largest offset and length the token framing can carry.
pub const MAX_WINDOW: usize = u32::MAX as usize;
pub const MAX_LOOKAHEAD: usize = u16::MAX as usize;

const TAG_LITERAL: u8 = 0x00;
const TAG_MATCH: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    /// Copy `length` bytes starting `offset` bytes back.
    Match { offset: usize, length: usize },
}

type Dictionary = HashMap<[u8; MIN_MATCH], Vec<usize>>;

#[derive(Debug, Clone)]
pub struct Lz77Compressor {
    window: usize,
    lookahead: usize,
    prune_interval: usize,
}

impl Default for Lz77Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_LOOKAHEAD)
    }
}

fn prefix_at(data: &[u8], pos: usize) -> Option<[u8; MIN_MATCH]> {
    data.get(pos..pos + MIN_MATCH)?.try_into().ok()
}

impl Lz77Compressor {
    pub fn new(window: usize, lookahead: usize) -> Self {
        Self {
            window: window.clamp(1, MAX_WINDOW),
            lookahead: lookahead.clamp(MIN_MATCH, MAX_LOOKAHEAD),
            prune_interval: DEFAULT_PRUNE_INTERVAL,
        }
    }

    pub fn with_prune_interval(mut self, interval: usize) -> Self {
        self.prune_interval = interval.max(1);
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn compress(&self, data: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut dictionary = Dictionary::new();
        let mut last_prune = 0;
        let mut i = 0;

        while i < data.len() {
            let Some(prefix) = prefix_at(data, i) else {
                tokens.extend(data[i..].iter().map(|&b| Token::Literal(b)));
                break;
            };

            let (match_pos, match_len) = self.longest_match(data, i, &prefix, &dictionary);

            if match_len >= MIN_MATCH {
                tokens.push(Token::Match {
                    offset: i - match_pos,
                    length: match_len,
                });
                for pos in i..i + match_len {
                    if let Some(key) = prefix_at(data, pos) {
                        dictionary.entry(key).or_default().push(pos);
                    }
                }
                i += match_len;
            } else {
                tokens.push(Token::Literal(data[i]));
                dictionary.entry(prefix).or_default().push(i);
                i += 1;
            }

            if i - last_prune >= self.prune_interval {
                self.prune(&mut dictionary, i);
                last_prune = i;
            }
        }

        tokens
    }

    /// Earliest candidate with the longest extension, or length 0.
    fn longest_match(
        &self,
        data: &[u8],
        i: usize,
        prefix: &[u8; MIN_MATCH],
        dictionary: &Dictionary,
    ) -> (usize, usize) {
        let Some(candidates) = dictionary.get(prefix) else {
            return (0, 0);
        };

        let max_length = self.lookahead.min(data.len() - i);
        let mut best = (0, 0);

        for &pos in candidates {
            if i - pos > self.window {
                continue;
            }
            // the source may run into the bytes being matched
            let mut length = MIN_MATCH;
            while length < max_length && data[i + length] == data[pos + length] {
                length += 1;
            }
            if length > best.1 {
                best = (pos, length);
                if length == max_length {
                    break;
                }
            }
        }

        best
    }

    fn prune(&self, dictionary: &mut Dictionary, current: usize) {
        let before = dictionary.len();
        dictionary.retain(|_, positions| {
            positions.retain(|&pos| current - pos <= self.window);
            !positions.is_empty()
        });
        trace!(
            position = current,
            keys_before = before,
            keys_after = dictionary.len(),
            "pruned lz77 dictionary"
        );
    }
}

/// Expand a token stream. Matches are copied one byte at a time so that
/// overlapping references (offset < length) see their own output.
pub fn decompress(tokens: &[Token]) -> Result<Vec<u8>, CompressError> {
    let mut output = Vec::new();

    for token in tokens {
        match *token {
            Token::Literal(b) => output.push(b),
            Token::Match { offset, length } => {
                if offset == 0 || offset > output.len() {
                    return Err(CompressError::InvalidBackReference {
                        offset,
                        available: output.len(),
                    });
                }
                let start = output.len() - offset;
                output.reserve(length);
                for k in 0..length {
                    let b = output[start + k];
                    output.push(b);
                }
            }
        }
    }

    Ok(output)
}

/// Frame tokens as `0x00 byte` literals and `0x01 offset:u32le length:u16le` matches.
pub fn serialize_tokens(tokens: &[Token]) -> Result<Vec<u8>, CompressError> {
    let mut output = Vec::with_capacity(tokens.len() * 2);
    for token in tokens {
        match *token {
            Token::Literal(b) => {
                output.push(TAG_LITERAL);
                output.push(b);
            }
            Token::Match { offset, length } => {
                let offset = u32::try_from(offset).map_err(|_| {
                    CompressError::InvalidToken(format!("offset {offset} does not fit u32"))
                })?;
                let length = u16::try_from(length).map_err(|_| {
                    CompressError::InvalidToken(format!("length {length} does not fit u16"))
                })?;
                output.push(TAG_MATCH);
                output.extend_from_slice(&offset.to_le_bytes());
                output.extend_from_slice(&length.to_le_bytes());
            }
        }
    }
    Ok(output)
}

pub fn deserialize_tokens(data: &[u8]) -> Result<Vec<Token>, CompressError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        match data[pos] {
            TAG_LITERAL => {
                let b = *data
                    .get(pos + 1)
                    .ok_or(CompressError::Truncated("lz77 literal"))?;
                tokens.push(Token::Literal(b));
                pos += 2;
            }
            TAG_MATCH => {
                let body = data
                    .get(pos + 1..pos + 7)
                    .ok_or(CompressError::Truncated("lz77 match"))?;
                let offset = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
                let length = u16::from_le_bytes([body[4], body[5]]) as usize;
                if offset == 0 {
                    return Err(CompressError::InvalidToken("zero match offset".into()));
                }
                if length < MIN_MATCH {
                    return Err(CompressError::InvalidToken(format!(
                        "match length {length} below {MIN_MATCH}"
                    )));
                }
                tokens.push(Token::Match { offset, length });
                pos += 7;
            }
            tag => {
                return Err(CompressError::InvalidToken(format!("unknown tag {tag:#04x}")));
            }
        }
    }

    Ok(tokens)
}
