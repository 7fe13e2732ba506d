//! Composite key encoding.
//!
//! A key is an ordered list of string segments. Each segment is written as
//! its UTF-8 bytes with every `0x00` escaped to `0x00 0xFF`, followed by the
//! terminator `0x00 0x00`:
//!
//! ```text
//! "s1"     -> 73 31 00 00
//! "a\0b"   -> 61 00 FF 62 00 00
//! ```
//!
//! The terminator can never appear inside an encoded segment, so a key made
//! of the first `n` segments of another key is a byte prefix of it, and of no
//! key whose first `n` segments differ. `"shuffle1"` is not a prefix of
//! `"shuffle10"` once terminated. Encoding also preserves the lexicographic
//! order of segment lists, which keeps prefix scans in key order.

use super::EncodingError;
use crate::error::Result;
use crate::model::DataType;

const ESCAPE: u8 = 0x00;
const ESCAPED_NULL: u8 = 0xFF;
const TERMINATOR: [u8; 2] = [0x00, 0x00];

/// Append one encoded segment to `out`.
pub fn encode_segment(segment: &str, out: &mut Vec<u8>) {
    for &byte in segment.as_bytes() {
        if byte == ESCAPE {
            out.extend_from_slice(&[ESCAPE, ESCAPED_NULL]);
        } else {
            out.push(byte);
        }
    }
    out.extend_from_slice(&TERMINATOR);
}

/// Decode the first segment of `bytes`, returning it with the remaining input.
pub fn decode_segment(bytes: &[u8]) -> Result<(String, &[u8])> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != ESCAPE {
            result.push(bytes[i]);
            i += 1;
            continue;
        }

        match bytes.get(i + 1) {
            Some(&ESCAPED_NULL) => {
                result.push(0x00);
                i += 2;
            }
            Some(0x00) => {
                let segment = String::from_utf8(result).map_err(|_| EncodingError::InvalidUtf8)?;
                return Ok((segment, &bytes[i + 2..]));
            }
            Some(other) => {
                return Err(EncodingError::InvalidFormat(format!(
                    "Invalid null byte escape 0x{:02x}",
                    other
                ))
                .into());
            }
            None => return Err(EncodingError::TruncatedData.into()),
        }
    }

    Err(EncodingError::TruncatedData.into())
}

/// Join segments into one encoded key.
pub fn merge<I, S>(segments: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for segment in segments {
        encode_segment(segment.as_ref(), &mut out);
    }
    out
}

/// Split an encoded key back into its segments.
pub fn split(mut bytes: &[u8]) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    while !bytes.is_empty() {
        let (segment, rest) = decode_segment(bytes)?;
        segments.push(segment);
        bytes = rest;
    }
    Ok(segments)
}

/// Builds namespaced keys and scan prefixes.
///
/// The namespace tag is always the first segment. Stopping early yields a
/// prefix that matches every key built from the same leading segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn new(tag: DataType) -> Self {
        let mut buf = Vec::with_capacity(64);
        encode_segment(tag.as_str(), &mut buf);
        Self { buf }
    }

    /// Append a segment.
    pub fn segment(mut self, segment: &str) -> Self {
        encode_segment(segment, &mut self.buf);
        self
    }

    /// Encoded bytes built so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segment_layout() {
        assert_eq!(merge(["s1"]), vec![0x73, 0x31, 0x00, 0x00]);
        assert_eq!(merge(["a\0b"]), vec![0x61, 0x00, 0xFF, 0x62, 0x00, 0x00]);
        assert_eq!(merge([""]), vec![0x00, 0x00]);
        assert!(merge(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_merge_split_round_trip() {
        let segments = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(split(&merge(&segments)).unwrap(), segments);

        let awkward = vec![String::new(), "\0".to_string(), "x\0\0y".to_string()];
        assert_eq!(split(&merge(&awkward)).unwrap(), awkward);
    }

    #[test]
    fn test_numeric_suffix_does_not_collide() {
        let prefix = KeyBuilder::new(DataType::WindowInstance).segment("shuffle1");
        let other = KeyBuilder::new(DataType::WindowInstance)
            .segment("shuffle10")
            .segment("ns")
            .build();
        assert!(!other.starts_with(prefix.as_bytes()));
    }

    #[test]
    fn test_namespaces_are_prefix_disjoint() {
        for a in DataType::ALL {
            for b in DataType::ALL {
                if a == b {
                    continue;
                }
                let key = KeyBuilder::new(b).segment("q").build();
                assert!(
                    !key.starts_with(KeyBuilder::new(a).as_bytes()),
                    "{:?} prefix matched a {:?} key",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_split_rejects_malformed_input() {
        // Missing terminator
        assert!(split(b"abc").is_err());
        // Dangling escape
        assert!(split(&[0x61, 0x00]).is_err());
        // Unknown escape
        assert!(split(&[0x61, 0x00, 0x07, 0x00, 0x00]).is_err());
        // Invalid UTF-8
        assert!(split(&[0xC3, 0x28, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_decode_segment_returns_rest() {
        let encoded = merge(["first", "second"]);
        let (first, rest) = decode_segment(&encoded).unwrap();
        assert_eq!(first, "first");
        assert_eq!(rest, merge(["second"]).as_slice());
    }

    #[test]
    fn test_ordering_is_preserved() {
        let values = ["", "a", "a\0", "ab", "b"];
        let encoded: Vec<_> = values.iter().map(|v| merge([v])).collect();
        for i in 1..encoded.len() {
            assert!(
                encoded[i - 1] < encoded[i],
                "{:?} should sort before {:?}",
                values[i - 1],
                values[i]
            );
        }
    }

    proptest! {
        #[test]
        fn split_inverts_merge(segments in prop::collection::vec(".*", 0..8)) {
            prop_assert_eq!(split(&merge(&segments)).unwrap(), segments);
        }

        #[test]
        fn prefix_contains_full_key(
            leading in prop::collection::vec(".*", 1..5),
            identity in ".*",
        ) {
            let prefix = leading
                .iter()
                .fold(KeyBuilder::new(DataType::WindowBaseValue), |b, s| b.segment(s));
            let key = prefix.clone().segment(&identity).build();
            prop_assert!(key.starts_with(prefix.as_bytes()));
        }

        #[test]
        fn distinct_leading_segment_never_prefixes(a in ".*", b in ".*", tail in ".*") {
            prop_assume!(a != b);
            let prefix = KeyBuilder::new(DataType::MaxOffset).segment(&a);
            let key = KeyBuilder::new(DataType::MaxOffset).segment(&b).segment(&tail).build();
            prop_assert!(!key.starts_with(prefix.as_bytes()));
        }
    }
}
