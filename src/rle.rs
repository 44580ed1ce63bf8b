use bevy::prelude::Deref;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// RunLength stores a sequence of u16 values with Run Length Encoding compression.
///
/// A value that repeats is written as the value twice followed by the number of repeats, a value
/// that appears once is written as is. Runs longer than u16::MAX are split
#[derive(Clone, Debug, PartialEq, Eq, Default, Deref, Serialize, Deserialize)]
pub struct RunLength(SmallVec<[u16; 3]>);

impl RunLength {
    /// Encode a sequence of values
    pub fn encode(values: impl IntoIterator<Item = u16>) -> Self {
        let mut buf = SmallVec::new();
        let mut last = None;
        let mut count = 0u16;
        for v in values {
            if last == Some(v) && count < u16::MAX {
                count += 1;
                continue;
            }
            if let Some(last) = last {
                push_run(&mut buf, last, count);
            }
            last = Some(v);
            count = 1;
        }
        if let Some(last) = last {
            push_run(&mut buf, last, count);
        }

        Self(buf)
    }

    /// Create a RunLength for `count` copies of a single value
    pub fn repeat(value: u16, count: usize) -> Self {
        Self::encode(std::iter::repeat(value).take(count))
    }

    /// The number of u16 values the encoded form takes up
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }

    /// Expand to the original sequence of values
    pub fn expand(&self) -> Vec<u16> {
        let mut buf = Vec::new();

        let len = self.0.len();
        let mut k = 0;
        while k < len {
            let v = self.0[k];
            if k + 2 < len {
                let peek = self.0[k + 1];
                if peek == v {
                    let n = self.0[k + 2] as usize;
                    buf.resize(buf.len() + n, v);
                    k += 3;
                    continue;
                }
            }

            buf.push(v);
            k += 1;
        }

        buf
    }
}

fn push_run(buf: &mut SmallVec<[u16; 3]>, value: u16, count: u16) {
    if count > 1 {
        buf.push(value);
        buf.push(value);
        buf.push(count);
    } else {
        buf.push(value);
    }
}

#[test]
fn test_rle() {
    let mut input = Vec::with_capacity(20);
    input.extend_from_slice(&[12; 10]);
    input.push(0);
    input.extend_from_slice(&[29; 8]);
    input.push(1);

    let output = RunLength::encode(input);
    assert_eq!(output.as_slice(), &[12, 12, 10, 0, 29, 29, 8, 1]);
}

#[test]
fn test_rle_single_value_fits_in_smallvec() {
    let output = RunLength::repeat(u16::MAX, 1024);
    assert_eq!(output.encoded_len(), 3);
    assert!(!output.spilled());
    assert_eq!(output.as_slice(), &[u16::MAX, u16::MAX, 1024]);
}

#[test]
fn test_rle_expand() {
    let mut rle = RunLength(SmallVec::new());
    rle.0.extend_from_slice(&[1, 1, 2, 3, 3, 4, 5]);

    assert_eq!(rle.expand(), vec![1, 1, 3, 3, 3, 3, 5]);
}

#[test]
fn test_rle_splits_long_runs() {
    let count = u16::MAX as usize + 2;
    let output = RunLength::repeat(7, count);
    assert_eq!(output.as_slice(), &[7, 7, u16::MAX, 7, 7, 2]);
    assert_eq!(output.expand().len(), count);
}

#[test]
fn test_rle_empty() {
    let output = RunLength::encode([]);
    assert_eq!(output.encoded_len(), 0);
    assert!(output.expand().is_empty());
}
