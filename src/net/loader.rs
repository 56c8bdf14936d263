use super::quant::{QVec, Q8};
use crate::error::{InferError, Result, Segment};
use std::collections::VecDeque;
use std::io::BufRead;

/// Ordered producer of scalars. `Ok(None)` means the source is exhausted.
pub trait ScalarSource {
    fn next_scalar(&mut self) -> Result<Option<Q8>>;
}

/// Reads exactly `N` scalars in source order.
pub fn load_ordered<const N: usize, S: ScalarSource + ?Sized>(source: &mut S, segment: Segment) -> Result<QVec<N>> {
    let mut out = QVec::<N>::zeroed();
    for (received, slot) in out.as_mut_slice().iter_mut().enumerate() {
        match source.next_scalar()? {
            Some(v) => *slot = v,
            None => return Err(InferError::Starved { segment, expected: N, received }),
        }
    }
    Ok(out)
}

/// Integers separated by commas and/or whitespace, e.g. a CSV test-vector
/// file or one value per line on stdin. Lines are pulled lazily.
pub struct TextSource<R> {
    reader: R,
    pending: VecDeque<String>,
    done: bool,
}

impl<R: BufRead> TextSource<R> {
    pub fn new(reader: R) -> Self { Self { reader, pending: VecDeque::new(), done: false } }

    fn refill(&mut self) -> Result<()> {
        let mut line = String::new();
        while self.pending.is_empty() && !self.done {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.done = true;
                break;
            }
            self.pending.extend(
                line.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(())
    }
}

impl<R: BufRead> ScalarSource for TextSource<R> {
    fn next_scalar(&mut self) -> Result<Option<Q8>> {
        self.refill()?;
        match self.pending.pop_front() {
            Some(token) => token
                .parse::<Q8>()
                .map(Some)
                .map_err(|source| InferError::Parse { token, source }),
            None => Ok(None),
        }
    }
}

/// In-memory source over a slice, used by tooling and tests.
pub struct SliceSource<'a> {
    values: std::slice::Iter<'a, Q8>,
}

impl<'a> SliceSource<'a> {
    pub fn new(values: &'a [Q8]) -> Self { Self { values: values.iter() } }

    pub fn remaining(&self) -> usize { self.values.len() }
}

impl ScalarSource for SliceSource<'_> {
    fn next_scalar(&mut self) -> Result<Option<Q8>> { Ok(self.values.next().copied()) }
}
