//! Q8 fixed-point containers and the windowed dot-product kernel.

use crate::error::{InferError, Result};
use std::ops::Index;

/// One Q8 unit is 1/256; the integer 256 stands for 1.0.
pub type Q8 = i32;

pub const Q8_SCALE: i64 = 256;

/// Fixed-point renormalization after a multiply-accumulate: `sum / 256`,
/// truncating toward zero, saturated into the scalar range.
#[inline]
pub fn renormalize(sum: i64) -> Q8 {
    (sum / Q8_SCALE).clamp(Q8::MIN as i64, Q8::MAX as i64) as Q8
}

/// Fixed-capacity vector of Q8 scalars. The extent is part of the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QVec<const N: usize>([Q8; N]);

impl<const N: usize> QVec<N> {
    pub fn zeroed() -> Self { Self([0; N]) }

    pub fn filled(value: Q8) -> Self { Self([value; N]) }

    pub fn from_array(values: [Q8; N]) -> Self { Self(values) }

    pub fn from_slice(values: &[Q8]) -> Result<Self> {
        let arr: [Q8; N] = values
            .try_into()
            .map_err(|_| InferError::Length { expected: N, actual: values.len() })?;
        Ok(Self(arr))
    }

    pub fn from_fn(f: impl FnMut(usize) -> Q8) -> Self { Self(std::array::from_fn(f)) }

    #[inline]
    pub fn len(&self) -> usize { N }

    #[inline]
    pub fn is_empty(&self) -> bool { N == 0 }

    #[inline]
    pub fn get(&self, i: usize) -> Option<Q8> { self.0.get(i).copied() }

    #[inline]
    pub fn as_slice(&self) -> &[Q8] { &self.0 }

    /// Mutable view, reserved for output accumulators.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Q8] { &mut self.0 }

    pub fn iter(&self) -> std::slice::Iter<'_, Q8> { self.0.iter() }

    pub fn to_vec(&self) -> Vec<Q8> { self.0.to_vec() }
}

impl<const N: usize> Default for QVec<N> {
    fn default() -> Self { Self::zeroed() }
}

impl<const N: usize> Index<usize> for QVec<N> {
    type Output = Q8;
    #[inline]
    fn index(&self, i: usize) -> &Q8 { &self.0[i] }
}

impl<'a, const N: usize> IntoIterator for &'a QVec<N> {
    type Item = &'a Q8;
    type IntoIter = std::slice::Iter<'a, Q8>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Biased weighted sum over consecutive, non-overlapping windows of `input`.
///
/// `weights[0]` is the bias and is added unmultiplied; the remaining
/// `weights.len() - 1` elements are multiplied against the next run of
/// inputs. The input cursor carries over between windows. Returns the
/// number of outputs written, `min(out.len(), input.len() / (weights.len() - 1))`;
/// a trailing partial window is dropped.
pub fn weighted_windows(input: &[Q8], weights: &[Q8], out: &mut [Q8]) -> usize {
    assert!(weights.len() >= 2, "weight vector needs a bias and at least one weight");
    let (bias, taps) = (weights[0] as i64, &weights[1..]);
    let emitted = out.len().min(input.len() / taps.len());
    let mut i = 0usize;
    for slot in out.iter_mut().take(emitted) {
        let mut acc: i64 = bias;
        for &w in taps {
            acc = acc.saturating_add((input[i] as i64).saturating_mul(w as i64));
            i += 1;
        }
        *slot = renormalize(acc);
    }
    emitted
}

/// Fixed-size DotProductUnit: `A` inputs against a `W`-word weight vector
/// (bias first) produce exactly `O = A / (W - 1)` outputs.
pub fn dot_windows<const A: usize, const W: usize, const O: usize>(
    input: &QVec<A>,
    weights: &QVec<W>,
) -> QVec<O> {
    const {
        assert!(W >= 2, "weight vector needs a bias and at least one weight");
        assert!(O == A / (W - 1), "output extent must equal A / (W - 1)");
    }
    let mut out = QVec::<O>::zeroed();
    weighted_windows(input.as_slice(), weights.as_slice(), out.as_mut_slice());
    out
}
