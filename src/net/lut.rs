use super::quant::{QVec, Q8};
use super::LUT_LEN;
use log::trace;

const LAST_INDEX: Q8 = LUT_LEN as Q8 - 1;

/// 256-entry sigmoid approximation, indexed by a raw dot-product output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationLut {
    table: QVec<LUT_LEN>,
}

impl ActivationLut {
    /// Wraps an externally supplied table.
    pub fn new(table: QVec<LUT_LEN>) -> Self { Self { table } }

    /// `lut[i] = i`; handy when checking the arithmetic around the table.
    pub fn identity() -> Self { Self::new(QVec::from_fn(|i| i as Q8)) }

    /// Integer piecewise-linear squashing curve centred on index 128:
    /// flat at 0 below 64, rising with slope 2 to 255 at 192, flat above.
    pub fn hard_sigmoid() -> Self {
        Self::new(QVec::from_fn(|i| {
            let x = i as Q8;
            ((x - 64) * 2).clamp(0, LAST_INDEX)
        }))
    }

    pub fn table(&self) -> &QVec<LUT_LEN> { &self.table }

    /// Clamps `index` into `0..=255` before reading the table, so 256 and
    /// above read entry 255 and negative indices read entry 0.
    #[inline]
    pub fn lookup(&self, index: Q8) -> Q8 {
        let clamped = index.clamp(0, LAST_INDEX);
        if clamped != index {
            trace!("lut index {} clamped to {}", index, clamped);
        }
        self.table[clamped as usize]
    }

    pub fn activate<const N: usize>(&self, values: &QVec<N>) -> QVec<N> {
        QVec::from_fn(|i| self.lookup(values[i]))
    }
}
