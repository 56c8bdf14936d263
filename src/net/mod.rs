pub mod quant;
pub mod lut;
pub mod layer;
pub mod loader;

use crate::error::{Result, Segment};
use layer::{LayerPipeline, OutputProjector, Schedule};
use loader::{load_ordered, ScalarSource};
use log::debug;
use lut::ActivationLut;
use quant::QVec;

pub const A_LEN: usize = 64 * 7;
pub const B_LEN: usize = 16;
pub const LANE_WEIGHTS: usize = B_LEN / 2;
pub const LANE_OUTPUTS: usize = A_LEN / (LANE_WEIGHTS - 1);
pub const HIDDEN_LEN: usize = 2 * LANE_OUTPUTS;
pub const C_LEN: usize = 3;
pub const LUT_LEN: usize = 256;
pub const OUTPUT_LEN: usize = HIDDEN_LEN / (C_LEN - 1);
/// Words in one input message: A, B, C and the LUT.
pub const INPUT_WORDS: usize = A_LEN + B_LEN + C_LEN + LUT_LEN;

const _: () = {
    assert!(B_LEN % 2 == 0);
    assert!(A_LEN % (LANE_WEIGHTS - 1) == 0);
    assert!(LANE_OUTPUTS == 64);
    assert!(HIDDEN_LEN % (C_LEN - 1) == 0);
    assert!(OUTPUT_LEN == 64);
    assert!(INPUT_WORDS == 723);
};

/// Order of the four segments in a scalar source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub enum SegmentOrder {
    /// A, B, C, LUT. The streaming wire order.
    #[default]
    Canonical,
    /// A, B, LUT, C, as written by the older bare-metal driver.
    LutBeforeC,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InferParams {
    pub schedule: Schedule,
    pub order: SegmentOrder,
}

/// Everything one inference run consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub a: QVec<A_LEN>,
    pub b: QVec<B_LEN>,
    pub c: QVec<C_LEN>,
    pub lut: ActivationLut,
}

impl NetworkParams {
    pub fn read_from<S: ScalarSource + ?Sized>(source: &mut S, order: SegmentOrder) -> Result<Self> {
        let a: QVec<A_LEN> = load_ordered(source, Segment::A)?;
        let b: QVec<B_LEN> = load_ordered(source, Segment::B)?;
        let (c, lut): (QVec<C_LEN>, QVec<LUT_LEN>) = match order {
            SegmentOrder::Canonical => {
                let c = load_ordered(source, Segment::C)?;
                (c, load_ordered(source, Segment::Lut)?)
            }
            SegmentOrder::LutBeforeC => {
                let lut = load_ordered(source, Segment::Lut)?;
                (load_ordered(source, Segment::C)?, lut)
            }
        };
        debug!("loaded network params ({:?} order)", order);
        Ok(Self { a, b, c, lut: ActivationLut::new(lut) })
    }

    /// Flattens back into the canonical 723-word message.
    pub fn to_words(&self) -> Vec<i32> {
        let mut words = Vec::with_capacity(INPUT_WORDS);
        words.extend_from_slice(self.a.as_slice());
        words.extend_from_slice(self.b.as_slice());
        words.extend_from_slice(self.c.as_slice());
        words.extend_from_slice(self.lut.table().as_slice());
        words
    }
}

/// The two-layer network; shared by the sequential driver and the stream adapter.
pub struct Network<'a> {
    params: &'a NetworkParams,
}

impl<'a> Network<'a> {
    pub fn new(params: &'a NetworkParams) -> Self { Self { params } }

    pub fn hidden(&self, schedule: Schedule) -> QVec<HIDDEN_LEN> {
        LayerPipeline::new(&self.params.lut).forward(&self.params.a, &self.params.b, schedule)
    }

    pub fn forward(&self, schedule: Schedule) -> QVec<OUTPUT_LEN> {
        let hidden = self.hidden(schedule);
        OutputProjector::new(self.params.c.clone()).project(&hidden)
    }
}

/// Sequential form: read one message from `source`, run it, return the result.
pub fn infer<S: ScalarSource + ?Sized>(source: &mut S, params: InferParams) -> Result<QVec<OUTPUT_LEN>> {
    let net_params = NetworkParams::read_from(source, params.order)?;
    Ok(Network::new(&net_params).forward(params.schedule))
}
