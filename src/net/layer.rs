use super::lut::ActivationLut;
use super::quant::{dot_windows, QVec};
use super::{A_LEN, B_LEN, C_LEN, HIDDEN_LEN, LANE_OUTPUTS, LANE_WEIGHTS, OUTPUT_LEN};
use log::debug;

/// How the two first-layer lanes are scheduled. Both give identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub enum Schedule {
    #[default]
    Sequential,
    /// Both lanes run concurrently and join before concatenation.
    ParallelLanes,
}

/// Deinterleaves the first-layer weights: even indices feed lane 1, odd
/// indices feed lane 2. Each lane's bias is element 0 of its own slice.
pub fn split_lanes(b: &QVec<B_LEN>) -> (QVec<LANE_WEIGHTS>, QVec<LANE_WEIGHTS>) {
    let even = QVec::from_fn(|k| b[2 * k]);
    let odd = QVec::from_fn(|k| b[2 * k + 1]);
    (even, odd)
}

/// Lane 1 occupies `0..64`, lane 2 `64..128`.
pub fn concat(lane1: &QVec<LANE_OUTPUTS>, lane2: &QVec<LANE_OUTPUTS>) -> QVec<HIDDEN_LEN> {
    QVec::from_fn(|i| if i < LANE_OUTPUTS { lane1[i] } else { lane2[i - LANE_OUTPUTS] })
}

/// First layer: two dot-product lanes with LUT activation.
pub struct LayerPipeline<'a> {
    lut: &'a ActivationLut,
}

impl<'a> LayerPipeline<'a> {
    pub fn new(lut: &'a ActivationLut) -> Self { Self { lut } }

    pub fn run_lane(&self, a: &QVec<A_LEN>, weights: &QVec<LANE_WEIGHTS>) -> QVec<LANE_OUTPUTS> {
        let raw: QVec<LANE_OUTPUTS> = dot_windows(a, weights);
        self.lut.activate(&raw)
    }

    pub fn forward(&self, a: &QVec<A_LEN>, b: &QVec<B_LEN>, schedule: Schedule) -> QVec<HIDDEN_LEN> {
        let (w1, w2) = split_lanes(b);
        let (lane1, lane2) = match schedule {
            Schedule::Sequential => (self.run_lane(a, &w1), self.run_lane(a, &w2)),
            Schedule::ParallelLanes => rayon::join(|| self.run_lane(a, &w1), || self.run_lane(a, &w2)),
        };
        debug!("first layer done ({:?}), lane biases {} / {}", schedule, w1[0], w2[0]);
        concat(&lane1, &lane2)
    }
}

/// Second layer: linear projection of the hidden vector, no activation.
#[derive(Debug, Clone)]
pub struct OutputProjector {
    weights: QVec<C_LEN>,
}

impl OutputProjector {
    pub fn new(weights: QVec<C_LEN>) -> Self { Self { weights } }

    pub fn project(&self, hidden: &QVec<HIDDEN_LEN>) -> QVec<OUTPUT_LEN> {
        dot_windows(hidden, &self.weights)
    }
}
