// Q8 fixed-point inference: one network, a sequential driver and a streaming adapter
pub mod error;
pub mod net;
pub mod report;
pub mod stream;

pub use error::{InferError, Result, Segment};
pub use net::layer::Schedule;
pub use net::quant::{QVec, Q8};
pub use net::{infer, InferParams, Network, NetworkParams, SegmentOrder};
pub use stream::{ChannelAdapter, Word};
