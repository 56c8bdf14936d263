use crate::net::layer::Schedule;
use crate::net::quant::Q8;
use crate::net::SegmentOrder;
use serde::Serialize;
use std::io::Write;

/// Output sink: one integer per line, in index order.
pub fn write_results<W: Write>(mut w: W, values: &[Q8]) -> std::io::Result<()> {
    for v in values {
        writeln!(w, "{}", v)?;
    }
    w.flush()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Sequential,
    Stream,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub schedule: Schedule,
    pub order: SegmentOrder,
    pub elapsed_us: u128,
    pub output: Vec<Q8>,
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }
}
