//! Word-stream form of the network: a `(data, last)` transducer over
//! bounded channels that hold at most one in-flight word.

use crate::error::{InferError, Result, Segment};
use crate::net::layer::Schedule;
use crate::net::loader::ScalarSource;
use crate::net::quant::{QVec, Q8};
use crate::net::{Network, NetworkParams, SegmentOrder, INPUT_WORDS, OUTPUT_LEN};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, trace};
use std::thread::{self, JoinHandle};

/// One beat on the stream: a data word plus the end-of-message flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Word {
    pub data: Q8,
    pub last: bool,
}

impl Word {
    pub fn new(data: Q8, last: bool) -> Self { Self { data, last } }
}

pub type WordSender = Sender<Word>;

/// Receiving end. Reads block until a word arrives; a dropped sender ends the source.
pub struct WordReceiver {
    rx: Receiver<Word>,
}

impl WordReceiver {
    pub fn recv(&self) -> Option<Word> { self.rx.recv().ok() }
}

impl ScalarSource for WordReceiver {
    fn next_scalar(&mut self) -> Result<Option<Q8>> {
        let word = self.recv();
        if let Some(w) = word {
            trace!("rx word {} last={}", w.data, w.last);
        }
        Ok(word.map(|w| w.data))
    }
}

/// Channel with room for a single word: a put blocks until the previous word is taken.
pub fn word_channel() -> (WordSender, WordReceiver) {
    let (tx, rx) = bounded(1);
    (tx, WordReceiver { rx })
}

/// Blocking put; fails once the consumer is gone.
pub fn put(tx: &WordSender, word: Word) -> Result<()> {
    tx.send(word).map_err(|_| InferError::Disconnected)
}

/// Streaming coprocessor. Input framing is by fixed segment counts (A, B, C,
/// LUT); the `last` flag on input words is not consulted.
#[derive(Debug, Clone, Copy)]
pub struct ChannelAdapter {
    schedule: Schedule,
}

impl ChannelAdapter {
    pub fn new() -> Self { Self { schedule: Schedule::ParallelLanes } }

    pub fn with_schedule(schedule: Schedule) -> Self { Self { schedule } }

    pub fn schedule(&self) -> Schedule { self.schedule }

    /// Consumes one input message and emits the 64 result words, the last
    /// one flagged. Returns the result as well for host-side checks.
    pub fn process(&self, input: &mut WordReceiver, output: &WordSender) -> Result<QVec<OUTPUT_LEN>> {
        let params = NetworkParams::read_from(input, SegmentOrder::Canonical)?;
        debug!("adapter received full message");
        let res = Network::new(&params).forward(self.schedule);
        for (i, &v) in res.iter().enumerate() {
            put(output, Word::new(v, i == OUTPUT_LEN - 1))?;
        }
        debug!("adapter emitted {} words", OUTPUT_LEN);
        Ok(res)
    }

    /// Runs `process` for one message on its own thread. Returns the host's
    /// input sender, the host's output receiver and the worker handle.
    pub fn spawn(self) -> (WordSender, WordReceiver, JoinHandle<Result<QVec<OUTPUT_LEN>>>) {
        let (in_tx, mut in_rx) = word_channel();
        let (out_tx, out_rx) = word_channel();
        let handle = thread::spawn(move || self.process(&mut in_rx, &out_tx));
        (in_tx, out_rx, handle)
    }
}

impl Default for ChannelAdapter {
    fn default() -> Self { Self::new() }
}

/// Host side: sends one message, flagging its final word.
pub fn transmit(tx: &WordSender, words: &[Q8]) -> Result<()> {
    let n = words.len();
    for (i, &v) in words.iter().enumerate() {
        put(tx, Word::new(v, i + 1 == n))?;
    }
    Ok(())
}

/// Host side: reads exactly 64 words and checks that only the 64th is flagged.
pub fn receive(rx: &WordReceiver) -> Result<QVec<OUTPUT_LEN>> {
    let mut out = QVec::<OUTPUT_LEN>::zeroed();
    for (i, slot) in out.as_mut_slice().iter_mut().enumerate() {
        let word = rx
            .recv()
            .ok_or(InferError::Starved { segment: Segment::Output, expected: OUTPUT_LEN, received: i })?;
        let is_final = i == OUTPUT_LEN - 1;
        if word.last && !is_final {
            return Err(InferError::Framing { index: i, reason: "end-of-message flag before word 64" });
        }
        if !word.last && is_final {
            return Err(InferError::Framing { index: i, reason: "missing end-of-message flag on word 64" });
        }
        *slot = word.data;
    }
    Ok(out)
}

/// One full round trip through a fresh adapter thread: transmit, receive, join.
/// Messages longer than one frame are rejected up front; the adapter would
/// stop reading after `INPUT_WORDS` and the host would never drain its output.
pub fn run_message(adapter: ChannelAdapter, words: &[Q8]) -> Result<QVec<OUTPUT_LEN>> {
    if words.len() > INPUT_WORDS {
        return Err(InferError::Length { expected: INPUT_WORDS, actual: words.len() });
    }
    let (tx, rx, handle) = adapter.spawn();
    let sent = transmit(&tx, words);
    drop(tx);
    let received = receive(&rx);
    drop(rx);
    let worker = handle.join().unwrap_or(Err(InferError::Disconnected));
    // Worker errors first: a starved adapter also starves the host.
    worker?;
    sent?;
    received
}
