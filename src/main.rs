use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use q8infer::net::loader::{ScalarSource, TextSource};
use q8infer::report::{write_results, Mode, RunReport};
use q8infer::stream::{run_message, ChannelAdapter};
use q8infer::net::OUTPUT_LEN;
use q8infer::{infer, InferParams, NetworkParams, QVec, Schedule, SegmentOrder};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Read and compute in-process
    Sequential,
    /// Frame the message as words through the streaming adapter
    Stream,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    /// A, B, C, LUT
    Canonical,
    /// A, B, LUT, C
    LutBeforeC,
}

#[derive(Parser, Debug)]
#[command(name = "q8infer", version, about = "Run one Q8 fixed-point inference pass")]
struct Args {
    /// Comma/whitespace separated integers; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Sequential)]
    mode: ModeArg,

    /// Segment order of the input; stream mode re-frames to canonical on the wire
    #[arg(long, value_enum, default_value_t = OrderArg::Canonical)]
    order: OrderArg,

    /// Run the two first-layer lanes concurrently in sequential mode
    #[arg(long, default_value_t = false)]
    parallel_lanes: bool,

    /// Rayon worker threads (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Print a JSON report instead of one value per line
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn run<S: ScalarSource>(source: &mut S, args: &Args) -> Result<RunReport> {
    let order = match args.order {
        OrderArg::Canonical => SegmentOrder::Canonical,
        OrderArg::LutBeforeC => SegmentOrder::LutBeforeC,
    };
    let t0 = Instant::now();
    let (mode, schedule, output) = match args.mode {
        ModeArg::Sequential => {
            let schedule = if args.parallel_lanes { Schedule::ParallelLanes } else { Schedule::Sequential };
            let out = infer(source, InferParams { schedule, order }).context("sequential inference")?;
            (Mode::Sequential, schedule, out)
        }
        ModeArg::Stream => {
            let params = NetworkParams::read_from(source, order).context("read input message")?;
            let adapter = ChannelAdapter::new();
            let out: QVec<OUTPUT_LEN> = run_message(adapter, &params.to_words()).context("streamed inference")?;
            (Mode::Stream, adapter.schedule(), out)
        }
    };
    let elapsed_us = t0.elapsed().as_micros();
    info!("{:?} inference finished in {} us", mode, elapsed_us);
    Ok(RunReport { mode, schedule, order, elapsed_us, output: output.to_vec() })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("configure rayon pool")?;
    }

    let report = match &args.input {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("open input: {}", path.display()))?;
            run(&mut TextSource::new(BufReader::new(f)), &args)?
        }
        None => run(&mut TextSource::new(io::stdin().lock()), &args)?,
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        write_results(io::stdout().lock(), &report.output).context("write results")?;
    }
    Ok(())
}
