use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use q8infer::net::loader::{load_ordered, ScalarSource, TextSource};
use q8infer::net::OUTPUT_LEN;
use q8infer::stream::{run_message, ChannelAdapter};
use q8infer::{InferError, Network, NetworkParams, QVec, Schedule, Segment, SegmentOrder};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "q8-testbench", about = "Stream test vectors through the adapter and check the results")]
struct Args {
    /// Test vectors: one or more 723-word messages (A, B, C, LUT)
    #[arg(long)]
    vectors: PathBuf,

    /// Expected outputs, 64 words per case; defaults to the sequential reference
    #[arg(long)]
    expected: Option<PathBuf>,

    /// Print every mismatching word
    #[arg(long)]
    verbose: bool,
}

fn open_source(path: &Path) -> Result<TextSource<BufReader<File>>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(TextSource::new(BufReader::new(f)))
}

/// Reads whole messages until the source ends on a message boundary.
fn read_cases<S: ScalarSource>(source: &mut S) -> Result<Vec<NetworkParams>> {
    let mut cases = Vec::new();
    loop {
        match NetworkParams::read_from(source, SegmentOrder::Canonical) {
            Ok(p) => cases.push(p),
            Err(InferError::Starved { segment: Segment::A, received: 0, .. }) => break,
            Err(e) => return Err(e).with_context(|| format!("read test case {}", cases.len())),
        }
    }
    Ok(cases)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cases = read_cases(&mut open_source(&args.vectors)?)?;
    if cases.is_empty() {
        bail!("no test cases in {}", args.vectors.display());
    }
    let expected: Vec<QVec<OUTPUT_LEN>> = match &args.expected {
        Some(path) => {
            let mut src = open_source(path)?;
            (0..cases.len())
                .map(|i| load_ordered(&mut src, Segment::Output).with_context(|| format!("read expected output {}", i)))
                .collect::<Result<_>>()?
        }
        None => cases.iter().map(|p| Network::new(p).forward(Schedule::Sequential)).collect(),
    };
    info!("loaded {} test case(s)", cases.len());

    let pb = ProgressBar::new(cases.len() as u64);
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} cases").unwrap_or_else(|_| ProgressStyle::default_bar()));

    let mut failed = 0usize;
    for (case, (params, want)) in cases.iter().zip(&expected).enumerate() {
        let got = run_message(ChannelAdapter::new(), &params.to_words()).with_context(|| format!("stream test case {}", case))?;
        if got != *want {
            failed += 1;
            let bad = got.iter().zip(want.iter()).filter(|(g, w)| g != w).count();
            warn!("case {}: {} of {} words differ", case, bad, OUTPUT_LEN);
            if args.verbose {
                for (i, (g, w)) in got.iter().zip(want.iter()).enumerate().filter(|(_, (g, w))| g != w) {
                    pb.println(format!("case {} word {}: got {} expected {}", case, i, g, w));
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failed > 0 {
        println!("Test Failed ({} of {} cases)", failed, cases.len());
        std::process::exit(1);
    }
    println!("Test Success");
    Ok(())
}
