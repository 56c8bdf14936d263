use anyhow::{Context, Result};
use clap::Parser;
use q8infer::net::lut::ActivationLut;
use q8infer::{Network, NetworkParams, QVec, Schedule};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "q8-gen-vectors", about = "Generate random test vectors with a hard-sigmoid LUT")]
struct Args {
    #[arg(long, default_value_t = 1)]
    cases: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Largest magnitude of a first-layer weight
    #[arg(long, default_value_t = 64)]
    max_weight: i32,
    /// Vectors file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write the sequential reference outputs here
    #[arg(long)]
    expected: Option<PathBuf>,
}

fn random_params(rng: &mut SmallRng, max_weight: i32) -> NetworkParams {
    NetworkParams {
        a: QVec::from_fn(|_| rng.gen_range(0..=255)),
        b: QVec::from_fn(|_| rng.gen_range(-max_weight..=max_weight)),
        c: QVec::from_fn(|_| rng.gen_range(-256..=256)),
        lut: ActivationLut::hard_sigmoid(),
    }
}

fn write_csv_line<W: Write>(w: &mut W, values: &[i32]) -> io::Result<()> {
    let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    writeln!(w, "{}", line.join(","))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let cases: Vec<NetworkParams> = (0..args.cases).map(|_| random_params(&mut rng, args.max_weight.max(1))).collect();

    let mut out: Box<dyn Write> = match &args.out {
        Some(p) => Box::new(BufWriter::new(File::create(p).with_context(|| format!("create {}", p.display()))?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for p in &cases {
        write_csv_line(&mut out, &p.to_words())?;
    }
    out.flush()?;

    if let Some(path) = &args.expected {
        let mut w = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
        for p in &cases {
            write_csv_line(&mut w, Network::new(p).forward(Schedule::Sequential).as_slice())?;
        }
        w.flush()?;
    }
    log::info!("wrote {} case(s) with seed {}", cases.len(), args.seed);
    Ok(())
}
