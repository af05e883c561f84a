//! Synthetic accelerometer frame generator
//!
//! Emits raw 12-byte frames (three little-endian f32 values) on stdout
//! at a fixed rate, for exercising the pipeline without hardware:
//!
//! ```bash
//! frame-gen --freq 5 --rate 100 | accelspec --stdin
//! ```
//!
//! The x axis carries a sine at the requested frequency; y and z carry
//! only noise. With the defaults the analyzer should report a dominant
//! peak near 5 Hz within one bin width.

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use std::io::Write;
use std::time::Duration;

use accelspec::encode_frame;

#[derive(Parser, Debug)]
#[command(name = "frame-gen")]
#[command(about = "Emit synthetic accelerometer frames on stdout")]
struct CliArgs {
    /// Sine frequency on the x axis (Hz)
    #[arg(long, default_value_t = 5.0)]
    freq: f64,

    /// Emission rate (frames per second)
    #[arg(long, default_value_t = 100.0)]
    rate: f64,

    /// Sine amplitude
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,

    /// Uniform noise amplitude added to every axis
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Number of frames to emit (0 = run until killed)
    #[arg(long, default_value_t = 0)]
    count: u64,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    if args.rate <= 0.0 {
        anyhow::bail!("rate must be positive");
    }

    let period = Duration::from_secs_f64(1.0 / args.rate);
    let mut rng = rand::thread_rng();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut emitted = 0u64;
    loop {
        if args.count > 0 && emitted >= args.count {
            break;
        }

        let t = emitted as f64 / args.rate;
        let mut noise = || -> f64 {
            if args.noise > 0.0 {
                rng.gen_range(-args.noise..args.noise)
            } else {
                0.0
            }
        };
        let x = args.amplitude * (2.0 * std::f64::consts::PI * args.freq * t).sin() + noise();
        let y = noise();
        let z = noise();

        let frame = encode_frame(x as f32, y as f32, z as f32);
        out.write_all(&frame).context("stdout closed")?;
        out.flush().context("stdout closed")?;

        emitted += 1;
        std::thread::sleep(period);
    }

    Ok(())
}
