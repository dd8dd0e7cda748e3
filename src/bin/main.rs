//! CLI for haar-denoise
//!
//! ```bash
//! haar-denoise denoise input.png -o output.png -t 0.08
//! haar-denoise denoise photo.jpg -o out.png --convert-gray --restore-size
//! haar-denoise info input.png
//! haar-denoise serve --addr 0.0.0.0:8000 --archive-dir images
//! ```

use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use haar_denoise::io::{self, ChannelPolicy};
use haar_denoise::metrics::{band_energy, psnr};
use haar_denoise::{DenoiseConfig, Denoiser, Haar2D, SampleMatrix, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(
    name = "haar-denoise",
    version,
    about = "Single-level Haar wavelet denoising for grayscale images"
)]
struct Cli {
    /// Log pipeline stages (equivalent to RUST_LOG=haar_denoise=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputOpts {
    /// Input image (png, jpeg, bmp, pnm, tiff)
    input: String,
    /// Coefficient cutoff in normalized [0, 1] units
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Convert color images to grayscale instead of rejecting them
    #[arg(long)]
    convert_gray: bool,
}

impl InputOpts {
    fn policy(&self) -> ChannelPolicy {
        if self.convert_gray {
            ChannelPolicy::Convert
        } else {
            ChannelPolicy::Strict
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Denoise an image and write the result
    Denoise {
        #[command(flatten)]
        opts: InputOpts,
        /// Output file; the format follows the extension
        #[arg(short, long)]
        output: String,
        /// Resize the result back to the input dimensions
        #[arg(long)]
        restore_size: bool,
    },
    /// Show dimensions and coefficient statistics of an image
    Info {
        #[command(flatten)]
        opts: InputOpts,
    },
    /// Serve POST /process-image over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: std::net::SocketAddr,
        /// Coefficient cutoff in normalized [0, 1] units
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Keep a copy of every result here as output_<timestamp>.png
        #[arg(long)]
        archive_dir: Option<std::path::PathBuf>,
        /// Resize results back to the upload dimensions
        #[arg(long)]
        restore_size: bool,
        /// Largest accepted request body, in bytes
        #[arg(long, default_value_t = haar_denoise::http::DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "haar_denoise=debug"
    } else {
        "haar_denoise=info"
    };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = default.parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Denoise {
            opts,
            output,
            restore_size,
        } => cmd_denoise(&opts, &output, restore_size),
        Commands::Info { opts } => cmd_info(&opts),
        #[cfg(feature = "server")]
        Commands::Serve {
            addr,
            threshold,
            archive_dir,
            restore_size,
            max_upload_bytes,
        } => cmd_serve(
            threshold,
            haar_denoise::http::ServerConfig {
                addr,
                archive_dir,
                restore_size,
                max_upload_bytes,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn cmd_denoise(opts: &InputOpts, output: &str, restore_size: bool) -> Result<()> {
    let denoiser = Denoiser::new(DenoiseConfig::default().with_threshold(opts.threshold))
        .context("invalid configuration")?;
    let img = io::load_gray(&opts.input, opts.policy()).with_context(|| format!("load {}", opts.input))?;
    let (w, h) = img.dimensions();

    let (out, stats) = io::denoise_image(&img, &denoiser, restore_size)
        .with_context(|| format!("denoise {}", opts.input))?;

    // Quality against an input of the same size as the result.
    let db = if restore_size {
        psnr(img.as_raw(), out.as_raw())?
    } else {
        psnr(io::resize_to_pow2(&img)?.as_raw(), out.as_raw())?
    };

    io::save_gray(&out, output).with_context(|| format!("write {output}"))?;

    let (ow, oh) = out.dimensions();
    eprintln!(
        "denoised {w}x{h} -> {ow}x{oh} (threshold={}, {:.1}% zeroed, PSNR={db:.2} dB) -> {output}",
        opts.threshold,
        stats.sparsity() * 100.0,
    );
    Ok(())
}

fn cmd_info(opts: &InputOpts) -> Result<()> {
    let denoiser = Denoiser::new(DenoiseConfig::default().with_threshold(opts.threshold))
        .context("invalid configuration")?;
    let img = io::load_gray(&opts.input, opts.policy()).with_context(|| format!("load {}", opts.input))?;
    let (w, h) = img.dimensions();
    let resized = io::resize_to_pow2(&img).with_context(|| format!("resize {}", opts.input))?;
    let (tw, th) = resized.dimensions();
    let scale = denoiser.config().sample_scale;
    let samples = SampleMatrix::from_u8(resized.as_raw(), th as usize, tw as usize, scale)?;
    let coeffs = Haar2D::new().forward(samples)?;
    debug!(coefficients = coeffs.as_slice().len(), "computed forward transform");

    let out = denoiser.process(resized.as_raw(), th as usize, tw as usize)?;

    println!("haar-denoise image info");
    println!("  File:        {}", opts.input);
    println!("  Size:        {w}x{h}");
    println!("  Transform:   {tw}x{th}{}", if (tw, th) == (w, h) { "" } else { " (resized)" });
    println!("  Threshold:   {}", opts.threshold);
    println!("  Band energy:");
    let total = coeffs.energy();
    for (band, e) in band_energy(&coeffs) {
        let share = if total > 0.0 { e / total * 100.0 } else { 0.0 };
        println!("    {:<2}  {e:>14.4}  ({share:5.1}%)", band.name());
    }
    println!(
        "  Retained:    {} / {} coefficients ({:.1}% zeroed)",
        out.stats.retained,
        out.stats.total,
        out.stats.sparsity() * 100.0
    );

    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(threshold: f64, config: haar_denoise::http::ServerConfig) -> Result<()> {
    let denoiser =
        Denoiser::new(DenoiseConfig::default().with_threshold(threshold)).context("invalid configuration")?;
    let addr = config.addr;
    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime
        .block_on(haar_denoise::http::serve(denoiser, config))
        .with_context(|| format!("serve on {addr}"))
}
