//! amrwav CLI - WAV/AMR speech conversion
//!
//! A command-line tool for converting voice recordings between WAV and AMR

use amrwav_lib::format::{
    detect_container, detect_format_from_extension, get_format_info, AmrVariant, ContainerKind,
};
use amrwav_lib::probe::MediaProbe;
use amrwav_lib::{init, AmrConverter, Config, ConversionStats, LoopbackEngine};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "amrwav")]
#[command(about = "amrwav - WAV/AMR speech conversion", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Number of threads to use
    #[arg(short = 't', long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a WAV file to AMR
    Encode {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output AMR file
        #[arg(short, long)]
        output: PathBuf,

        /// AMR variant
        #[arg(long, value_enum, default_value = "auto")]
        variant: VariantArg,
    },

    /// Decode an AMR file to WAV
    Decode {
        /// Input AMR file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file (default: <stem>_fromAmr.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show information about a WAV or AMR file
    Info {
        /// Input file path
        input: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Convert many files in parallel
    Batch {
        /// Target container (default: from each input's extension)
        #[arg(long, value_enum)]
        to: Option<BatchTarget>,

        /// Output directory (default: next to each input)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List available codecs
    Codecs,

    /// List available formats
    Formats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// Narrowband, 8000 Hz
    Nb,
    /// Wideband, 16000 Hz
    Wb,
    /// Wideband at 16000 Hz and above, narrowband otherwise
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BatchTarget {
    /// Encode WAV inputs to AMR
    Amr,
    /// Decode AMR inputs to WAV
    Wav,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize the library
    let config = Config {
        max_threads: cli.threads,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init(config)?;

    info!("amrwav v{}", amrwav_lib::VERSION);

    let converter = AmrConverter::new(LoopbackEngine::new());

    match cli.command {
        Commands::Encode {
            input,
            output,
            variant,
        } => {
            info!("Encoding {} -> {}", input.display(), output.display());
            cmd_encode(&converter, &input, &output, variant)?;
        }
        Commands::Decode { input, output } => {
            let output = output.unwrap_or_else(|| default_wav_output(&input, None));
            info!("Decoding {} -> {}", input.display(), output.display());
            cmd_decode(&converter, &input, &output)?;
        }
        Commands::Info { input, json } => {
            cmd_info(&input, json)?;
        }
        Commands::Batch {
            to,
            out_dir,
            inputs,
        } => {
            cmd_batch(&converter, to, out_dir.as_deref(), &inputs)?;
        }
        Commands::Codecs => {
            cmd_codecs()?;
        }
        Commands::Formats => {
            cmd_formats()?;
        }
    }

    Ok(())
}

fn cmd_encode(
    converter: &AmrConverter<LoopbackEngine>,
    input: &Path,
    output: &Path,
    variant: VariantArg,
) -> anyhow::Result<()> {
    let stats = encode_file(converter, input, output, variant)?;

    println!("Input:  {} ({} bytes)", input.display(), stats.input_bytes);
    println!("Output: {} ({} bytes)", output.display(), stats.output_bytes);
    println!("Frames: {}", stats.frames);
    if stats.discarded_bytes > 0 {
        println!("Dropped: {} bytes of partial frame", stats.discarded_bytes);
    }
    Ok(())
}

fn cmd_decode(
    converter: &AmrConverter<LoopbackEngine>,
    input: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let stats = decode_file(converter, input, output)?;

    println!("Input:  {} ({} bytes)", input.display(), stats.input_bytes);
    println!("Output: {} ({} bytes)", output.display(), stats.output_bytes);
    println!("Frames: {} ({} bad)", stats.frames + stats.bad_frames, stats.bad_frames);
    if stats.discarded_bytes > 0 {
        println!("Dropped: {} trailing bytes", stats.discarded_bytes);
    }
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> anyhow::Result<()> {
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let info = MediaProbe::new(&bytes)
        .analyze()
        .with_context(|| format!("Failed to probe {}", input.display()))?;

    if json {
        println!("{}", info.to_json()?);
    } else {
        println!("File: {}", input.display());
        println!();
        print!("{}", info);
    }
    Ok(())
}

fn cmd_batch(
    converter: &AmrConverter<LoopbackEngine>,
    to: Option<BatchTarget>,
    out_dir: Option<&Path>,
    inputs: &[PathBuf],
) -> anyhow::Result<()> {
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let results: Vec<(&PathBuf, anyhow::Result<(PathBuf, ConversionStats)>)> = inputs
        .par_iter()
        .map(|input| {
            let result = match to {
                Some(target) => Ok(target),
                None => target_for_extension(input),
            }
            .and_then(|target| batch_convert(converter, input, target, out_dir));
            (input, result)
        })
        .collect();

    println!("{:<40} {:<40} {:>8}", "Input", "Output", "Frames");
    println!("─────────────────────────────────────────────────────────────────────────────────────────");

    let mut failed = 0;
    for (input, result) in &results {
        match result {
            Ok((output, stats)) => println!(
                "{:<40} {:<40} {:>8}",
                input.display(),
                output.display(),
                stats.frames
            ),
            Err(e) => {
                failed += 1;
                println!("{:<40} error: {:#}", input.display(), e);
            }
        }
    }

    println!();
    println!("{} converted, {} failed", results.len() - failed, failed);

    if failed > 0 {
        anyhow::bail!("{} of {} conversions failed", failed, results.len());
    }
    Ok(())
}

fn cmd_codecs() -> anyhow::Result<()> {
    use amrwav_lib::codec::get_codec_info;

    println!("Available Codecs:");
    println!("─────────────────────────────────────────────────────────");
    println!("{:<8} {:<8} {:<10} {:<30}", "ID", "Rate", "Bitrate", "Description");
    println!("─────────────────────────────────────────────────────────");

    for codec_id in ["amr-nb", "amr-wb"] {
        if let Some(info) = get_codec_info(codec_id) {
            println!(
                "{:<8} {:<8} {:<10} {:<30}",
                info.id,
                info.sample_rate,
                format!("{:.2}k", info.bitrate as f64 / 1000.0),
                info.long_name
            );
        }
    }
    Ok(())
}

fn cmd_formats() -> anyhow::Result<()> {
    println!("Formats:");
    println!("─────────────────────────────────────────────────────────");

    for kind in [ContainerKind::Wav, ContainerKind::AmrNb, ContainerKind::AmrWb] {
        if let Some(info) = get_format_info(kind.name()) {
            println!(
                "{:<6} {:<40} .{}",
                info.name,
                info.long_name,
                info.extensions.join(", .")
            );
        }
    }
    Ok(())
}

// ============================================================================
// File helpers
// ============================================================================

fn encode_file(
    converter: &AmrConverter<LoopbackEngine>,
    input: &Path,
    output: &Path,
    variant: VariantArg,
) -> anyhow::Result<ConversionStats> {
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let variant = resolve_variant(&bytes, variant)?;
    write_encoded(converter, &bytes, output, variant)
        .with_context(|| format!("Failed to encode {}", input.display()))
}

fn write_encoded(
    converter: &AmrConverter<LoopbackEngine>,
    wave: &[u8],
    output: &Path,
    variant: AmrVariant,
) -> anyhow::Result<ConversionStats> {
    let (amr, stats) = converter.encode_with_stats(wave, variant)?;
    fs::write(output, &amr).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(stats)
}

fn decode_file(
    converter: &AmrConverter<LoopbackEngine>,
    input: &Path,
    output: &Path,
) -> anyhow::Result<ConversionStats> {
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let variant = match detect_container(&bytes).and_then(|kind| kind.amr_variant()) {
        Some(variant) => variant,
        None => anyhow::bail!("{} is not an AMR file", input.display()),
    };

    let (wave, stats) = converter
        .decode_with_stats(&bytes, variant)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    fs::write(output, &wave).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(stats)
}

fn batch_convert(
    converter: &AmrConverter<LoopbackEngine>,
    input: &Path,
    target: BatchTarget,
    out_dir: Option<&Path>,
) -> anyhow::Result<(PathBuf, ConversionStats)> {
    match target {
        BatchTarget::Amr => {
            let bytes =
                fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
            let variant = resolve_variant(&bytes, VariantArg::Auto)?;
            let output = default_amr_output(input, variant, out_dir);
            let stats = write_encoded(converter, &bytes, &output, variant)?;
            Ok((output, stats))
        }
        BatchTarget::Wav => {
            let output = default_wav_output(input, out_dir);
            let stats = decode_file(converter, input, &output)?;
            Ok((output, stats))
        }
    }
}

/// WAV inputs are encoded, AMR inputs decoded
fn target_for_extension(input: &Path) -> anyhow::Result<BatchTarget> {
    match detect_format_from_extension(&input.to_string_lossy()) {
        Some("wav") => Ok(BatchTarget::Amr),
        Some("amr") | Some("awb") => Ok(BatchTarget::Wav),
        _ => anyhow::bail!(
            "Cannot infer target for {}; pass --to amr or --to wav",
            input.display()
        ),
    }
}

/// Resolve `auto` against the WAV's sample rate
fn resolve_variant(wave: &[u8], variant: VariantArg) -> anyhow::Result<AmrVariant> {
    match variant {
        VariantArg::Nb => Ok(AmrVariant::Narrowband),
        VariantArg::Wb => Ok(AmrVariant::Wideband),
        VariantArg::Auto => {
            let parsed = amrwav_lib::format::wav::parse(wave)?;
            Ok(AmrVariant::for_sample_rate(parsed.format.sample_rate))
        }
    }
}

fn output_path(input: &Path, out_dir: Option<&Path>, file_name: String) -> PathBuf {
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn default_wav_output(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    output_path(input, out_dir, format!("{}_fromAmr.wav", file_stem(input)))
}

fn default_amr_output(input: &Path, variant: AmrVariant, out_dir: Option<&Path>) -> PathBuf {
    let ext = ContainerKind::from(variant).name();
    output_path(input, out_dir, format!("{}.{}", file_stem(input), ext))
}
