use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use media_decode::{FileSource, FrameSource};
use media_encode::{Encoder, EncoderParams, HevcEncoder};
use media_sink::{ContainerFormat, FragmentedMp4Muxer, Packager, SinkConfig};
use media_transform::{Eye, ExtractMode};
use monoeye::{Pipeline, PipelineStats, Settings};

#[derive(Parser, Debug)]
#[command(name = "monoeye")]
#[command(about = "Extract one eye of a side-by-side stereo video and re-encode it as HEVC")]
struct Args {
    /// Side-by-side stereo input video
    input: PathBuf,

    /// Output path, `.mp4` for fragmented MP4, anything else for a raw HEVC stream
    output: PathBuf,

    /// Pass `skip` to keep every other input frame
    #[arg(value_enum)]
    frames: Option<FrameSelection>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Eye to keep
    #[arg(long, value_enum)]
    eye: Option<EyeArg>,

    /// Output width and height in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Input frame rate, overrides the rate reported by the input
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Crop through an intermediate copy instead of resampling in place
    #[arg(long)]
    copy_crop: bool,

    /// Log every frame
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FrameSelection {
    /// Keep every other frame, halving the frame rate
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EyeArg {
    Left,
    Right,
}

impl From<EyeArg> for Eye {
    fn from(eye: EyeArg) -> Self {
        match eye {
            EyeArg::Left => Eye::Left,
            EyeArg::Right => Eye::Right,
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/**
    Exit status for a command line that could not be parsed.

    Help and version requests succeed. Every usage error exits with 1, like
    any other failure.
*/
fn usage_exit_code(error: &clap::Error) -> u8 {
    if error.exit_code() == 0 { 0 } else { 1 }
}

fn run(args: &Args) -> Result<PipelineStats> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(eye) = args.eye {
        settings.eye = eye.into();
    }
    if let Some(size) = args.size {
        settings.width = size;
        settings.height = size;
    }
    if args.frame_rate.is_some() {
        settings.frame_rate = args.frame_rate;
    }
    if args.copy_crop {
        settings.extract = ExtractMode::Copy;
    }
    if args.frames == Some(FrameSelection::Skip) {
        settings.decimation = 2;
    }

    let source = FileSource::open(&args.input)
        .with_context(|| format!("failed to open input {}", args.input.display()))?;
    let (width, height) = source.dimensions();
    let input_rate = source
        .frame_rate()
        .and_then(|rate| rate.as_integer())
        .and_then(|rate| u32::try_from(rate).ok());

    let (policy, transform) = settings
        .prepare(width, height, input_rate)
        .with_context(|| format!("cannot process {}", args.input.display()))?;

    let params = EncoderParams::new(
        settings.width,
        settings.height,
        policy.effective_rate(),
        policy.time_base(),
    );
    let encoder = HevcEncoder::new(&settings.encoder, params)?;

    let sink_config = SinkConfig::new(encoder.codec(), policy.time_base(), policy.frame_duration())
        .with_dimensions(settings.width, settings.height)
        .with_bit_rate(settings.encoder.bit_rate());
    let format = ContainerFormat::from_path(&args.output);

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        ?format,
        input_size = %format_args!("{width}x{height}"),
        output_size = %format_args!("{}x{}", settings.width, settings.height),
        eye = ?settings.eye,
        skip = policy.is_decimating(),
        "processing"
    );

    let packager = match format {
        ContainerFormat::AnnexB => {
            let file = File::create(&args.output)
                .with_context(|| format!("failed to create {}", args.output.display()))?;
            Packager::raw(BufWriter::new(file), sink_config)
        }
        ContainerFormat::FragmentedMp4 => {
            Packager::fragmented(FragmentedMp4Muxer::create(&args.output)?, sink_config)
        }
    };

    let stats = Pipeline::new(source, encoder, transform, policy, packager)?.run()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_output_exits_with_failure() {
        let err = Args::try_parse_from(["monoeye", "in"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn unknown_frame_selection_exits_with_failure() {
        let err = Args::try_parse_from(["monoeye", "in.mp4", "out.mp4", "nope"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_exits_with_success() {
        let err = Args::try_parse_from(["monoeye", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn skip_selects_decimation() {
        let args = Args::try_parse_from(["monoeye", "in.mp4", "out.hevc", "skip"]).unwrap();
        assert_eq!(args.frames, Some(FrameSelection::Skip));
        assert_eq!(args.output, PathBuf::from("out.hevc"));

        let args = Args::try_parse_from(["monoeye", "in.mp4", "out.hevc"]).unwrap();
        assert_eq!(args.frames, None);
    }
}
