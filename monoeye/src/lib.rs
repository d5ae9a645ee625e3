/*!
    Single-eye extraction and re-encoding of side-by-side stereo video.

    Each decoded stereo frame is cut down to one eye, scaled to a small
    square picture and encoded as HEVC. The result is written either as a raw
    Annex-B stream or as fragmented MP4, depending on the output path.

    The pieces live in the `media-*` crates. This crate holds the frame
    decimation policy, the run settings and the [`Pipeline`] that ties them
    together.
*/

pub mod decimate;
pub mod pipeline;
pub mod settings;

pub use decimate::{Decision, FrameDecimator, FrameTiming, TimestampPolicy};
pub use pipeline::{PROGRESS_INTERVAL, Pipeline, PipelineStats};
pub use settings::Settings;
