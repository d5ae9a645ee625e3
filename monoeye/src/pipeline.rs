/*!
    The decode, transform, encode and package loop.
*/

use std::fmt;

use media_decode::FrameSource;
use media_encode::Encoder;
use media_sink::{Packager, PackagerStats};
use media_transform::VideoTransform;
use media_types::{Error, Result};

use crate::decimate::{Decision, FrameDecimator, TimestampPolicy};

/// Emitted frames between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 10;

/**
    Counters for one pipeline run.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames decoded successfully.
    pub frames_decoded: u64,
    /// Frames handed to the encoder.
    pub frames_encoded: u64,
    /// Frames dropped by decimation.
    pub frames_dropped: u64,
    /// Frames that failed to decode and were skipped.
    pub decode_failures: u64,
    /// Batches drained from the encoder at end of stream.
    pub flushed_batches: u64,
    /// Output counters.
    pub output: PackagerStats,
}

/**
    Drives frames from a source through the transform and encoder into a
    packager.

    Decode failures are logged and skipped. Any other failure stops the run;
    after an encode failure the encoder is still drained, and the output is
    always finalized on a best-effort basis before the error is returned.
*/
pub struct Pipeline<'a, S, E> {
    source: S,
    encoder: E,
    transform: VideoTransform,
    decimator: FrameDecimator,
    packager: Packager<'a>,
    stats: PipelineStats,
}

impl<'a, S, E> Pipeline<'a, S, E>
where
    S: FrameSource,
    E: Encoder,
{
    /**
        Assemble a pipeline.

        Fails with an invalid geometry error if the source's frames cannot be
        split into two eyes.
    */
    pub fn new(
        source: S,
        encoder: E,
        transform: VideoTransform,
        policy: TimestampPolicy,
        packager: Packager<'a>,
    ) -> Result<Self> {
        let (width, height) = source.dimensions();
        transform.validate_input(width, height)?;

        Ok(Self {
            source,
            encoder,
            transform,
            decimator: FrameDecimator::new(policy),
            packager,
            stats: PipelineStats::default(),
        })
    }

    /**
        Run until the source is exhausted, then drain the encoder and finalize
        the output.
    */
    pub fn run(mut self) -> Result<PipelineStats> {
        let policy = *self.decimator.policy();
        tracing::info!(
            input_rate = policy.input_rate(),
            output_rate = policy.effective_rate(),
            frame_duration = policy.frame_duration().0,
            time_base = %policy.time_base(),
            "starting pipeline"
        );

        let result = match self.encode_frames() {
            Ok(()) => self.drain(),
            Err(e @ Error::Encode { .. }) => {
                if let Err(drain) = self.drain() {
                    tracing::warn!(error = %drain, "could not drain encoder after failure");
                }
                Err(e)
            }
            Err(e) => Err(e),
        };
        let finished = self.packager.finish();
        self.stats.output = self.packager.stats();

        match (result, finished) {
            (Err(e), finished) => {
                if let Err(close) = finished {
                    tracing::warn!(error = %close, "could not finalize output after failure");
                }
                Err(e)
            }
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => {
                let stats = self.stats;
                tracing::info!(
                    decoded = stats.frames_decoded,
                    encoded = stats.frames_encoded,
                    dropped = stats.frames_dropped,
                    decode_failures = stats.decode_failures,
                    packets = stats.output.packets,
                    bytes = stats.output.bytes,
                    "processed {} frames out of {} input frames",
                    stats.frames_encoded,
                    stats.frames_decoded
                );
                Ok(stats)
            }
        }
    }

    fn encode_frames(&mut self) -> Result<()> {
        let headers = self.encoder.headers()?;
        self.packager.start(&headers)?;

        loop {
            let frame = match self.source.next_frame() {
                None => return Ok(()),
                Some(Ok(frame)) => frame,
                Some(Err(e)) if e.is_recoverable() => {
                    self.stats.decode_failures += 1;
                    tracing::warn!(error = %e, "skipping frame that failed to decode");
                    continue;
                }
                Some(Err(e)) => return Err(e),
            };
            self.stats.frames_decoded += 1;

            let timing = match self.decimator.next_frame() {
                Decision::Keep(timing) => timing,
                Decision::Drop { input_index } => {
                    self.stats.frames_dropped += 1;
                    tracing::trace!(input_index, "dropping frame");
                    continue;
                }
            };

            let input_pts = frame.pts.map_or(timing.input_index as i64, |pts| pts.0);
            let time_base = self.decimator.policy().time_base();
            tracing::debug!(
                input_index = timing.input_index,
                input_pts,
                input_secs = frame.time_base.seconds(input_pts),
                output_pts = timing.pts.0,
                output_secs = timing.pts.to_duration(time_base).as_secs_f64(),
                "encoding frame"
            );

            let picture = self.transform.transform(&frame.image)?;
            let units = self
                .encoder
                .encode(picture, timing.pts, timing.force_keyframe)?;
            self.packager.write_frame(&units, timing.pts)?;
            self.stats.frames_encoded += 1;

            if self.stats.frames_encoded % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    frames = self.stats.frames_encoded,
                    "encoded {} frames",
                    self.stats.frames_encoded
                );
            }
        }
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(units) = self.encoder.flush()? {
            self.stats.flushed_batches += 1;
            self.packager.write_flushed(&units)?;
        }
        Ok(())
    }
}

impl<S, E> fmt::Debug for Pipeline<'_, S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("transform", &self.transform)
            .field("decimator", &self.decimator)
            .field("packager", &self.packager)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
