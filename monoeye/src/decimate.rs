/*!
    Frame decimation and output timestamp generation.
*/

use media_types::{Error, MediaDuration, Pts, Rational, Result};

/**
    Maps output frame indices to timestamps.

    With `decimation` N, one of every N input frames is kept and the output
    runs at `input_rate / N` frames per second. Timestamps count ticks of a
    `1/ticks_per_second` time base, so one output frame lasts
    `ticks_per_second / (input_rate / N)` ticks. Both divisions must be exact.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampPolicy {
    input_rate: u32,
    decimation: u32,
    ticks_per_second: u32,
}

impl TimestampPolicy {
    pub const DEFAULT_TICKS_PER_SECOND: u32 = 48_000;

    /**
        Create a policy, failing with a configuration error if the output
        frame duration is not a whole number of ticks.
    */
    pub fn new(input_rate: u32, decimation: u32, ticks_per_second: u32) -> Result<Self> {
        if input_rate == 0 || decimation == 0 || ticks_per_second == 0 {
            return Err(Error::configuration(format!(
                "frame rate {input_rate}, decimation {decimation} and time base \
                 1/{ticks_per_second} must all be non-zero"
            )));
        }
        if i32::try_from(ticks_per_second).is_err() {
            return Err(Error::configuration(format!(
                "time base 1/{ticks_per_second} is too fine"
            )));
        }
        if input_rate % decimation != 0 {
            return Err(Error::configuration(format!(
                "frame rate {input_rate} is not divisible by decimation {decimation}"
            )));
        }
        let effective_rate = input_rate / decimation;
        if ticks_per_second % effective_rate != 0 {
            return Err(Error::configuration(format!(
                "time base 1/{ticks_per_second} cannot represent {effective_rate} fps exactly"
            )));
        }

        Ok(Self {
            input_rate,
            decimation,
            ticks_per_second,
        })
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn decimation(&self) -> u32 {
        self.decimation
    }

    pub fn is_decimating(&self) -> bool {
        self.decimation > 1
    }

    /**
        Output frames per second.
    */
    pub fn effective_rate(&self) -> u32 {
        self.input_rate / self.decimation
    }

    /**
        Time base of the generated timestamps.
    */
    pub fn time_base(&self) -> Rational {
        Rational::per_second(self.ticks_per_second)
    }

    /**
        Duration of one output frame in ticks.
    */
    pub fn frame_duration(&self) -> MediaDuration {
        MediaDuration(i64::from(self.ticks_per_second / self.effective_rate()))
    }

    /**
        Timestamp of the `output_index`-th emitted frame.
    */
    pub fn pts(&self, output_index: u64) -> Pts {
        self.frame_duration().nth(output_index)
    }

    /**
        Whether the `input_index`-th decoded frame is kept.
    */
    pub fn keeps(&self, input_index: u64) -> bool {
        input_index % u64::from(self.decimation) == 0
    }
}

/**
    Timing of a frame that goes on to the encoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    /// Position among successfully decoded frames.
    pub input_index: u64,
    /// Position among emitted frames.
    pub output_index: u64,
    /// Output timestamp.
    pub pts: Pts,
    /// Set for the first emitted frame only.
    pub force_keyframe: bool,
}

/**
    What to do with a decoded frame.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Keep(FrameTiming),
    Drop { input_index: u64 },
}

/**
    Counts decoded frames and decides which ones are emitted.

    Feed it one call per successfully decoded frame; failed decodes do not
    count.
*/
#[derive(Clone, Debug)]
pub struct FrameDecimator {
    policy: TimestampPolicy,
    input_count: u64,
    output_count: u64,
}

impl FrameDecimator {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self {
            policy,
            input_count: 0,
            output_count: 0,
        }
    }

    pub fn policy(&self) -> &TimestampPolicy {
        &self.policy
    }

    /**
        Frames seen so far.
    */
    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    /**
        Frames kept so far.
    */
    pub fn output_count(&self) -> u64 {
        self.output_count
    }

    /**
        Decide the fate of the next decoded frame.
    */
    pub fn next_frame(&mut self) -> Decision {
        let input_index = self.input_count;
        self.input_count += 1;

        if !self.policy.keeps(input_index) {
            return Decision::Drop { input_index };
        }

        let output_index = self.output_count;
        self.output_count += 1;

        Decision::Keep(FrameTiming {
            input_index,
            output_index,
            pts: self.policy.pts(output_index),
            force_keyframe: output_index == 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kept(decimator: &mut FrameDecimator, frames: usize) -> Vec<FrameTiming> {
        (0..frames)
            .filter_map(|_| match decimator.next_frame() {
                Decision::Keep(timing) => Some(timing),
                Decision::Drop { .. } => None,
            })
            .collect()
    }

    #[test]
    fn every_frame_kept_without_decimation() {
        let policy = TimestampPolicy::new(50, 1, 48_000).unwrap();
        assert_eq!(policy.frame_duration(), MediaDuration(960));

        let mut decimator = FrameDecimator::new(policy);
        let timings = kept(&mut decimator, 4);
        let pts: Vec<_> = timings.iter().map(|t| t.pts.0).collect();
        assert_eq!(pts, [0, 960, 1920, 2880]);
        assert!(timings[0].force_keyframe);
        assert!(timings[1..].iter().all(|t| !t.force_keyframe));
    }

    #[test]
    fn even_frames_kept_when_skipping() {
        let policy = TimestampPolicy::new(50, 2, 48_000).unwrap();
        assert_eq!(policy.effective_rate(), 25);
        assert_eq!(policy.frame_duration(), MediaDuration(1920));

        let mut decimator = FrameDecimator::new(policy);
        let timings = kept(&mut decimator, 4);
        let indices: Vec<_> = timings.iter().map(|t| (t.input_index, t.pts.0)).collect();
        assert_eq!(indices, [(0, 0), (2, 1920)]);
        assert_eq!(decimator.input_count(), 4);
        assert_eq!(decimator.output_count(), 2);
    }

    #[test]
    fn dropped_frames_report_their_index() {
        let mut decimator = FrameDecimator::new(TimestampPolicy::new(30, 3, 90_000).unwrap());
        assert!(matches!(decimator.next_frame(), Decision::Keep(_)));
        assert_eq!(decimator.next_frame(), Decision::Drop { input_index: 1 });
        assert_eq!(decimator.next_frame(), Decision::Drop { input_index: 2 });
        let Decision::Keep(timing) = decimator.next_frame() else {
            panic!("fourth frame should be kept");
        };
        assert_eq!(timing.pts, Pts(9000));
    }

    #[test]
    fn inexact_durations_are_configuration_errors() {
        for (rate, decimation, ticks) in [(7, 1, 48_000), (25, 2, 48_000), (50, 0, 48_000), (0, 1, 48_000)] {
            assert!(
                matches!(
                    TimestampPolicy::new(rate, decimation, ticks),
                    Err(Error::Configuration { .. })
                ),
                "{rate} fps / {decimation} at 1/{ticks}"
            );
        }
    }

    #[test]
    fn time_base_matches_ticks() {
        let policy = TimestampPolicy::new(50, 1, TimestampPolicy::DEFAULT_TICKS_PER_SECOND).unwrap();
        assert_eq!(policy.time_base(), Rational::new(1, 48_000));
        assert_eq!(policy.pts(3), Pts(2880));
    }
}
