/*!
    Timestamps and durations counted in time base ticks.
*/

use std::ops::Add;
use std::time::Duration;

use crate::Rational;

/**
    Presentation timestamp in ticks of the stream's time base.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    pub const ZERO: Self = Self(0);

    /**
        Offset from the start of the stream. Negative timestamps map to zero.
    */
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }
}

impl Add<MediaDuration> for Pts {
    type Output = Self;

    fn add(self, rhs: MediaDuration) -> Self {
        Self(self.0 + rhs.0)
    }
}

/**
    A span of time base ticks, such as the length of one frame.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }

    /**
        Timestamp of frame `index` when frames are this far apart.
    */
    #[inline]
    pub fn nth(self, index: u64) -> Pts {
        Pts(self.0 * index as i64)
    }
}

fn ticks_to_duration(ticks: i64, time_base: Rational) -> Duration {
    let nanos = i128::from(ticks) * i128::from(time_base.num) * 1_000_000_000
        / i128::from(time_base.den);
    u64::try_from(nanos).map_or(Duration::ZERO, Duration::from_nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT_TB: Rational = Rational::per_second(48000);

    #[test]
    fn one_frame_at_fifty_fps() {
        assert_eq!(Pts(960).to_duration(OUTPUT_TB), Duration::from_millis(20));
        assert_eq!(MediaDuration(48000).to_duration(OUTPUT_TB), Duration::from_secs(1));
    }

    #[test]
    fn negative_ticks_are_zero() {
        assert_eq!(Pts(-100).to_duration(OUTPUT_TB), Duration::ZERO);
    }

    #[test]
    fn stepping_by_a_duration() {
        assert_eq!(Pts(1920) + MediaDuration(960), Pts(2880));
        assert!(Pts(1920) < Pts(1920) + MediaDuration(1));
    }

    #[test]
    fn nth_frame_timestamp() {
        let tick = MediaDuration(1920);
        assert_eq!(tick.nth(0), Pts::ZERO);
        assert_eq!(tick.nth(3), Pts(5760));
    }
}
