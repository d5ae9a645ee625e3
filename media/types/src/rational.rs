/*!
    Exact ratios for time bases and frame rates.
*/

use std::fmt;

/**
    A ratio `num/den` with a non-zero denominator.

    Time bases are written as `1/ticks` (1/48000 for the output container),
    frame rates as `frames/1` (50/1 for the stereo source).
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "rational with zero denominator");
        Self { num, den }
    }

    /**
        Time base of `ticks` ticks per second.
    */
    #[inline]
    pub const fn per_second(ticks: u32) -> Self {
        Self::new(1, ticks as i32)
    }

    /**
        Seconds covered by `count` units of this time base.
    */
    #[inline]
    pub fn seconds(self, count: i64) -> f64 {
        count as f64 * f64::from(self.num) / f64::from(self.den)
    }

    /**
        The ratio as a whole number, if it is one.
    */
    pub fn as_integer(self) -> Option<i32> {
        (self.num % self.den == 0).then(|| self.num / self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "zero denominator")]
    fn zero_denominator_panics() {
        Rational::new(1, 0);
    }

    #[test]
    fn per_second_is_a_unit_fraction() {
        let tb = Rational::per_second(48000);
        assert_eq!((tb.num, tb.den), (1, 48000));
    }

    #[test]
    fn seconds_scale_by_the_ratio() {
        let tb = Rational::per_second(48000);
        assert_eq!(tb.seconds(96000), 2.0);
        assert_eq!(tb.seconds(960), 0.02);
    }

    #[test]
    fn whole_frame_rates() {
        assert_eq!(Rational::new(50, 1).as_integer(), Some(50));
        assert_eq!(Rational::new(100, 2).as_integer(), Some(50));
        assert_eq!(Rational::new(30000, 1001).as_integer(), None);
    }

    #[test]
    fn formats_as_fraction() {
        assert_eq!(Rational::new(1, 48000).to_string(), "1/48000");
        assert_eq!(format!("{:?}", Rational::new(25, 1)), "25/1");
    }
}
