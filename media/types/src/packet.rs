/*!
    Container packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    A timestamped container packet.

    Holds the picture units of one submitted frame, framed the way the
    container stores samples. Packets are the unit of data between the
    packager and the muxer.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp. Decode timestamp is the same.
    pub pts: Pts,
    /// Display time of the frame, one output frame interval.
    pub duration: MediaDuration,
    /// Time base of `pts` and `duration`.
    pub time_base: Rational,
    /// Whether this packet starts at a random access point.
    pub is_keyframe: bool,
}

impl Packet {
    /**
        Create a new packet.
    */
    pub fn new(
        data: Vec<u8>,
        pts: Pts,
        duration: MediaDuration,
        time_base: Rational,
        is_keyframe: bool,
    ) -> Self {
        Self {
            data,
            pts,
            duration,
            time_base,
            is_keyframe,
        }
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);
