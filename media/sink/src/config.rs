/*!
    Sink configuration types.
*/

use std::path::Path;

use media_types::{CodecId, MediaDuration, Rational};

/**
    Output container format.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// Raw elementary stream, every unit prefixed by a start code.
    #[default]
    AnnexB,
    /// Fragmented MP4 fed one packet per submitted frame.
    FragmentedMp4,
}

impl ContainerFormat {
    /**
        Pick the container from an output path.

        An `.mp4` extension selects fragmented MP4, anything else is raw.
    */
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mp4") => Self::FragmentedMp4,
            _ => Self::AnnexB,
        }
    }

    /**
        Get the FFmpeg format name for this container, if it is muxed by FFmpeg.
    */
    pub fn ffmpeg_format_name(self) -> Option<&'static str> {
        match self {
            Self::AnnexB => None,
            Self::FragmentedMp4 => Some("mp4"),
        }
    }
}

/**
    Configuration for a packager.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Codec of the packaged units.
    pub codec: CodecId,
    /// Picture width in pixels.
    pub width: u32,
    /// Picture height in pixels.
    pub height: u32,
    /// Time base of all packet timestamps.
    pub time_base: Rational,
    /// Duration of one output frame, also the flush timestamp step.
    pub frame_duration: MediaDuration,
    /// Nominal bitrate in bit/s, advisory for the container.
    pub bit_rate: u64,
}

impl SinkConfig {
    /**
        Create a new sink configuration.
    */
    pub fn new(codec: CodecId, time_base: Rational, frame_duration: MediaDuration) -> Self {
        Self {
            codec,
            width: 0,
            height: 0,
            time_base,
            frame_duration,
            bit_rate: 0,
        }
    }

    /**
        Set the picture dimensions.
    */
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /**
        Set the nominal bitrate.
    */
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }
}

/**
    Stream description handed to a muxer before any packet.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Codec of the stream.
    pub codec: CodecId,
    /// Picture width in pixels.
    pub width: u32,
    /// Picture height in pixels.
    pub height: u32,
    /// Time base of packet timestamps.
    pub time_base: Rational,
    /// Nominal bitrate in bit/s.
    pub bit_rate: u64,
    /// Header units, each with a 4-byte big-endian length prefix.
    pub header_block: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_extension_selects_fragmented_output() {
        assert_eq!(
            ContainerFormat::from_path("out/left.mp4"),
            ContainerFormat::FragmentedMp4
        );
        assert_eq!(
            ContainerFormat::from_path("LEFT.MP4"),
            ContainerFormat::FragmentedMp4
        );
    }

    #[test]
    fn other_paths_select_raw_output() {
        assert_eq!(ContainerFormat::from_path("left.h265"), ContainerFormat::AnnexB);
        assert_eq!(ContainerFormat::from_path("left.mp4.bak"), ContainerFormat::AnnexB);
        assert_eq!(ContainerFormat::from_path("mp4"), ContainerFormat::AnnexB);
    }

    #[test]
    fn builder_sets_fields() {
        let config = SinkConfig::new(CodecId::H265, Rational::per_second(48000), MediaDuration(960))
            .with_dimensions(200, 200)
            .with_bit_rate(3_000_000);
        assert_eq!((config.width, config.height), (200, 200));
        assert_eq!(config.bit_rate, 3_000_000);
        assert_eq!(config.frame_duration, MediaDuration(960));
    }
}
