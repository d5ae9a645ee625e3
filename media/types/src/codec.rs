/*!
    Codec identification.
*/

/**
    Codec identifiers for the elementary streams this pipeline produces.

    Both codecs carry NAL units, but they place the unit type in a
    different part of the header byte and number their types differently.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    #[default]
    H265,
}

impl CodecId {
    /**
        Extract the NAL unit type from the first header byte.
    */
    pub const fn nal_type(self, header: u8) -> u8 {
        match self {
            Self::H264 => header & 0x1F,
            Self::H265 => (header >> 1) & 0x3F,
        }
    }

    /**
        Returns true if the NAL type is a parameter set (VPS, SPS, PPS).
    */
    pub const fn is_parameter_set(self, nal_type: u8) -> bool {
        match self {
            Self::H264 => matches!(nal_type, 7 | 8),
            Self::H265 => matches!(nal_type, 32..=34),
        }
    }

    /**
        Returns true if the NAL type starts a random access point.

        For HEVC this is the IRAP range (BLA, IDR and CRA pictures).
    */
    pub const fn is_random_access(self, nal_type: u8) -> bool {
        match self {
            Self::H264 => nal_type == 5,
            Self::H265 => matches!(nal_type, 16..=21),
        }
    }
}
