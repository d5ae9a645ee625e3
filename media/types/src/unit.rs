/*!
    Encoded unit type.
*/

use crate::CodecId;

/**
    The type tag of an encoded unit.

    Holds the NAL unit type together with the codec that defines its meaning.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitType {
    pub codec: CodecId,
    pub nal_type: u8,
}

impl UnitType {
    pub const fn new(codec: CodecId, nal_type: u8) -> Self {
        Self { codec, nal_type }
    }

    /**
        Returns true for header/parameter units (VPS, SPS, PPS).
    */
    pub const fn is_header(self) -> bool {
        self.codec.is_parameter_set(self.nal_type)
    }

    /**
        Returns true for units that can be decoded without prior units.
    */
    pub const fn is_random_access(self) -> bool {
        self.codec.is_random_access(self.nal_type)
    }
}

/**
    One compressed unit produced by an encoder.

    The payload is the raw NAL unit without any start code or length prefix.
    Units are produced per submitted picture, consumed immediately by the
    packager and never retained.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedUnit {
    pub unit_type: UnitType,
    pub payload: Vec<u8>,
}

impl EncodedUnit {
    /**
        Create a unit with an explicit type tag.
    */
    pub fn new(unit_type: UnitType, payload: Vec<u8>) -> Self {
        Self { unit_type, payload }
    }

    /**
        Create a unit, reading its type tag from the NAL header byte.

        Returns None for an empty payload.
    */
    pub fn parse(codec: CodecId, payload: Vec<u8>) -> Option<Self> {
        let header = *payload.first()?;
        let unit_type = UnitType::new(codec, codec.nal_type(header));
        Some(Self { unit_type, payload })
    }

    pub fn is_header(&self) -> bool {
        self.unit_type.is_header()
    }

    pub fn is_random_access(&self) -> bool {
        self.unit_type.is_random_access()
    }

    /**
        Payload length in bytes.
    */
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

static_assertions::assert_impl_all!(EncodedUnit: Send, Sync);
