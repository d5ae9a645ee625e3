/*!
    Shared types for the monoeye media crates.

    This crate defines the vocabulary that crosses crate boundaries. It has
    no dependency on FFmpeg, so the transform and packaging logic can be
    used and tested without native libraries.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time base units
    - [`PlanarImage`] and [`PlanarView`] - Owned and borrowed 4:2:0 frames
    - [`Region`] - A luma-coordinate sub-rectangle of a frame
    - [`EncodedUnit`] - One compressed unit emitted by an encoder
    - [`Packet`] - A timestamped container packet

    # Bitstream Framing

    - [`bitstream`] - Annex-B and length-prefixed NAL unit framing

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

pub mod bitstream;
mod codec;
mod error;
mod packet;
mod planar;
mod rational;
mod region;
mod timestamp;
mod unit;

pub use codec::CodecId;
pub use error::{Error, Result};
pub use packet::Packet;
pub use planar::{PlanarImage, PlanarView, Plane, PlaneIndex, PlaneRef};
pub use rational::Rational;
pub use region::Region;
pub use timestamp::{MediaDuration, Pts};
pub use unit::{EncodedUnit, UnitType};
