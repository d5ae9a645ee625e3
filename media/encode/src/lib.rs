/*!
    Picture encoding for the monoeye media crates.

    This crate defines the [`Encoder`] capability the pipeline drives and
    provides an FFmpeg-backed HEVC implementation using libx265.

    # Example

    ```ignore
    use media_encode::{Encoder, EncoderConfig, EncoderParams, HevcEncoder};

    let params = EncoderParams::new(200, 200, 50, Rational::per_second(48000));
    let mut encoder = HevcEncoder::new(&EncoderConfig::default(), params)?;

    // Parameter sets, once before any picture
    let headers = encoder.headers()?;

    // Zero or more units per picture, the encoder may hold pictures back
    let units = encoder.encode(&picture, Pts(0), true)?;

    // Drain at end of stream
    while let Some(units) = encoder.flush()? {
        // Package units
    }
    ```

    # Configuration

    [`EncoderConfig`] is immutable once the encoder is built. It carries the
    preset, rate control, GOP structure and parallelism settings that are
    handed to the codec library.
*/

pub use media_types::{CodecId, EncodedUnit, Error, PlanarImage, Pts, Rational, Result};

mod config;
mod hevc;

pub use config::{EncoderConfig, EncoderParams, Preset, Tune};
pub use hevc::HevcEncoder;

/**
    A picture encoder producing NAL units.

    Units come back synchronously. Because of lookahead and B-frame
    reordering, a call may return units for an earlier picture, or none.
*/
pub trait Encoder {
    /**
        The codec of the emitted units.
    */
    fn codec(&self) -> CodecId;

    /**
        Header/parameter units. Called once, before any picture is submitted.
    */
    fn headers(&mut self) -> Result<Vec<EncodedUnit>>;

    /**
        Submit one picture with its presentation timestamp.

        `force_keyframe` requests a random access picture.
    */
    fn encode(
        &mut self,
        picture: &PlanarImage,
        pts: Pts,
        force_keyframe: bool,
    ) -> Result<Vec<EncodedUnit>>;

    /**
        Drain buffered pictures at end of stream.

        Returns the units of one picture per call, and None once the encoder
        has nothing left.
    */
    fn flush(&mut self) -> Result<Option<Vec<EncodedUnit>>>;
}

impl<E: Encoder + ?Sized> Encoder for &mut E {
    fn codec(&self) -> CodecId {
        (**self).codec()
    }

    fn headers(&mut self) -> Result<Vec<EncodedUnit>> {
        (**self).headers()
    }

    fn encode(
        &mut self,
        picture: &PlanarImage,
        pts: Pts,
        force_keyframe: bool,
    ) -> Result<Vec<EncodedUnit>> {
        (**self).encode(picture, pts, force_keyframe)
    }

    fn flush(&mut self) -> Result<Option<Vec<EncodedUnit>>> {
        (**self).flush()
    }
}
