/*!
    Frame sources for the monoeye media crates.

    A [`FrameSource`] yields decoded 4:2:0 frames in decode order. The
    frames borrow the source's internal buffers, so each one must be
    consumed before the next is requested.

    # Basic Usage

    ```ignore
    use media_decode::{FileSource, FrameSource};

    let mut source = FileSource::open("stereo.mp4")?;
    let (width, height) = source.dimensions();

    while let Some(frame) = source.next_frame() {
        match frame {
            Ok(frame) => process(&frame.image),
            Err(e) if e.is_recoverable() => continue,
            Err(e) => return Err(e),
        }
    }
    ```

    # Errors

    A frame that fails to decode is reported as a recoverable
    [`Error::Decode`]. The source stays usable and later frames are still
    delivered. Anything else ends the stream for good.
*/

pub use media_types::{Error, PlanarView, Pts, Rational, Result};

mod file;

pub use file::FileSource;

/**
    One decoded frame, borrowed from its source.
*/
#[derive(Clone, Copy, Debug)]
pub struct DecodedFrame<'a> {
    /// The picture.
    pub image: PlanarView<'a>,
    /// Timestamp reported by the demuxer, if any.
    pub pts: Option<Pts>,
    /// Time base of `pts`.
    pub time_base: Rational,
}

/**
    A source of decoded frames.
*/
pub trait FrameSource {
    /**
        Nominal frame dimensions, known before the first frame is read.
    */
    fn dimensions(&self) -> (u32, u32);

    /**
        Nominal frame rate, if the source reports one.
    */
    fn frame_rate(&self) -> Option<Rational>;

    /**
        Decode the next frame.

        Returns None at end of stream.
    */
    fn next_frame(&mut self) -> Option<Result<DecodedFrame<'_>>>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn frame_rate(&self) -> Option<Rational> {
        (**self).frame_rate()
    }

    fn next_frame(&mut self) -> Option<Result<DecodedFrame<'_>>> {
        (**self).next_frame()
    }
}
