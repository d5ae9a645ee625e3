/*!
    File-backed frame source using FFmpeg demuxing and decoding.
*/

use std::{fmt, io, path::Path};

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    format::{self, Pixel, context::Input},
    media,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_types::{Error, PlanarView, PlaneIndex, PlaneRef, Pts, Rational, Result};

use crate::{DecodedFrame, FrameSource};

/**
    Frame source reading the best video stream of a media file.

    Frames must be 8-bit 4:2:0. Decoding is single-pass and in decode order.
*/
pub struct FileSource {
    input: Input,
    decoder: VideoDecoderFFmpeg,
    stream_index: usize,
    time_base: Rational,
    frame_rate: Option<Rational>,
    frame: VideoFrameFFmpeg,
    eof_sent: bool,
}

impl FileSource {
    /**
        Open a media file and prepare a decoder for its video stream.
    */
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        ffmpeg_next::init().map_err(|e| Error::decode(e.to_string()))?;

        let input = format::input(&path).map_err(|e| {
            Error::Io(io::Error::other(format!(
                "could not open '{}': {e}",
                path.display()
            )))
        })?;

        let (stream_index, time_base, frame_rate, parameters) = {
            let stream = input.streams().best(media::Type::Video).ok_or_else(|| {
                Error::unsupported_format(format!("'{}' has no video stream", path.display()))
            })?;
            let time_base = from_ffmpeg_rational(stream.time_base())
                .unwrap_or_else(|| Rational::per_second(90_000));
            let rate = stream.avg_frame_rate();
            let frame_rate = (rate.numerator() > 0)
                .then(|| from_ffmpeg_rational(rate))
                .flatten();
            (stream.index(), time_base, frame_rate, stream.parameters())
        };

        let decoder = codec::context::Context::from_parameters(parameters)
            .and_then(|context| context.decoder().video())
            .map_err(|e| Error::unsupported_format(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            width = decoder.width(),
            height = decoder.height(),
            format = ?decoder.format(),
            time_base = %time_base,
            frame_rate = ?frame_rate,
            "opened input"
        );

        Ok(Self {
            input,
            decoder,
            stream_index,
            time_base,
            frame_rate,
            frame: VideoFrameFFmpeg::empty(),
            eof_sent: false,
        })
    }

    /**
        Time base of the input stream's timestamps.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Pull frames until one is ready, feeding packets as needed.

        Returns None once the decoder is fully drained.
    */
    fn advance(&mut self) -> Option<Result<()>> {
        loop {
            match self.decoder.receive_frame(&mut self.frame) {
                Ok(()) => return Some(Ok(())),
                Err(ffmpeg_next::Error::Eof) => return None,
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {}
                Err(e) => return Some(Err(Error::decode(e.to_string()))),
            }

            if self.eof_sent {
                return None;
            }

            let sent = match self.next_packet() {
                Some(packet) => self.decoder.send_packet(&packet),
                None => {
                    self.eof_sent = true;
                    self.decoder.send_eof()
                }
            };
            if let Err(e) = sent {
                return Some(Err(Error::decode(e.to_string())));
            }
        }
    }

    fn next_packet(&mut self) -> Option<ffmpeg_next::Packet> {
        for (stream, packet) in self.input.packets() {
            if stream.index() == self.stream_index {
                return Some(packet);
            }
        }
        None
    }

    fn current(&self) -> Result<DecodedFrame<'_>> {
        let frame = &self.frame;
        match frame.format() {
            Pixel::YUV420P | Pixel::YUVJ420P => {}
            other => {
                return Err(Error::unsupported_format(format!(
                    "decoded pixel format {other:?} is not 8-bit 4:2:0"
                )));
            }
        }

        let (width, height) = (frame.width(), frame.height());
        let plane = |index: PlaneIndex| {
            let (w, h) = index.dimensions(width, height);
            PlaneRef::new(
                frame.data(index.index()),
                w,
                h,
                frame.stride(index.index()),
            )
        };
        let image = PlanarView::new(
            width,
            height,
            [
                plane(PlaneIndex::Y)?,
                plane(PlaneIndex::U)?,
                plane(PlaneIndex::V)?,
            ],
        )?;

        Ok(DecodedFrame {
            image,
            pts: frame.pts().or_else(|| frame.timestamp()).map(Pts),
            time_base: self.time_base,
        })
    }
}

impl FrameSource for FileSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    fn frame_rate(&self) -> Option<Rational> {
        self.frame_rate
    }

    fn next_frame(&mut self) -> Option<Result<DecodedFrame<'_>>> {
        if let Err(e) = self.advance()? {
            return Some(Err(e));
        }
        Some(self.current())
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("stream_index", &self.stream_index)
            .field("time_base", &self.time_base)
            .field("frame_rate", &self.frame_rate)
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}

fn from_ffmpeg_rational(rational: ffmpeg_next::Rational) -> Option<Rational> {
    (rational.denominator() != 0).then(|| Rational::new(rational.numerator(), rational.denominator()))
}
