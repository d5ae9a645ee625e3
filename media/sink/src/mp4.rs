/*!
    Fragmented MP4 muxer backed by FFmpeg.
*/

use std::{
    fmt,
    path::{Path, PathBuf},
};

use ffmpeg_next::{Dictionary, codec, encoder, ffi, format, packet};

use media_types::{CodecId, Error, Packet, Rational, Result, bitstream};

use crate::{ContainerFormat, Muxer, StreamConfig};

const MOVFLAGS: &str = "frag_keyframe+empty_moov+default_base_moof";

/**
    Writes a single video stream as fragmented MP4.

    Every keyframe starts a new fragment and the `moov` box is written up
    front, so the file is playable while it is still being written.
*/
pub struct FragmentedMp4Muxer {
    path: PathBuf,
    output: format::context::Output,
    stream_time_base: Option<ffmpeg_next::Rational>,
    closed: bool,
}

impl FragmentedMp4Muxer {
    /**
        Create the output file.
    */
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format_name = ContainerFormat::FragmentedMp4
            .ffmpeg_format_name()
            .unwrap_or("mp4");

        ffmpeg_next::init().map_err(|e| Error::mux_write(e.to_string()))?;

        let output = format::output_as(&path, format_name).map_err(|e| {
            Error::mux_write(format!("could not create '{}': {e}", path.display()))
        })?;

        Ok(Self {
            path,
            output,
            stream_time_base: None,
            closed: false,
        })
    }

    fn add_stream(&mut self, config: &StreamConfig) -> Result<()> {
        // FFmpeg builds the sample entry from Annex-B extradata
        let extradata = bitstream::length_prefixed_to_annexb(&config.header_block)
            .ok_or_else(|| Error::mux_write("malformed header block"))?;

        let codec_id = match config.codec {
            CodecId::H264 => ffi::AVCodecID::AV_CODEC_ID_H264,
            CodecId::H265 => ffi::AVCodecID::AV_CODEC_ID_HEVC,
            other => {
                return Err(Error::unsupported_format(format!(
                    "{other:?} cannot be muxed into MP4"
                )));
            }
        };

        let mut stream = self
            .output
            .add_stream(encoder::find(codec::Id::None))
            .map_err(|e| Error::mux_write(e.to_string()))?;
        stream.set_time_base(to_ffmpeg_rational(config.time_base));

        unsafe {
            let par = (*stream.as_mut_ptr()).codecpar;
            (*par).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
            (*par).codec_id = codec_id;
            (*par).width = config.width as i32;
            (*par).height = config.height as i32;
            (*par).format = ffi::AVPixelFormat::AV_PIX_FMT_YUV420P as i32;
            (*par).bit_rate = config.bit_rate as i64;

            if !extradata.is_empty() {
                let size = extradata.len();
                let buf = ffi::av_mallocz(size + ffi::AV_INPUT_BUFFER_PADDING_SIZE as usize)
                    as *mut u8;
                if buf.is_null() {
                    return Err(Error::mux_write("failed to allocate codec extradata"));
                }
                std::ptr::copy_nonoverlapping(extradata.as_ptr(), buf, size);
                (*par).extradata = buf;
                (*par).extradata_size = size as i32;
            }
        }

        Ok(())
    }
}

impl Muxer for FragmentedMp4Muxer {
    fn configure(&mut self, config: &StreamConfig) -> Result<()> {
        if self.stream_time_base.is_some() {
            return Err(Error::mux_write("muxer is already configured"));
        }

        self.add_stream(config)?;

        let mut options = Dictionary::new();
        options.set("movflags", MOVFLAGS);
        self.output
            .write_header_with(options)
            .map_err(|e| Error::mux_write(format!("failed to write container header: {e}")))?;

        // The muxer may pick its own stream time base while writing the header
        let time_base = self
            .output
            .stream(0)
            .map(|stream| stream.time_base())
            .unwrap_or_else(|| to_ffmpeg_rational(config.time_base));
        self.stream_time_base = Some(time_base);

        tracing::debug!(
            path = %self.path.display(),
            codec = ?config.codec,
            width = config.width,
            height = config.height,
            stream_time_base = %format_args!("{}/{}", time_base.numerator(), time_base.denominator()),
            "wrote container header"
        );
        Ok(())
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let stream_time_base = self
            .stream_time_base
            .ok_or_else(|| Error::mux_write("muxer has not been configured"))?;

        let data = bitstream::length_prefixed_to_annexb(&packet.data)
            .ok_or_else(|| Error::mux_write("malformed packet data"))?;

        let mut pkt = ffmpeg_next::Packet::copy(&data);
        pkt.set_stream(0);
        pkt.set_pts(Some(packet.pts.0));
        pkt.set_dts(Some(packet.pts.0));
        pkt.set_duration(packet.duration.0);
        if packet.is_keyframe {
            pkt.set_flags(packet::Flags::KEY);
        }
        pkt.rescale_ts(to_ffmpeg_rational(packet.time_base), stream_time_base);

        pkt.write_interleaved(&mut self.output)
            .map_err(|e| Error::mux_write(format!("failed to write packet: {e}")))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Without a header there is nothing to finalize
        if self.stream_time_base.is_none() {
            return Ok(());
        }

        self.output
            .write_trailer()
            .map_err(|e| Error::mux_write(format!("failed to write container trailer: {e}")))
    }
}

impl fmt::Debug for FragmentedMp4Muxer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentedMp4Muxer")
            .field("path", &self.path)
            .field("configured", &self.stream_time_base.is_some())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn to_ffmpeg_rational(rational: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(rational.num, rational.den)
}
