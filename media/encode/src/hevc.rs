/*!
    HEVC encoder implementation backed by libx265.
*/

use std::fmt;

use ffmpeg_next::{
    Dictionary, codec,
    codec::encoder::video::Encoder as VideoEncoderFFmpeg,
    encoder, ffi,
    format::Pixel,
    picture,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_types::{
    CodecId, EncodedUnit, Error, PlaneIndex, PlanarImage, Pts, Rational, Result, bitstream,
};

use crate::Encoder;
use crate::config::{EncoderConfig, EncoderParams};

const ENCODER_NAME: &str = "libx265";

/**
    HEVC encoder.

    Takes 4:2:0 pictures of a fixed size and produces Annex-B NAL units.
    Parameter sets are exposed once through [`Encoder::headers`].
*/
pub struct HevcEncoder {
    encoder: VideoEncoderFFmpeg,
    frame: VideoFrameFFmpeg,
    params: EncoderParams,
    headers: Vec<EncodedUnit>,
    draining: bool,
}

impl HevcEncoder {
    /**
        Open a new encoder.

        Fails with a configuration error if the settings are inconsistent, and
        with an encode error if the codec library rejects them.
    */
    pub fn new(config: &EncoderConfig, params: EncoderParams) -> Result<Self> {
        config.validate()?;
        if params.width == 0 || params.height == 0 || params.frame_rate == 0 {
            return Err(Error::configuration(format!(
                "invalid encoder geometry {}x{} at {} fps",
                params.width, params.height, params.frame_rate
            )));
        }

        ffmpeg_next::init().map_err(|e| Error::encode(e.to_string()))?;

        let codec = encoder::find_by_name(ENCODER_NAME)
            .ok_or_else(|| Error::encode(format!("encoder '{ENCODER_NAME}' is not available")))?;

        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| Error::encode(e.to_string()))?;

        video.set_width(params.width);
        video.set_height(params.height);
        video.set_format(Pixel::YUV420P);
        video.set_time_base(to_ffmpeg_rational(params.time_base));
        video.set_frame_rate(Some(ffmpeg_next::Rational::new(params.frame_rate as i32, 1)));
        video.set_bit_rate(config.bit_rate() as usize);
        video.set_max_b_frames(config.b_frames as usize);
        video.set_gop(config.keyint_max);
        video.set_flags(codec::Flags::GLOBAL_HEADER);

        let mut options = Dictionary::new();
        options.set("preset", config.preset.as_str());
        if let Some(tune) = config.tune {
            options.set("tune", tune.as_str());
        }
        options.set("forced-idr", "1");
        options.set("x265-params", &config.x265_params());

        let encoder = video
            .open_with(options)
            .map_err(|e| Error::encode(e.to_string()))?;

        // With global headers the parameter sets live in extradata
        let extradata = unsafe {
            let ctx = encoder.as_ptr();
            let data = (*ctx).extradata;
            let size = (*ctx).extradata_size;
            if data.is_null() || size <= 0 {
                Vec::new()
            } else {
                std::slice::from_raw_parts(data, size as usize).to_vec()
            }
        };
        let headers = split_units(&extradata);
        if headers.is_empty() {
            return Err(Error::encode("encoder produced no parameter sets"));
        }

        tracing::debug!(
            width = params.width,
            height = params.height,
            frame_rate = params.frame_rate,
            header_units = headers.len(),
            x265_params = %config.x265_params(),
            "opened hevc encoder"
        );

        let frame = VideoFrameFFmpeg::new(Pixel::YUV420P, params.width, params.height);

        Ok(Self {
            encoder,
            frame,
            params,
            headers,
            draining: false,
        })
    }

    fn fill_frame(&mut self, image: &PlanarImage) -> Result<()> {
        if image.width() != self.params.width || image.height() != self.params.height {
            return Err(Error::encode(format!(
                "picture is {}x{}, encoder expects {}x{}",
                image.width(),
                image.height(),
                self.params.width,
                self.params.height
            )));
        }

        // The previous submission may still share the buffers
        let ret = unsafe { ffi::av_frame_make_writable(self.frame.as_mut_ptr()) };
        if ret < 0 {
            return Err(Error::encode(ffmpeg_next::Error::from(ret).to_string()));
        }

        for index in PlaneIndex::ALL {
            let plane = image.plane(index);
            let width = plane.width() as usize;
            let stride = self.frame.stride(index.index());
            let data = self.frame.data_mut(index.index());
            for (y, row) in plane.rows().enumerate() {
                let start = y * stride;
                data[start..start + width].copy_from_slice(&row[..width]);
            }
        }

        Ok(())
    }

    fn receive_units(&mut self) -> Result<Vec<EncodedUnit>> {
        let mut units = Vec::new();
        let mut packet = ffmpeg_next::Packet::empty();

        loop {
            match self.encoder.receive_packet(&mut packet) {
                Ok(()) => units.extend(packet_units(&packet)),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                    break;
                }
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(Error::encode(e.to_string())),
            }
        }

        Ok(units)
    }
}

impl Encoder for HevcEncoder {
    fn codec(&self) -> CodecId {
        CodecId::H265
    }

    fn headers(&mut self) -> Result<Vec<EncodedUnit>> {
        Ok(self.headers.clone())
    }

    fn encode(
        &mut self,
        image: &PlanarImage,
        pts: Pts,
        force_keyframe: bool,
    ) -> Result<Vec<EncodedUnit>> {
        if self.draining {
            return Err(Error::encode("encoder is already draining"));
        }

        self.fill_frame(image)?;
        self.frame.set_pts(Some(pts.0));
        self.frame.set_kind(if force_keyframe {
            picture::Type::I
        } else {
            picture::Type::None
        });

        self.encoder
            .send_frame(&self.frame)
            .map_err(|e| Error::encode(e.to_string()))?;

        self.receive_units()
    }

    fn flush(&mut self) -> Result<Option<Vec<EncodedUnit>>> {
        if !self.draining {
            self.encoder
                .send_eof()
                .map_err(|e| Error::encode(e.to_string()))?;
            self.draining = true;
        }

        let mut packet = ffmpeg_next::Packet::empty();
        match self.encoder.receive_packet(&mut packet) {
            Ok(()) => Ok(Some(packet_units(&packet))),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(e) => Err(Error::encode(e.to_string())),
        }
    }
}

impl fmt::Debug for HevcEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HevcEncoder")
            .field("params", &self.params)
            .field("header_units", &self.headers.len())
            .field("draining", &self.draining)
            .finish_non_exhaustive()
    }
}

fn packet_units(packet: &ffmpeg_next::Packet) -> Vec<EncodedUnit> {
    packet.data().map(split_units).unwrap_or_default()
}

fn split_units(data: &[u8]) -> Vec<EncodedUnit> {
    bitstream::split_annexb(data)
        .into_iter()
        .filter_map(|payload| EncodedUnit::parse(CodecId::H265, payload.to_vec()))
        .collect()
}

fn to_ffmpeg_rational(rational: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(rational.num, rational.den)
}
