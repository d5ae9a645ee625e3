/*!
    Encoder configuration types.
*/

use serde::Deserialize;

use media_types::{Error, Rational, Result};

/**
    Speed/quality preset of the codec library.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

impl Preset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
            Self::Placebo => "placebo",
        }
    }
}

/**
    Content/latency tuning of the codec library.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tune {
    Psnr,
    Ssim,
    Grain,
    Zerolatency,
    Fastdecode,
}

impl Tune {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Psnr => "psnr",
            Self::Ssim => "ssim",
            Self::Grain => "grain",
            Self::Zerolatency => "zerolatency",
            Self::Fastdecode => "fastdecode",
        }
    }
}

/**
    Configuration for an encoder.

    Applied once at construction. Explicit fields take precedence over
    whatever the preset and tune would choose.
*/
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Speed/quality preset.
    pub preset: Preset,
    /// Optional tuning applied on top of the preset.
    pub tune: Option<Tune>,
    /// Average target bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Lowest quantizer rate control may pick.
    pub qp_min: u8,
    /// Highest quantizer rate control may pick.
    pub qp_max: u8,
    /// Number of reference frames.
    pub ref_frames: u8,
    /// Maximum consecutive B-frames.
    pub b_frames: u8,
    /// Frames encoded in parallel. Zero lets the library decide.
    pub frame_threads: u8,
    /// Wavefront parallel processing within a frame.
    pub wavefront: bool,
    /// Rate control lookahead depth in frames.
    pub lookahead: u16,
    /// Minimum distance between keyframes.
    pub keyint_min: u32,
    /// Maximum distance between keyframes.
    pub keyint_max: u32,
    /// Allow open GOPs (CRA pictures referencing the previous GOP).
    pub open_gop: bool,
    /// Repeat parameter sets before every keyframe.
    pub repeat_headers: bool,
    /// Emit HRD information.
    pub hrd: bool,
    /// Psycho-visual rate-distortion strength.
    pub psy_rd: f32,
    /// Psycho-visual quantization strength.
    pub psy_rdoq: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Medium,
            tune: Some(Tune::Zerolatency),
            bitrate_kbps: 3000,
            qp_min: 17,
            qp_max: 37,
            ref_frames: 3,
            b_frames: 3,
            frame_threads: 4,
            wavefront: true,
            lookahead: 20,
            keyint_min: 1,
            keyint_max: 120,
            open_gop: false,
            repeat_headers: true,
            hrd: true,
            psy_rd: 1.0,
            psy_rdoq: 1.0,
        }
    }
}

impl EncoderConfig {
    /**
        Check that the settings are consistent.
    */
    pub fn validate(&self) -> Result<()> {
        if self.qp_min > self.qp_max || self.qp_max > 51 {
            return Err(Error::configuration(format!(
                "quantizer range {}..={} is not within 0..=51",
                self.qp_min, self.qp_max
            )));
        }
        if self.keyint_min == 0 || self.keyint_min > self.keyint_max {
            return Err(Error::configuration(format!(
                "keyframe interval {}..={} is invalid",
                self.keyint_min, self.keyint_max
            )));
        }
        if self.bitrate_kbps == 0 {
            return Err(Error::configuration("target bitrate must be non-zero"));
        }
        Ok(())
    }

    /**
        Target bitrate in bit/s.
    */
    pub fn bit_rate(&self) -> u64 {
        self.bitrate_kbps as u64 * 1000
    }

    /**
        The settings as a libx265 `key=value:key=value` parameter string.
    */
    pub fn x265_params(&self) -> String {
        let params = [
            format!("bitrate={}", self.bitrate_kbps),
            format!("qpmin={}", self.qp_min),
            format!("qpmax={}", self.qp_max),
            format!("ref={}", self.ref_frames),
            format!("bframes={}", self.b_frames),
            format!("frame-threads={}", self.frame_threads),
            format!("wpp={}", u8::from(self.wavefront)),
            format!("rc-lookahead={}", self.lookahead),
            format!("min-keyint={}", self.keyint_min),
            format!("keyint={}", self.keyint_max),
            format!("open-gop={}", u8::from(self.open_gop)),
            format!("repeat-headers={}", u8::from(self.repeat_headers)),
            format!("hrd={}", u8::from(self.hrd)),
            format!("psy-rd={:.2}", self.psy_rd),
            format!("psy-rdoq={:.2}", self.psy_rdoq),
        ];
        params.join(":")
    }
}

/**
    Stream parameters fixed for the lifetime of an encoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderParams {
    /// Picture width in pixels.
    pub width: u32,
    /// Picture height in pixels.
    pub height: u32,
    /// Output frame rate in frames per second.
    pub frame_rate: u32,
    /// Time base of the submitted timestamps.
    pub time_base: Rational,
}

impl EncoderParams {
    pub fn new(width: u32, height: u32, frame_rate: u32, time_base: Rational) -> Self {
        Self {
            width,
            height,
            frame_rate,
            time_base,
        }
    }
}
