/*!
    Run settings loaded from TOML and the environment.

    Sources are layered: built-in defaults, then an optional TOML file, then
    `MONOEYE_*` environment variables. Nested keys use a double underscore,
    e.g. `MONOEYE_ENCODER__BITRATE_KBPS=4000`.
*/

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use media_encode::EncoderConfig;
use media_transform::{Eye, ExtractMode, VideoTransform, VideoTransformConfig};

use crate::decimate::TimestampPolicy;

const ENV_PREFIX: &str = "MONOEYE";

/**
    Frame rate assumed when neither the settings nor the input provide one.
*/
pub const FALLBACK_FRAME_RATE: u32 = 50;

/**
    Settings for one run.
*/
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output picture width.
    pub width: u32,
    /// Output picture height.
    pub height: u32,
    /// Which half of the stereo frame to keep.
    pub eye: Eye,
    /// How the eye region reaches the resampler.
    pub extract: ExtractMode,
    /// Input frame rate. Taken from the input when unset.
    pub frame_rate: Option<u32>,
    /// Ticks per second of the output time base.
    pub time_base: u32,
    /// Keep one of every `decimation` input frames.
    pub decimation: u32,
    /// Encoder settings.
    pub encoder: EncoderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            eye: Eye::Left,
            extract: ExtractMode::View,
            frame_rate: None,
            time_base: TimestampPolicy::DEFAULT_TICKS_PER_SECOND,
            decimation: 1,
            encoder: EncoderConfig::default(),
        }
    }
}

impl Settings {
    /**
        Load settings, layering an optional TOML file and the environment
        over the defaults.
    */
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| match path {
                Some(path) => format!("failed to load settings from {}", path.display()),
                None => "failed to load settings from the environment".to_string(),
            })?;

        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    pub fn transform_config(&self) -> VideoTransformConfig {
        VideoTransformConfig::new(self.width, self.height)
            .with_eye(self.eye)
            .with_mode(self.extract)
    }

    /**
        Timestamp policy for these settings, given the input's own frame rate.
    */
    pub fn timestamp_policy(&self, input_rate: Option<u32>) -> media_types::Result<TimestampPolicy> {
        let rate = self
            .frame_rate
            .or(input_rate)
            .unwrap_or(FALLBACK_FRAME_RATE);
        TimestampPolicy::new(rate, self.decimation, self.time_base)
    }

    /**
        Check these settings against an input of `width`x`height` and build
        the timestamp policy and transform for it.

        Nothing is opened or created here, so a rejected input leaves no
        output behind.
    */
    pub fn prepare(
        &self,
        width: u32,
        height: u32,
        input_rate: Option<u32>,
    ) -> media_types::Result<(TimestampPolicy, VideoTransform)> {
        let policy = self.timestamp_policy(input_rate)?;
        let transform = VideoTransform::new(self.transform_config())?;
        transform.validate_input(width, height)?;
        Ok((policy, transform))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use media_encode::Preset;
    use media_types::Error;

    use super::*;

    #[test]
    fn defaults_match_the_reference_output() {
        let settings = Settings::default();
        assert_eq!((settings.width, settings.height), (200, 200));
        assert_eq!(settings.time_base, 48_000);
        assert_eq!(settings.decimation, 1);
        assert_eq!(settings.eye, Eye::Left);

        let policy = settings.timestamp_policy(None).unwrap();
        assert_eq!(policy.input_rate(), FALLBACK_FRAME_RATE);
        assert_eq!(policy.frame_duration().0, 960);
    }

    #[test]
    fn explicit_frame_rate_wins_over_input() {
        let settings = Settings {
            frame_rate: Some(60),
            ..Default::default()
        };
        assert_eq!(settings.timestamp_policy(Some(30)).unwrap().input_rate(), 60);
        assert_eq!(
            Settings::default().timestamp_policy(Some(30)).unwrap().input_rate(),
            30
        );
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
width = 256
height = 128
eye = "right"
extract = "copy"
decimation = 2

[encoder]
preset = "fast"
bitrate_kbps = 1500
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!((settings.width, settings.height), (256, 128));
        assert_eq!(settings.eye, Eye::Right);
        assert_eq!(settings.extract, ExtractMode::Copy);
        assert_eq!(settings.decimation, 2);
        assert_eq!(settings.encoder.preset, Preset::Fast);
        assert_eq!(settings.encoder.bitrate_kbps, 1500);
        assert_eq!(settings.encoder.b_frames, 3);
        assert_eq!(settings.time_base, 48_000);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn transform_config_follows_settings() {
        let settings = Settings {
            width: 64,
            height: 32,
            eye: Eye::Right,
            ..Default::default()
        };
        let config = settings.transform_config();
        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.eye, Eye::Right);
        assert_eq!(config.mode, ExtractMode::View);
    }

    #[test]
    fn prepare_rejects_unsplittable_input() {
        let settings = Settings::default();
        let err = settings.prepare(62, 32, Some(50)).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { .. }));
        assert!(matches!(
            settings.prepare(63, 32, Some(50)),
            Err(Error::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn prepare_rejects_inexact_timing() {
        let settings = Settings {
            decimation: 2,
            ..Default::default()
        };
        assert!(matches!(
            settings.prepare(64, 32, Some(25)),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn prepare_accepts_stereo_input() {
        let settings = Settings {
            decimation: 2,
            ..Default::default()
        };
        let (policy, _transform) = settings.prepare(5760, 2880, Some(50)).unwrap();
        assert_eq!(policy.effective_rate(), 25);
        assert_eq!(policy.frame_duration().0, 1920);
    }
}
