/*!
    Stereo frame to single-eye picture transformation.
*/

use serde::Deserialize;

use media_types::{PlanarImage, PlanarView, Result};

use crate::region::{Eye, crop_into, eye_region};
use crate::scale::Resampler;

/**
    How the eye region reaches the resampler.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Resample straight out of the source frame, no copy.
    #[default]
    View,
    /// Crop into an owned intermediate frame, then resample that.
    Copy,
}

/**
    Configuration for a video transform.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoTransformConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Which half of the stereo frame to keep.
    pub eye: Eye,
    /// Whether to crop through an intermediate copy.
    pub mode: ExtractMode,
}

impl VideoTransformConfig {
    /**
        Left eye scaled to a `width`x`height` picture.
    */
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            eye: Eye::Left,
            mode: ExtractMode::View,
        }
    }

    /**
        Left eye scaled to a `size`x`size` picture.
    */
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    pub fn with_eye(mut self, eye: Eye) -> Self {
        self.eye = eye;
        self
    }

    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }
}

/**
    Extracts one eye of a side-by-side stereo frame and scales it to the
    configured output size.
*/
#[derive(Debug)]
pub struct VideoTransform {
    config: VideoTransformConfig,
    resampler: Resampler,
    crop: Option<PlanarImage>,
}

impl VideoTransform {
    /**
        Create a transform. Fails if the output size is zero or odd.
    */
    pub fn new(config: VideoTransformConfig) -> Result<Self> {
        Ok(Self {
            config,
            resampler: Resampler::new(config.width, config.height)?,
            crop: None,
        })
    }

    pub fn config(&self) -> &VideoTransformConfig {
        &self.config
    }

    /**
        Check that frames of the given size can be transformed.
    */
    pub fn validate_input(&self, width: u32, height: u32) -> Result<()> {
        eye_region(width, height, self.config.eye).map(|_| ())
    }

    /**
        Transform one stereo frame, returning the encoder-ready picture.

        The returned picture is overwritten by the next call.
    */
    pub fn transform(&mut self, frame: &PlanarView<'_>) -> Result<&PlanarImage> {
        let region = eye_region(frame.width(), frame.height(), self.config.eye)?;
        match self.config.mode {
            ExtractMode::View => self.resampler.resample(frame, region),
            ExtractMode::Copy => {
                let crop = match self.crop.take() {
                    Some(crop) if (crop.width(), crop.height()) == (region.width, region.height) => {
                        crop
                    }
                    _ => PlanarImage::new(region.width, region.height)?,
                };
                let crop = self.crop.insert(crop);
                crop_into(frame, region, crop)?;
                self.resampler
                    .resample(&crop.view(), crop.view().full_region())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{Error, PlaneIndex};

    fn stereo_frame(width: u32, height: u32) -> PlanarImage {
        let mut image = PlanarImage::new(width, height).unwrap();
        for index in PlaneIndex::ALL {
            let plane = image.plane_mut(index);
            for y in 0..plane.height() {
                for (x, sample) in plane.row_mut(y).iter_mut().enumerate() {
                    *sample = ((x as u32 * 31 + y * 17 + index.index() as u32 * 3) % 251) as u8;
                }
            }
        }
        image
    }

    #[test]
    fn copy_path_matches_view_path() {
        let frame = stereo_frame(96, 40);
        for eye in [Eye::Left, Eye::Right] {
            let base = VideoTransformConfig::new(30, 22).with_eye(eye);
            let mut view = VideoTransform::new(base).unwrap();
            let mut copy = VideoTransform::new(base.with_mode(ExtractMode::Copy)).unwrap();
            let a = view.transform(&frame.view()).unwrap().clone();
            let b = copy.transform(&frame.view()).unwrap();
            assert_eq!(&a, b, "{eye:?}");
        }
    }

    #[test]
    fn output_has_configured_size() {
        let frame = stereo_frame(64, 32);
        let mut transform = VideoTransform::new(VideoTransformConfig::square(20)).unwrap();
        let out = transform.transform(&frame.view()).unwrap();
        assert_eq!((out.width(), out.height()), (20, 20));
        assert_eq!(out.plane(PlaneIndex::U).width(), 10);
    }

    #[test]
    fn same_size_left_eye_is_a_crop() {
        let frame = stereo_frame(32, 16);
        let mut transform = VideoTransform::new(VideoTransformConfig::new(16, 16)).unwrap();
        let out = transform.transform(&frame.view()).unwrap();
        for y in 0..16 {
            assert_eq!(
                out.plane(PlaneIndex::Y).row(y),
                &frame.plane(PlaneIndex::Y).row(y)[..16]
            );
        }
    }

    #[test]
    fn odd_output_size_is_rejected() {
        assert!(matches!(
            VideoTransform::new(VideoTransformConfig::square(199)),
            Err(Error::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn validate_input_checks_stereo_geometry() {
        let transform = VideoTransform::new(VideoTransformConfig::square(200)).unwrap();
        assert!(transform.validate_input(5760, 2880).is_ok());
        assert!(transform.validate_input(5761, 2880).is_err());
    }
}
