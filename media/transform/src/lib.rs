/*!
    Frame transformation for the monoeye media crates.

    This crate turns a decoded side-by-side stereo frame into the fixed-size
    single-eye picture handed to the encoder:
    - **Region extraction**: pick the left (or right) half of the frame
    - **Resampling**: bilinear scaling of each plane to the output size

    # Usage

    ```ignore
    use media_transform::{VideoTransform, VideoTransformConfig};

    // Left eye of every frame, scaled to 200x200
    let mut transform = VideoTransform::new(VideoTransformConfig::square(200))?;

    while let Some(frame) = source.next_frame() {
        let picture = transform.transform(&frame?)?;
        encoder.encode(picture, pts, force_keyframe)?;
    }
    ```

    # View vs Copy

    By default the resampler reads the eye region straight out of the
    decoder's buffer, no pixels are copied. [`ExtractMode::Copy`] crops the
    region into an owned intermediate frame first and scales that instead.
    Both paths produce identical output.

    # Statefulness

    The transform keeps its output buffer and precomputed scaling taps
    between frames. Frames are independent of each other, only the buffers
    are reused.
*/

pub use media_types::{Error, PlanarImage, PlanarView, Region, Result};

mod region;
mod scale;
mod video;

pub use region::{Eye, crop, crop_into, eye_region};
pub use scale::{Resampler, ScalingMap, Tap, resample};
pub use video::{ExtractMode, VideoTransform, VideoTransformConfig};
