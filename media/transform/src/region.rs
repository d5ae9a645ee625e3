/*!
    Eye region selection and the discrete crop path.
*/

use serde::Deserialize;

use media_types::{Error, PlanarImage, PlanarView, PlaneIndex, Region, Result};

/**
    Which half of a side-by-side stereo frame to keep.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    #[default]
    Left,
    Right,
}

/**
    Region of one eye inside a `width`x`height` side-by-side frame.

    Fails if `width` or `height` is odd. The half width must be even as
    well, which is stricter than the frame check: a 5762 pixel wide frame
    is rejected because each 2881 pixel eye would end halfway through a
    chroma sample, and the cropped copy has to be a whole 4:2:0 picture.
*/
pub fn eye_region(width: u32, height: u32, eye: Eye) -> Result<Region> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_geometry(format!(
            "stereo frame {width}x{height} is empty"
        )));
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(Error::invalid_geometry(format!(
            "stereo frame {width}x{height} has odd dimensions"
        )));
    }
    let half = width / 2;
    if half % 2 != 0 {
        return Err(Error::invalid_geometry(format!(
            "eye width {half} of {width}x{height} frame is odd"
        )));
    }
    let x = match eye {
        Eye::Left => 0,
        Eye::Right => half,
    };
    Ok(Region::new(x, 0, half, height))
}

/**
    Copy `region` of `src` into a new owned frame.
*/
pub fn crop(src: &PlanarView<'_>, region: Region) -> Result<PlanarImage> {
    let mut dst = PlanarImage::new(region.width, region.height)?;
    crop_into(src, region, &mut dst)?;
    Ok(dst)
}

/**
    Copy `region` of `src` into `dst`, which must be exactly the region's size.
*/
pub fn crop_into(src: &PlanarView<'_>, region: Region, dst: &mut PlanarImage) -> Result<()> {
    region.validate(src.width(), src.height())?;
    if (dst.width(), dst.height()) != (region.width, region.height) {
        return Err(Error::invalid_geometry(format!(
            "crop target is {}x{}, region is {}x{}",
            dst.width(),
            dst.height(),
            region.width,
            region.height
        )));
    }

    for index in PlaneIndex::ALL {
        let plane_region = if index.is_chroma() {
            region.chroma()
        } else {
            region
        };
        let src_plane = src.plane(index);
        let dst_plane = dst.plane_mut(index);
        let x0 = plane_region.x as usize;
        let x1 = x0 + plane_region.width as usize;
        for y in 0..plane_region.height {
            let row = &src_plane.row(plane_region.y + y)[x0..x1];
            dst_plane.row_mut(y).copy_from_slice(row);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::PlaneRef;

    #[test]
    fn left_eye_of_8k_stereo_frame() {
        let region = eye_region(5760, 2880, Eye::Left).unwrap();
        assert_eq!(region, Region::new(0, 0, 2880, 2880));
        let chroma = region.chroma();
        assert_eq!((chroma.width, chroma.height), (1440, 1440));
    }

    #[test]
    fn right_eye_starts_at_half_width() {
        let region = eye_region(5760, 2880, Eye::Right).unwrap();
        assert_eq!(region, Region::new(2880, 0, 2880, 2880));
        assert_eq!(region.chroma().x, 1440);
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        assert!(matches!(
            eye_region(5761, 2880, Eye::Left),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(eye_region(5760, 2881, Eye::Left).is_err());
        assert!(eye_region(0, 4, Eye::Left).is_err());
    }

    #[test]
    fn odd_eye_width_is_rejected_even_for_an_even_frame() {
        for eye in [Eye::Left, Eye::Right] {
            let err = eye_region(5762, 2880, eye).unwrap_err();
            assert!(matches!(err, Error::InvalidGeometry { .. }));
            assert!(err.to_string().contains("2881"));
        }
        assert!(eye_region(6, 4, Eye::Left).is_err());
        assert!(eye_region(8, 4, Eye::Left).is_ok());
    }

    #[test]
    fn crop_copies_region_from_padded_planes() {
        // 8x4 frame, luma stride 10, chroma stride 6; luma sample = 10*y + x
        let luma: Vec<u8> = (0..4u8)
            .flat_map(|y| (0..10u8).map(move |x| y * 10 + x))
            .collect();
        let chroma_u: Vec<u8> = (0..2u8)
            .flat_map(|y| (0..6u8).map(move |x| 100 + y * 10 + x))
            .collect();
        let chroma_v: Vec<u8> = chroma_u.iter().map(|v| v + 50).collect();
        let view = PlanarView::new(
            8,
            4,
            [
                PlaneRef::new(&luma, 8, 4, 10).unwrap(),
                PlaneRef::new(&chroma_u, 4, 2, 6).unwrap(),
                PlaneRef::new(&chroma_v, 4, 2, 6).unwrap(),
            ],
        )
        .unwrap();

        let right = crop(&view, eye_region(8, 4, Eye::Right).unwrap()).unwrap();
        assert_eq!(right.plane(PlaneIndex::Y).row(0), &[4, 5, 6, 7]);
        assert_eq!(right.plane(PlaneIndex::Y).row(3), &[34, 35, 36, 37]);
        assert_eq!(right.plane(PlaneIndex::U).row(1), &[112, 113]);
        assert_eq!(right.plane(PlaneIndex::V).row(0), &[152, 153]);
    }

    #[test]
    fn crop_into_rejects_wrong_target_size() {
        let source = PlanarImage::new(8, 4).unwrap();
        let mut target = PlanarImage::new(2, 2).unwrap();
        let region = eye_region(8, 4, Eye::Left).unwrap();
        assert!(crop_into(&source.view(), region, &mut target).is_err());
    }
}
