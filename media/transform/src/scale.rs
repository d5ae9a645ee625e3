/*!
    Bilinear resampling of 4:2:0 frames.

    Scaling is separable and per plane. Each axis of each plane gets its own
    [`ScalingMap`] from the plane's source and destination sizes, so chroma
    planes are scaled with their own half-size geometry rather than derived
    from the luma result.

    Source coordinates and weights are kept in 16-bit fixed point, which
    makes flat input and same-size scaling exact.
*/

use media_types::{Error, PlanarImage, PlanarView, Plane, PlaneIndex, PlaneRef, Region, Result};

const FRAC_BITS: u32 = 16;
const ONE: u64 = 1 << FRAC_BITS;

/**
    The two source indices and the weight of the second one for a single
    destination coordinate.

    `frac` is in `0..=1 << 16`.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tap {
    pub i0: u32,
    pub i1: u32,
    pub frac: u32,
}

/**
    Maps destination coordinates on one axis to fractional source coordinates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalingMap {
    src: u32,
    dst: u32,
}

impl ScalingMap {
    pub fn new(src: u32, dst: u32) -> Result<Self> {
        if src == 0 || dst == 0 {
            return Err(Error::invalid_geometry(format!(
                "cannot scale axis of size {src} to {dst}"
            )));
        }
        Ok(Self { src, dst })
    }

    /**
        Source coordinate `d * src / dst` for destination coordinate `d`.
    */
    pub fn source_coordinate(&self, d: u32) -> f64 {
        d as f64 * self.src as f64 / self.dst as f64
    }

    /**
        The interpolation tap for destination coordinate `d`.

        The left index is clamped so that both reads stay inside the source,
        while the weight is still measured from the unclamped coordinate. At
        the last source sample this saturates to a full weight on `i1`.
    */
    pub fn tap(&self, d: u32) -> Tap {
        let sx = d as u64 * self.src as u64 * ONE / self.dst as u64;
        let floor = (sx >> FRAC_BITS) as u32;
        let i0 = floor.min(self.src.saturating_sub(2));
        let i1 = (i0 + 1).min(self.src - 1);
        let frac = (sx - ((i0 as u64) << FRAC_BITS)).min(ONE) as u32;
        Tap { i0, i1, frac }
    }

    /**
        Taps for every destination coordinate on this axis.
    */
    pub fn taps(&self) -> Vec<Tap> {
        (0..self.dst).map(|d| self.tap(d)).collect()
    }
}

#[inline]
fn blend(p00: u8, p10: u8, p01: u8, p11: u8, fx: u32, fy: u32) -> u8 {
    let (fx, fy) = (fx as u64, fy as u64);
    let top = p00 as u64 * (ONE - fx) + p10 as u64 * fx;
    let bottom = p01 as u64 * (ONE - fx) + p11 as u64 * fx;
    let value = top * (ONE - fy) + bottom * fy;
    ((value + (1 << (2 * FRAC_BITS - 1))) >> (2 * FRAC_BITS)).min(255) as u8
}

/// Precomputed taps for one plane geometry.
#[derive(Debug)]
struct PlaneTaps {
    src: (u32, u32),
    x: Vec<Tap>,
    y: Vec<Tap>,
}

impl PlaneTaps {
    fn new(src: (u32, u32), dst: (u32, u32)) -> Result<Self> {
        Ok(Self {
            src,
            x: ScalingMap::new(src.0, dst.0)?.taps(),
            y: ScalingMap::new(src.1, dst.1)?.taps(),
        })
    }
}

fn scale_plane(src: PlaneRef<'_>, region: Region, taps: &PlaneTaps, dst: &mut Plane) {
    let x0 = region.x as usize;
    let x1 = x0 + region.width as usize;
    for (y, ty) in taps.y.iter().enumerate() {
        let row0 = &src.row(region.y + ty.i0)[x0..x1];
        let row1 = &src.row(region.y + ty.i1)[x0..x1];
        let out = dst.row_mut(y as u32);
        for (sample, tx) in out.iter_mut().zip(&taps.x) {
            let (a, b) = (tx.i0 as usize, tx.i1 as usize);
            *sample = blend(row0[a], row0[b], row1[a], row1[b], tx.frac, ty.frac);
        }
    }
}

/**
    Scales a region of a source frame to a fixed output size.

    Owns the output frame and reuses it, along with the scaling taps, for
    every frame of the same source geometry.
*/
#[derive(Debug)]
pub struct Resampler {
    output: PlanarImage,
    taps: Option<[PlaneTaps; 2]>,
}

impl Resampler {
    /**
        Create a resampler producing `width`x`height` frames.

        The output size must be non-zero and even.
    */
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            output: PlanarImage::new(width, height)?,
            taps: None,
        })
    }

    pub fn output_size(&self) -> (u32, u32) {
        (self.output.width(), self.output.height())
    }

    /**
        Scale `region` of `src` into the output frame and return it.
    */
    pub fn resample(&mut self, src: &PlanarView<'_>, region: Region) -> Result<&PlanarImage> {
        region.validate(src.width(), src.height())?;
        let chroma = region.chroma();
        if chroma.is_empty() {
            return Err(Error::invalid_geometry(format!(
                "region {region:?} has no whole chroma samples"
            )));
        }

        let luma_src = (region.width, region.height);
        let taps = match self.taps.take() {
            Some(taps) if taps[0].src == luma_src => taps,
            _ => {
                let (w, h) = self.output_size();
                tracing::debug!(
                    src_width = region.width,
                    src_height = region.height,
                    dst_width = w,
                    dst_height = h,
                    "building scaling taps"
                );
                [
                    PlaneTaps::new(luma_src, (w, h))?,
                    PlaneTaps::new((chroma.width, chroma.height), (w / 2, h / 2))?,
                ]
            }
        };

        for index in PlaneIndex::ALL {
            let (plane_region, plane_taps) = if index.is_chroma() {
                (chroma, &taps[1])
            } else {
                (region, &taps[0])
            };
            scale_plane(
                src.plane(index),
                plane_region,
                plane_taps,
                self.output.plane_mut(index),
            );
        }
        self.taps = Some(taps);

        Ok(&self.output)
    }

    /**
        Consume the resampler, returning its output frame.
    */
    pub fn into_output(self) -> PlanarImage {
        self.output
    }
}

/**
    One-shot resample of `region` of `src` to a new `width`x`height` frame.
*/
pub fn resample(src: &PlanarView<'_>, region: Region, width: u32, height: u32) -> Result<PlanarImage> {
    let mut resampler = Resampler::new(width, height)?;
    resampler.resample(src, region)?;
    Ok(resampler.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PlanarImage {
        let mut image = PlanarImage::new(width, height).unwrap();
        for index in PlaneIndex::ALL {
            let plane = image.plane_mut(index);
            for y in 0..plane.height() {
                for (x, sample) in plane.row_mut(y).iter_mut().enumerate() {
                    *sample = ((x as u32 * 7 + y * 13 + index.index() as u32 * 50) % 256) as u8;
                }
            }
        }
        image
    }

    #[test]
    fn same_size_is_identity() {
        for (w, h) in [(2, 2), (8, 8), (16, 10), (64, 64)] {
            let src = gradient(w, h);
            let out = resample(&src.view(), Region::full(w, h), w, h).unwrap();
            assert_eq!(out, src, "{w}x{h}");
        }
    }

    #[test]
    fn flat_input_stays_flat() {
        let src = PlanarImage::filled(96, 48, [77, 128, 200]).unwrap();
        for (w, h) in [(2, 2), (20, 20), (200, 200), (38, 64)] {
            let out = resample(&src.view(), Region::new(0, 0, 48, 48), w, h).unwrap();
            for index in PlaneIndex::ALL {
                let expected = [77, 128, 200][index.index()];
                assert!(
                    out.plane(index).rows().flatten().all(|&s| s == expected),
                    "{index:?} at {w}x{h}"
                );
            }
        }
    }

    #[test]
    fn upscale_interpolates_between_neighbours() {
        // luma row [0, 100] scaled 2 -> 4 gives source x = 0, 0.5, 1, 1.5
        let mut src = PlanarImage::new(2, 2).unwrap();
        for y in 0..2 {
            src.plane_mut(PlaneIndex::Y).row_mut(y).copy_from_slice(&[0, 100]);
        }
        let out = resample(&src.view(), Region::full(2, 2), 4, 4).unwrap();
        // x = 1.5 clamps the read to [0, 1] and saturates onto the last sample
        assert_eq!(out.plane(PlaneIndex::Y).row(0), &[0, 50, 100, 100]);
    }

    #[test]
    fn single_sample_source_plane() {
        // 2x2 frame has 1x1 chroma planes
        let src = PlanarImage::filled(2, 2, [10, 20, 30]).unwrap();
        let out = resample(&src.view(), Region::full(2, 2), 6, 6).unwrap();
        assert!(out.plane(PlaneIndex::U).rows().flatten().all(|&s| s == 20));
        assert!(out.plane(PlaneIndex::V).rows().flatten().all(|&s| s == 30));
    }

    #[test]
    fn taps_never_read_past_the_edge() {
        let map = ScalingMap::new(5, 17).unwrap();
        for tap in map.taps() {
            assert!(tap.i0 < 5 && tap.i1 < 5);
            assert!(tap.frac as u64 <= ONE);
        }
        let last = map.tap(16);
        assert_eq!((last.i0, last.i1), (3, 4));
    }

    #[test]
    fn tap_weight_tracks_source_coordinate() {
        let map = ScalingMap::new(3, 2).unwrap();
        assert_eq!(map.source_coordinate(1), 1.5);
        assert_eq!(map.tap(1), Tap { i0: 1, i1: 2, frac: 1 << 15 });
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(matches!(
            ScalingMap::new(0, 4),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(ScalingMap::new(4, 0).is_err());
        assert!(Resampler::new(0, 200).is_err());
        let src = PlanarImage::new(4, 4).unwrap();
        assert!(resample(&src.view(), Region::new(0, 0, 0, 4), 2, 2).is_err());
    }

    #[test]
    fn region_reads_only_its_own_samples() {
        // Left half is 0, right half is 255; scaling the right half must
        // never pull in a zero.
        let mut src = PlanarImage::new(16, 8).unwrap();
        for index in PlaneIndex::ALL {
            let plane = src.plane_mut(index);
            let half = plane.width() as usize / 2;
            for y in 0..plane.height() {
                plane.row_mut(y)[half..].fill(255);
            }
        }
        let out = resample(&src.view(), Region::new(8, 0, 8, 8), 6, 6).unwrap();
        for index in PlaneIndex::ALL {
            assert!(out.plane(index).rows().flatten().all(|&s| s == 255));
        }
    }

    #[test]
    fn stride_padding_is_never_sampled() {
        // 8x4 frame with padded rows; padding is 255, samples are not
        let padded = |value: u8, width: usize, height: usize, stride: usize| {
            let mut data = vec![255u8; stride * height];
            for row in data.chunks_mut(stride) {
                row[..width].fill(value);
            }
            data
        };
        let luma = padded(50, 8, 4, 12);
        let u = padded(60, 4, 2, 8);
        let v = padded(70, 4, 2, 8);
        let src = PlanarView::new(
            8,
            4,
            [
                PlaneRef::new(&luma, 8, 4, 12).unwrap(),
                PlaneRef::new(&u, 4, 2, 8).unwrap(),
                PlaneRef::new(&v, 4, 2, 8).unwrap(),
            ],
        )
        .unwrap();

        for (w, h) in [(16, 8), (8, 4), (2, 2)] {
            let out = resample(&src, Region::full(8, 4), w, h).unwrap();
            for (index, expected) in PlaneIndex::ALL.into_iter().zip([50, 60, 70]) {
                assert!(
                    out.plane(index).rows().flatten().all(|&s| s == expected),
                    "{index:?} at {w}x{h}"
                );
            }
        }
    }

    #[test]
    fn resampler_reuses_output_across_frames() {
        let mut resampler = Resampler::new(4, 4).unwrap();
        let a = PlanarImage::filled(8, 8, [1, 2, 3]).unwrap();
        let b = PlanarImage::filled(8, 8, [9, 8, 7]).unwrap();
        resampler.resample(&a.view(), Region::full(8, 8)).unwrap();
        let out = resampler.resample(&b.view(), Region::full(8, 8)).unwrap();
        assert_eq!(out.plane(PlaneIndex::Y).row(0), &[9, 9, 9, 9]);
        assert_eq!(out.plane(PlaneIndex::V).row(1), &[7, 7]);
    }
}
