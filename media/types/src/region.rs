/*!
    Frame sub-rectangles.
*/

use crate::{Error, Result};

/**
    A sub-rectangle of a frame in luma-plane coordinates.

    The matching chroma rectangle is derived by halving every field, so a
    region on a 4:2:0 frame should have even offsets and sizes.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /**
        The region covering a whole frame of the given size.
    */
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /**
        The same region in chroma-plane coordinates.
    */
    pub const fn chroma(self) -> Self {
        Self::new(self.x / 2, self.y / 2, self.width / 2, self.height / 2)
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /**
        Returns true if the region lies fully inside a `width`x`height` plane.
    */
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= width as u64 && bottom <= height as u64
    }

    /**
        Check the region against a frame of the given luma size.
    */
    pub fn validate(self, width: u32, height: u32) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_geometry(format!("region {self:?} is empty")));
        }
        if !self.fits_within(width, height) {
            return Err(Error::invalid_geometry(format!(
                "region {self:?} exceeds {width}x{height} frame"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_halves_every_field() {
        let region = Region::new(2880, 0, 2880, 2880);
        assert_eq!(region.chroma(), Region::new(1440, 0, 1440, 1440));
    }

    #[test]
    fn containment() {
        let region = Region::new(2880, 0, 2880, 2880);
        assert!(region.fits_within(5760, 2880));
        assert!(!region.fits_within(5758, 2880));
        assert!(!region.fits_within(5760, 2878));
    }

    #[test]
    fn validate_rejects_empty_and_overflowing() {
        assert!(Region::new(0, 0, 0, 4).validate(8, 8).is_err());
        assert!(Region::new(u32::MAX, 0, 2, 2).validate(8, 8).is_err());
        assert!(Region::full(8, 8).validate(8, 8).is_ok());
    }
}
