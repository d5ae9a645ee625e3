/*!
    Planar 4:2:0 frame types.

    A frame is three planes (Y, U, V). The chroma planes are exactly half
    the luma width and height, rounded down. Each plane carries its own row
    stride, which may exceed the logical row width. Samples are only ever
    reached through bounds-checked row accessors, never raw offsets.
*/

use crate::{Error, Region, Result};

/**
    Identifies one of the three planes of a 4:2:0 frame.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneIndex {
    Y,
    U,
    V,
}

impl PlaneIndex {
    pub const ALL: [PlaneIndex; 3] = [PlaneIndex::Y, PlaneIndex::U, PlaneIndex::V];

    pub const fn index(self) -> usize {
        match self {
            Self::Y => 0,
            Self::U => 1,
            Self::V => 2,
        }
    }

    pub const fn is_chroma(self) -> bool {
        !matches!(self, Self::Y)
    }

    /**
        Plane dimensions for a frame of the given luma size.
    */
    pub const fn dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.is_chroma() {
            (width / 2, height / 2)
        } else {
            (width, height)
        }
    }
}

/// Minimum number of bytes a plane buffer must hold.
fn required_len(width: u32, height: u32, stride: usize) -> usize {
    if height == 0 {
        0
    } else {
        stride * (height as usize - 1) + width as usize
    }
}

fn check_plane(len: usize, width: u32, height: u32, stride: usize) -> Result<()> {
    if stride < width as usize {
        return Err(Error::invalid_geometry(format!(
            "stride {stride} is smaller than row width {width}"
        )));
    }
    let required = required_len(width, height, stride);
    if len < required {
        return Err(Error::invalid_geometry(format!(
            "plane of {width}x{height} with stride {stride} needs {required} bytes, got {len}"
        )));
    }
    Ok(())
}

/**
    A borrowed view of one plane.

    Never owns the memory it points at; typically the data belongs to a
    decoder and is only valid until the next frame is requested.
*/
#[derive(Clone, Copy, Debug)]
pub struct PlaneRef<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PlaneRef<'a> {
    /**
        Create a plane view, checking that `data` covers every row.
    */
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        check_plane(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        The logical samples of row `y`, excluding stride padding.

        # Panics

        Panics if `y` is outside the plane.
    */
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(y < self.height, "row {y} outside plane of height {}", self.height);
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.row(y)[x as usize]
    }
}

/**
    An owned plane with explicit stride metadata.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl Plane {
    /**
        Create a zero-filled, tightly packed plane.
    */
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /**
        Create a tightly packed plane with every sample set to `value`.
    */
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
            stride: width as usize,
        }
    }

    /**
        Wrap an existing buffer, checking that it covers every row.
    */
    pub fn from_vec(data: Vec<u8>, width: u32, height: u32, stride: usize) -> Result<Self> {
        check_plane(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_plane_ref(&self) -> PlaneRef<'_> {
        PlaneRef {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {y} outside plane of height {}", self.height);
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row {y} outside plane of height {}", self.height);
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.width as usize]
    }

    /**
        Iterate over the logical rows of the plane.
    */
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }
}

fn check_frame(width: u32, height: u32, dims: [(u32, u32); 3]) -> Result<()> {
    for (index, (w, h)) in PlaneIndex::ALL.into_iter().zip(dims) {
        let expected = index.dimensions(width, height);
        if (w, h) != expected {
            return Err(Error::invalid_geometry(format!(
                "{index:?} plane is {w}x{h}, expected {}x{} for a {width}x{height} 4:2:0 frame",
                expected.0, expected.1
            )));
        }
    }
    Ok(())
}

/**
    A borrowed 4:2:0 frame with foreign lifetime.
*/
#[derive(Clone, Copy, Debug)]
pub struct PlanarView<'a> {
    width: u32,
    height: u32,
    planes: [PlaneRef<'a>; 3],
}

impl<'a> PlanarView<'a> {
    /**
        Assemble a frame view, checking the 4:2:0 plane relationship.
    */
    pub fn new(width: u32, height: u32, planes: [PlaneRef<'a>; 3]) -> Result<Self> {
        check_frame(width, height, planes.map(|p| (p.width, p.height)))?;
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane(&self, index: PlaneIndex) -> PlaneRef<'a> {
        self.planes[index.index()]
    }

    /**
        The region covering the whole frame.
    */
    pub fn full_region(&self) -> Region {
        Region::full(self.width, self.height)
    }
}

/**
    An owned 4:2:0 frame.

    Backs resampler output and intermediate crops. Released when dropped.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarImage {
    width: u32,
    height: u32,
    planes: [Plane; 3],
}

impl PlanarImage {
    /**
        Allocate a zero-filled frame. Dimensions must be non-zero and even.
    */
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, [0, 0, 0])
    }

    /**
        Allocate a frame with every plane set to a constant `[y, u, v]`.
    */
    pub fn filled(width: u32, height: u32, values: [u8; 3]) -> Result<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(Error::invalid_geometry(format!(
                "{width}x{height} is not a non-zero even 4:2:0 size"
            )));
        }
        let planes = PlaneIndex::ALL.map(|index| {
            let (w, h) = index.dimensions(width, height);
            Plane::filled(w, h, values[index.index()])
        });
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane(&self, index: PlaneIndex) -> &Plane {
        &self.planes[index.index()]
    }

    pub fn plane_mut(&mut self, index: PlaneIndex) -> &mut Plane {
        &mut self.planes[index.index()]
    }

    /**
        Borrow this frame as a view.
    */
    pub fn view(&self) -> PlanarView<'_> {
        PlanarView {
            width: self.width,
            height: self.height,
            planes: [0usize, 1, 2].map(|i| self.planes[i].as_plane_ref()),
        }
    }
}

static_assertions::assert_impl_all!(PlanarImage: Send, Sync);
static_assertions::assert_impl_all!(PlanarView<'static>: Send, Sync);
