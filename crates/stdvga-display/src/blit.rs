//! Software rectangle copy with rotation.
//!
//! A surface describes a block of pixel memory: `width`/`height` are the physical columns/rows of
//! that memory, `rotation` says how unrotated (logical) coordinates map onto it. Rectangles are
//! always expressed in logical coordinates and shifted by each surface's `offset` before mapping.
//!
//! | rotation | logical (x, y) lands at (row, column)   |
//! |----------|-----------------------------------------|
//! | identity | (y, x)                                  |
//! | 90°      | (height - 1 - x, y)                     |
//! | 180°     | (height - 1 - y, width - 1 - x)         |
//! | 270°     | (x, width - 1 - y)                      |

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Identity,
        Rotation::Rotate90,
        Rotation::Rotate180,
        Rotation::Rotate270,
    ];

    /// Whether logical width maps onto physical rows.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }

    pub fn inverse(self) -> Self {
        match self {
            Rotation::Identity => Rotation::Identity,
            Rotation::Rotate90 => Rotation::Rotate270,
            Rotation::Rotate180 => Rotation::Rotate180,
            Rotation::Rotate270 => Rotation::Rotate90,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Identity => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open rectangle `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        let right = i64::from(x) + i64::from(width);
        let bottom = i64::from(y) + i64::from(height);
        Self::new(
            x,
            y,
            right.min(i64::from(i32::MAX)) as i32,
            bottom.min(i64::from(i32::MAX)) as i32,
        )
    }

    pub fn width(&self) -> u32 {
        (i64::from(self.right) - i64::from(self.left)).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (i64::from(self.bottom) - i64::from(self.top)).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!r.is_empty()).then_some(r)
    }
}

/// Geometry of a pixel surface; see the module docs for the coordinate conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// Bytes per physical row.
    pub pitch: usize,
    pub bits_per_pixel: u32,
    /// Physical columns.
    pub width: u32,
    /// Physical rows.
    pub height: u32,
    pub rotation: Rotation,
    pub offset: Point,
}

impl SurfaceLayout {
    /// Unrotated 32bpp surface of `width x height` with a tight or padded `pitch`.
    pub fn linear(width: u32, height: u32, pitch: usize) -> Self {
        Self {
            pitch,
            bits_per_pixel: 32,
            width,
            height,
            rotation: Rotation::Identity,
            offset: Point::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// Size of the surface in logical (unrotated) coordinates.
    pub fn logical_size(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Byte steps for `(x + 1, y)` and `(x, y + 1)` in logical coordinates.
    fn steps(&self) -> (i64, i64) {
        let bpp = self.bytes_per_pixel() as i64;
        let pitch = self.pitch as i64;
        match self.rotation {
            Rotation::Identity => (bpp, pitch),
            Rotation::Rotate90 => (-pitch, bpp),
            Rotation::Rotate180 => (-bpp, -pitch),
            Rotation::Rotate270 => (pitch, -bpp),
        }
    }

    /// Byte offset of logical pixel `(x, y)` after applying `offset`.
    fn pixel_offset(&self, x: i32, y: i32) -> i64 {
        let x = i64::from(x) + i64::from(self.offset.x);
        let y = i64::from(y) + i64::from(self.offset.y);
        let bpp = self.bytes_per_pixel() as i64;
        let pitch = self.pitch as i64;
        let width = i64::from(self.width);
        let height = i64::from(self.height);
        match self.rotation {
            Rotation::Identity => y * pitch + x * bpp,
            Rotation::Rotate90 => (height - 1 - x) * pitch + y * bpp,
            Rotation::Rotate180 => (height - 1 - y) * pitch + (width - 1 - x) * bpp,
            Rotation::Rotate270 => x * pitch + (width - 1 - y) * bpp,
        }
    }
}

#[derive(Debug)]
pub struct Surface<'a> {
    pub bits: &'a [u8],
    pub layout: SurfaceLayout,
}

#[derive(Debug)]
pub struct SurfaceMut<'a> {
    pub bits: &'a mut [u8],
    pub layout: SurfaceLayout,
}

/// Copies `rect` from `src` to `dst`.
///
/// The rectangle must lie inside both surfaces once each surface's offset is applied; this is not
/// re-checked here. When depths differ, the low `min(src, dst)` bytes of each pixel are copied.
pub fn blt_rect(dst: &mut SurfaceMut<'_>, src: &Surface<'_>, rect: &Rect) {
    if rect.is_empty() {
        return;
    }
    let width = rect.width() as usize;
    let height = rect.height();
    let src_bpp = src.layout.bytes_per_pixel();
    let dst_bpp = dst.layout.bytes_per_pixel();

    if src.layout.rotation == Rotation::Identity
        && dst.layout.rotation == Rotation::Identity
        && src_bpp == dst_bpp
    {
        let run = width * src_bpp;
        for y in 0..height as i32 {
            let s = src.layout.pixel_offset(rect.left, rect.top + y) as usize;
            let d = dst.layout.pixel_offset(rect.left, rect.top + y) as usize;
            dst.bits[d..d + run].copy_from_slice(&src.bits[s..s + run]);
        }
        return;
    }

    let copy = src_bpp.min(dst_bpp);
    let (src_px, src_row) = src.layout.steps();
    let (dst_px, dst_row) = dst.layout.steps();
    let mut src_line = src.layout.pixel_offset(rect.left, rect.top);
    let mut dst_line = dst.layout.pixel_offset(rect.left, rect.top);

    for _ in 0..height {
        let mut s = src_line;
        let mut d = dst_line;
        for _ in 0..width {
            let (su, du) = (s as usize, d as usize);
            dst.bits[du..du + copy].copy_from_slice(&src.bits[su..su + copy]);
            s += src_px;
            d += dst_px;
        }
        src_line += src_row;
        dst_line += dst_row;
    }
}
