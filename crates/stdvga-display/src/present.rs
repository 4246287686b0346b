use crate::blank::PhysRange;
use crate::blit::{blt_rect, Point, Rect, Rotation, Surface, SurfaceLayout, SurfaceMut};
use crate::framebuffer::FrameBufferMemory;
use crate::source::{Scaling, SourceFlags, SourceState};
use crate::{DisplayError, Result};

/// Only 32bpp modes are reported, so presents always carry 4-byte pixels.
pub const MIN_BYTES_PER_PIXEL: u32 = 4;
pub const MAX_BYTES_PER_PIXEL: u32 = 4;

/// A screen-to-screen move reported by the composition layer.
///
/// The source image already contains the moved pixels, so the destination rectangle is refreshed
/// from the source surface like a dirty rectangle; `source_point` is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveRect {
    pub source_point: Point,
    pub dest_rect: Rect,
}

#[derive(Debug, Clone, Copy)]
pub struct PresentRequest<'a> {
    /// Bytes per pixel of `source`.
    pub bytes_per_pixel: u32,
    pub source: &'a [u8],
    /// Bytes per row of `source`.
    pub pitch: usize,
    /// Apply the source's configured rotation.
    pub rotate: bool,
    pub moves: &'a [MoveRect],
    pub dirty_rects: &'a [Rect],
}

pub(crate) fn check_pixel_format(bytes_per_pixel: u32) -> Result<()> {
    if (MIN_BYTES_PER_PIXEL..=MAX_BYTES_PER_PIXEL).contains(&bytes_per_pixel) {
        return Ok(());
    }
    tracing::error!("present with {bytes_per_pixel} bytes per pixel, expected {MIN_BYTES_PER_PIXEL}");
    Err(DisplayError::UnsupportedPixelFormat { bytes_per_pixel })
}

impl<F: FrameBufferMemory> SourceState<F> {
    /// Copies the moved and dirty regions of `request` into the framebuffer.
    ///
    /// Dropped frames (hidden source, no active framebuffer) succeed without touching memory.
    pub fn present(&mut self, request: &PresentRequest<'_>) -> Result<()> {
        check_pixel_format(request.bytes_per_pixel)?;

        if self.flags.contains(SourceFlags::SOURCE_NOT_VISIBLE) || !self.is_frame_buffer_active()
        {
            return Ok(());
        }

        let rotation = if request.rotate {
            self.rotation
        } else {
            Rotation::Identity
        };

        // Content geometry: logical source surface, physical footprint in the framebuffer.
        let (src_width, src_height) = (self.source_width, self.source_height);
        let (content_width, content_height) = if rotation.swaps_axes() {
            (src_height, src_width)
        } else {
            (src_width, src_height)
        };
        let bpp = request.bytes_per_pixel as usize;
        let pitch = self.display.pitch as usize;
        let dst_bpp = (self.display.bits_per_pixel / 8) as usize;

        let row_bytes = src_width as usize * bpp;
        if request.pitch < row_bytes {
            return Err(DisplayError::InvalidPresentRequest(
                "source pitch narrower than a row",
            ));
        }
        let needed_source = match src_height {
            0 => 0,
            rows => (rows as usize - 1) * request.pitch + row_bytes,
        };
        if request.source.len() < needed_source {
            return Err(DisplayError::InvalidPresentRequest(
                "source buffer shorter than its surface",
            ));
        }

        let shift = match self.scaling {
            Scaling::Centered => {
                let rows = self.display.height.saturating_sub(content_height) / 2;
                let cols = self.display.width.saturating_sub(content_width) / 2;
                rows as usize * pitch + cols as usize * dst_bpp
            }
            Scaling::Identity => 0,
        };

        if content_width > self.display.width || content_height > self.display.height {
            return Err(DisplayError::InvalidPresentRequest(
                "source larger than the active mode",
            ));
        }

        let Some(frame_buffer) = self.frame_buffer.as_mut() else {
            return Ok(());
        };
        let needed = match content_height {
            0 => shift,
            rows => shift + (rows as usize - 1) * pitch + content_width as usize * dst_bpp,
        };
        if needed > frame_buffer.len() {
            return Err(DisplayError::InvalidPresentRequest(
                "frame buffer mapping smaller than the active mode",
            ));
        }

        // Real pixels are about to land; the next blank must start over.
        self.zeroed = PhysRange::EMPTY;

        let bounds = Rect::from_size(0, 0, src_width, src_height);
        let src = Surface {
            bits: request.source,
            layout: SurfaceLayout {
                pitch: request.pitch,
                bits_per_pixel: request.bytes_per_pixel * 8,
                width: src_width,
                height: src_height,
                rotation: Rotation::Identity,
                offset: Point::default(),
            },
        };
        let bytes = frame_buffer.as_bytes_mut();
        let mut dst = SurfaceMut {
            bits: &mut bytes[shift..],
            layout: SurfaceLayout {
                pitch,
                bits_per_pixel: self.display.bits_per_pixel,
                width: content_width,
                height: content_height,
                rotation,
                offset: Point::default(),
            },
        };

        // Moves must land before dirty rectangles are drawn over them.
        let rects = request
            .moves
            .iter()
            .map(|m| &m.dest_rect)
            .chain(request.dirty_rects.iter());
        for rect in rects {
            match rect.intersect(&bounds) {
                Some(clipped) => blt_rect(&mut dst, &src, &clipped),
                None => tracing::trace!("skipping rect {rect:?} outside the source surface"),
            }
        }
        Ok(())
    }
}
