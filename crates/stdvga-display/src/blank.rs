//! Screen blanking with lazy re-zeroing.
//!
//! Each source remembers the physical range it zeroed last. Blanking again only clears the parts
//! of the new range outside that interval, so repeated power toggles on an idle screen cost no
//! memory traffic. Any present forgets the interval.

use crate::framebuffer::FrameBufferMemory;
use crate::source::SourceState;

/// A half-open physical address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysRange {
    pub start: u64,
    pub end: u64,
}

impl PhysRange {
    pub const EMPTY: PhysRange = PhysRange { start: 0, end: 0 };

    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Parts of `self` outside `known`, as at most a leading and a trailing range.
    pub fn difference(&self, known: &PhysRange) -> [Option<PhysRange>; 2] {
        if self.is_empty() {
            return [None, None];
        }
        if known.is_empty() || known.end <= self.start || known.start >= self.end {
            return [Some(*self), None];
        }
        let head = PhysRange::new(self.start, known.start.min(self.end));
        let tail = PhysRange::new(known.end.max(self.start), self.end);
        [
            (!head.is_empty()).then_some(head),
            (!tail.is_empty()).then_some(tail),
        ]
    }
}

impl<F: FrameBufferMemory> SourceState<F> {
    /// Zeroes whatever part of the current mode's framebuffer is not known to be zero.
    ///
    /// Without an active mapping nothing is written and nothing is remembered.
    pub fn blank(&mut self) {
        if !self.is_frame_buffer_active() {
            return;
        }
        let Some(frame_buffer) = self.frame_buffer.as_mut() else {
            return;
        };

        let start = self.display.physical_base;
        let range = PhysRange::new(start, start.saturating_add(self.display.footprint()));
        let pending = range.difference(&self.zeroed);
        if pending.iter().any(Option::is_some) {
            let bytes = frame_buffer.as_bytes_mut();
            for part in pending.into_iter().flatten() {
                let from = usize::try_from(part.start - start).unwrap_or(usize::MAX);
                let to = usize::try_from(part.end - start).unwrap_or(usize::MAX);
                let to = to.min(bytes.len());
                if from < to {
                    bytes[from..to].fill(0);
                }
            }
            tracing::trace!(
                "blanked {:#x}..{:#x} (previously zeroed {:#x}..{:#x})",
                range.start,
                range.end,
                self.zeroed.start,
                self.zeroed.end
            );
        }
        self.zeroed = range;
    }
}
