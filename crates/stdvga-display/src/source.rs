use bitflags::bitflags;

use crate::blank::PhysRange;
use crate::blit::Rotation;
use crate::framebuffer::FrameBufferMemory;
use crate::mode::{DisplayInfo, DisplayMode};

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct SourceFlags: u32 {
        /// A framebuffer mapping exists and may be written.
        const FRAME_BUFFER_ACTIVE = 1 << 0;
        /// Presents are dropped until the source is made visible again.
        const SOURCE_NOT_VISIBLE = 1 << 1;
        /// The source drives a built-in panel rather than an external connector.
        const IS_INTERNAL = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scaling {
    #[default]
    Identity,
    /// Smaller content is centered in the mode without resampling.
    Centered,
}

/// Current mode of one video present source.
#[derive(Debug)]
pub struct SourceState<F> {
    pub(crate) display: DisplayInfo,
    pub(crate) mode_index: Option<usize>,
    pub(crate) rotation: Rotation,
    pub(crate) scaling: Scaling,
    pub(crate) source_width: u32,
    pub(crate) source_height: u32,
    pub(crate) frame_buffer: Option<F>,
    pub(crate) flags: SourceFlags,
    pub(crate) zeroed: PhysRange,
}

impl<F> Default for SourceState<F> {
    fn default() -> Self {
        Self {
            display: DisplayInfo::default(),
            mode_index: None,
            rotation: Rotation::Identity,
            scaling: Scaling::Identity,
            source_width: 0,
            source_height: 0,
            frame_buffer: None,
            flags: SourceFlags::empty(),
            zeroed: PhysRange::EMPTY,
        }
    }
}

impl<F: FrameBufferMemory> SourceState<F> {
    pub fn display_info(&self) -> &DisplayInfo {
        &self.display
    }

    pub fn mode_index(&self) -> Option<usize> {
        self.mode_index
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    /// Unrotated size of the content presented to this source.
    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn flags(&self) -> SourceFlags {
        self.flags
    }

    pub fn zeroed_range(&self) -> PhysRange {
        self.zeroed
    }

    pub fn is_frame_buffer_active(&self) -> bool {
        self.flags.contains(SourceFlags::FRAME_BUFFER_ACTIVE)
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.contains(SourceFlags::SOURCE_NOT_VISIBLE)
    }

    pub fn has_mapping(&self) -> bool {
        self.frame_buffer.is_some()
    }

    pub fn frame_buffer(&self) -> Option<&F> {
        self.frame_buffer.as_ref()
    }

    pub fn is_internal(&self) -> bool {
        self.flags.contains(SourceFlags::IS_INTERNAL)
    }

    pub(crate) fn set_internal(&mut self, internal: bool) {
        self.flags.set(SourceFlags::IS_INTERNAL, internal);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.flags.set(SourceFlags::SOURCE_NOT_VISIBLE, !visible);
    }

    /// Installs `mode` with a fresh mapping, handing back the previous one for unmapping.
    pub(crate) fn activate(
        &mut self,
        mode: &DisplayMode,
        target_id: u32,
        rotation: Rotation,
        scaling: Scaling,
        source_size: (u32, u32),
        frame_buffer: F,
    ) -> Option<F> {
        let previous = self.frame_buffer.replace(frame_buffer);
        self.display = mode.display_info(target_id);
        self.mode_index = Some(usize::from(mode.mode_index));
        self.rotation = rotation;
        self.scaling = scaling;
        (self.source_width, self.source_height) = source_size;
        self.flags.insert(SourceFlags::FRAME_BUFFER_ACTIVE);
        previous
    }

    /// Drops the mapping; the display info is kept for later queries.
    ///
    /// Whatever was zeroed through the old mapping is forgotten.
    pub(crate) fn deactivate(&mut self) -> Option<F> {
        self.flags.remove(SourceFlags::FRAME_BUFFER_ACTIVE);
        self.zeroed = PhysRange::EMPTY;
        self.frame_buffer.take()
    }
}
