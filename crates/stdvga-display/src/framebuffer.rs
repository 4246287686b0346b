use crate::Result;

/// A mapped view of linear framebuffer memory.
pub trait FrameBufferMemory {
    fn as_bytes(&self) -> &[u8];
    fn as_bytes_mut(&mut self) -> &mut [u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps physical framebuffer ranges (to be provided by the host I/O layer).
///
/// Failures are reported as [`crate::DisplayError::InsufficientResources`] and propagated
/// unchanged.
pub trait FrameBufferMapper {
    type Mapping: FrameBufferMemory;

    fn map_frame_buffer(&mut self, physical_base: u64, len: usize) -> Result<Self::Mapping>;
    fn unmap_frame_buffer(&mut self, mapping: Self::Mapping);
}

/// Framebuffer backed by host memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecFrameBuffer {
    physical_base: u64,
    bytes: Vec<u8>,
}

impl VecFrameBuffer {
    pub fn new(physical_base: u64, len: usize) -> Self {
        Self {
            physical_base,
            bytes: vec![0; len],
        }
    }

    pub fn physical_base(&self) -> u64 {
        self.physical_base
    }
}

impl FrameBufferMemory for VecFrameBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Mapper that hands out zeroed host-memory framebuffers, for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct HostMapper {
    /// Number of live mappings.
    pub mapped: usize,
}

impl FrameBufferMapper for HostMapper {
    type Mapping = VecFrameBuffer;

    fn map_frame_buffer(&mut self, physical_base: u64, len: usize) -> Result<VecFrameBuffer> {
        self.mapped += 1;
        Ok(VecFrameBuffer::new(physical_base, len))
    }

    fn unmap_frame_buffer(&mut self, _mapping: VecFrameBuffer) {
        self.mapped = self.mapped.saturating_sub(1);
    }
}
