use thiserror::Error;

pub type Result<T> = std::result::Result<T, DisplayError>;

/// Reasons the device cannot be driven at all. Fatal to device start; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unexpected PCI identity {vendor_id:04x}:{device_id:04x}")]
    IdentityMismatch { vendor_id: u16, device_id: u16 },

    #[error("unexpected PCI class {base_class:#04x}/{sub_class:#04x}")]
    ClassMismatch { base_class: u8, sub_class: u8 },

    #[error("memory resource {index} not present")]
    MissingMemoryResource { index: usize },

    #[error("MMIO region size {len:#x} is invalid")]
    InvalidMmioRegion { len: u64 },

    #[error("unsupported DISPI interface version {0:#06x}")]
    UnsupportedDispiVersion(u16),
}

/// Unified error type for display engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("device configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no display modes available")]
    NoModesAvailable,

    #[error("mode index {index} out of range (catalog has {count} modes)")]
    InvalidModeIndex { index: usize, count: usize },

    #[error("unsupported pixel format: {bytes_per_pixel} bytes per pixel")]
    UnsupportedPixelFormat { bytes_per_pixel: u32 },

    #[error("invalid video present source {0}")]
    InvalidSource(usize),

    #[error("invalid present request: {0}")]
    InvalidPresentRequest(&'static str),

    /// Mapping or allocation failure reported by the host I/O layer.
    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("device not started")]
    NotStarted,

    #[error("boot display information unavailable")]
    NoPostDisplay,

    #[error("no source has a mapped frame buffer for the system display")]
    NoSystemDisplay,

    #[error("invalid child device {0}")]
    InvalidChild(u32),

    #[error("monitor orientation is not reported")]
    RotationStatusUnsupported,

    #[error("child {0} has no device descriptor")]
    DescriptorNotSupported(u32),

    #[error("no descriptor data at offset {0}")]
    NoMoreDescriptorData(u32),
}
