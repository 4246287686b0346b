//! Child outputs (monitors) reported to the display framework.

/// Connector technology reported for a video output child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTechnology {
    /// Built-in panel.
    Internal,
    #[default]
    Other,
}

/// One video output child as enumerated at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildDescriptor {
    pub child_uid: u32,
    pub acpi_uid: u32,
    pub technology: OutputTechnology,
    /// Hot-plug changes are signalled rather than polled; the virtual monitor never raises one.
    pub hpd_interruptible: bool,
    /// Whether the monitor reports its physical orientation.
    pub orientation_aware: bool,
    pub supports_sdtv_modes: bool,
}

impl ChildDescriptor {
    pub fn video_output(child_uid: u32, technology: OutputTechnology) -> Self {
        Self {
            child_uid,
            acpi_uid: 0,
            technology,
            hpd_interruptible: true,
            orientation_aware: false,
            supports_sdtv_modes: false,
        }
    }
}

/// Kind of status the framework asks a child for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildStatusQuery {
    Connection,
    Rotation,
}
