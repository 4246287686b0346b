//! The display-only adapter: device bring-up, per-source mode state and the callbacks the display
//! framework drives (commit, present, visibility, power, bugcheck output, EDID).

use stdvga_edid::{generate_edid, is_valid_block, serial_number, EDID_BLOCK_SIZE};

use crate::blit::{blt_rect, Point, Rect, Rotation, Surface, SurfaceLayout, SurfaceMut};
use crate::caps::{DriverCaps, VidPnHwCapabilities, DRIVER_CAPS, VIDPN_HW_CAPABILITIES};
use crate::child::{ChildDescriptor, ChildStatusQuery, OutputTechnology};
use crate::config::{DisplayConfig, HardwareInfo};
use crate::device::{DeviceInfo, MemoryResource, FRAMEBUFFER_RESOURCE, MMIO_RESOURCE};
use crate::dispi::{Dispi, MmioWindow};
use crate::error::ConfigurationError;
use crate::framebuffer::{FrameBufferMapper, FrameBufferMemory};
use crate::mode::{DisplayInfo, ModeCatalog, ModeLimits};
use crate::modeset::set_mode;
use crate::present::{check_pixel_format, PresentRequest};
use crate::source::{Scaling, SourceState};
use crate::{DisplayError, Result};

/// Video present sources exposed to the framework.
pub const MAX_SOURCES: usize = 4;
/// Child outputs (monitors) exposed to the framework.
pub const MAX_CHILDREN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DevicePowerState {
    #[default]
    D0,
    D1,
    D2,
    D3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerTarget {
    Adapter,
    Monitor(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSelector {
    All,
    Source(usize),
}

/// A source mode chosen by the framework for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceModeRequest {
    pub mode_index: usize,
    pub target_id: u32,
    pub rotation: Rotation,
    pub scaling: Scaling,
    /// Unrotated size of the presented content; defaults to the mode's logical size.
    pub source_size: Option<(u32, u32)>,
}

impl SourceModeRequest {
    pub fn new(mode_index: usize) -> Self {
        Self {
            mode_index,
            target_id: 0,
            rotation: Rotation::Identity,
            scaling: Scaling::Identity,
            source_size: None,
        }
    }
}

pub struct Adapter<W, M: FrameBufferMapper> {
    config: DisplayConfig,
    device: DeviceInfo,
    dispi: Dispi<W>,
    mapper: M,
    frame_buffer: MemoryResource,
    catalog: ModeCatalog,
    sources: [SourceState<M::Mapping>; MAX_SOURCES],
    adapter_power: DevicePowerState,
    monitor_power: DevicePowerState,
    started: bool,
    has_post_display: bool,
    system_display_source: Option<usize>,
    edids: [Option<[u8; EDID_BLOCK_SIZE]>; MAX_CHILDREN],
}

impl<W: MmioWindow, M: FrameBufferMapper> Adapter<W, M> {
    /// Validates the PCI function, probes the DISPI interface and builds the mode catalog.
    ///
    /// `registers` is the mapped MMIO BAR (memory resource 1). `boot_mode` is the display the
    /// firmware left behind, if any; a zero width counts as none.
    pub fn start(
        device: DeviceInfo,
        boot_mode: Option<DisplayInfo>,
        registers: W,
        mapper: M,
        config: DisplayConfig,
    ) -> Result<Self> {
        if let Err(err) = device.identity.check() {
            tracing::error!("refusing to drive device: {err}");
            return Err(err.into());
        }

        let mmio = device.memory_resource(MMIO_RESOURCE).map_err(|err| {
            tracing::error!("failed to detect MMIO: {err}");
            err
        })?;
        if mmio.len < config.min_mmio_len || mmio.len > u64::from(u32::MAX) {
            tracing::error!("MMIO region size {:#x} is invalid", mmio.len);
            return Err(ConfigurationError::InvalidMmioRegion { len: mmio.len }.into());
        }

        let mut dispi = Dispi::with_base(registers, config.dispi_mmio_offset);
        let id = dispi.id();
        tracing::info!("VBE version {id:#06x}");
        if !config.supported_dispi_ids.contains(&id) {
            return Err(ConfigurationError::UnsupportedDispiVersion(id).into());
        }

        let frame_buffer = device.memory_resource(FRAMEBUFFER_RESOURCE)?;

        let boot_mode = boot_mode.filter(|boot| boot.width != 0);
        if boot_mode.is_none() {
            tracing::info!("no POST display, starting without a boot mode");
        }

        let mut adapter = Self {
            config,
            device,
            dispi,
            mapper,
            frame_buffer,
            catalog: ModeCatalog::default(),
            sources: std::array::from_fn(|_| SourceState::default()),
            adapter_power: DevicePowerState::D0,
            monitor_power: DevicePowerState::D0,
            started: false,
            has_post_display: boot_mode.is_some(),
            system_display_source: None,
            edids: [None; MAX_CHILDREN],
        };
        if let Some(boot) = boot_mode {
            adapter.sources[0].display = boot;
        }
        if let Err(err) = adapter.enumerate_modes(boot_mode.as_ref()) {
            tracing::error!("mode enumeration failed: {err}");
            return Err(err);
        }

        adapter.started = true;
        Ok(adapter)
    }

    /// Unmaps every source framebuffer and marks the device stopped.
    pub fn stop(&mut self) {
        for source in &mut self.sources {
            if let Some(mapping) = source.deactivate() {
                self.mapper.unmap_frame_buffer(mapping);
            }
        }
        self.started = false;
    }

    /// Video memory usable for scanout: the DISPI report, capped at the framebuffer BAR.
    pub fn video_memory(&mut self) -> u64 {
        let reported = self.dispi.video_memory_bytes();
        if reported > self.frame_buffer.len {
            tracing::warn!(
                "DISPI reports {reported:#x} bytes of video memory, framebuffer BAR is {:#x}",
                self.frame_buffer.len
            );
            return self.frame_buffer.len;
        }
        reported
    }

    /// Rebuilds the mode catalog. The previous catalog is kept on failure.
    pub fn enumerate_modes(&mut self, boot_mode: Option<&DisplayInfo>) -> Result<()> {
        let limits = ModeLimits {
            video_memory: self.video_memory(),
            framebuffer_base: self.frame_buffer.start,
            max_width: self.device.limits.max_width,
            max_height: self.device.limits.max_height,
            max_bits_per_pixel: self.device.limits.max_bits_per_pixel,
        };
        self.catalog = ModeCatalog::enumerate(boot_mode, &limits)?;
        Ok(())
    }

    pub fn set_mode(&mut self, index: usize) -> Result<()> {
        set_mode(&mut self.dispi, &self.catalog, index)
    }

    pub fn find_matching_mode(&self, width: u32, height: u32, bits_per_pixel: u32) -> Option<usize> {
        self.catalog.find_matching(width, height, bits_per_pixel)
    }

    fn ensure_started(&self) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(DisplayError::NotStarted)
        }
    }

    fn check_source(&self, source_id: usize) -> Result<()> {
        if source_id < MAX_SOURCES {
            Ok(())
        } else {
            Err(DisplayError::InvalidSource(source_id))
        }
    }

    /// Programs the requested mode and points the source at a fresh framebuffer mapping.
    ///
    /// The new mapping is created before any register is touched, so a mapping failure leaves
    /// both the device and the source as they were.
    pub fn commit_source_mode(&mut self, source_id: usize, request: &SourceModeRequest) -> Result<()> {
        self.ensure_started()?;
        self.check_source(source_id)?;
        let mode = *self
            .catalog
            .get(request.mode_index)
            .ok_or(DisplayError::InvalidModeIndex {
                index: request.mode_index,
                count: self.catalog.len(),
            })?;

        let len = usize::try_from(mode.footprint()).map_err(|_| {
            DisplayError::InsufficientResources(format!(
                "{:#x} bytes of framebuffer do not fit the address space",
                mode.footprint()
            ))
        })?;
        let mapping = self
            .mapper
            .map_frame_buffer(mode.physical_base, len)
            .map_err(|err| {
                tracing::error!("mapping {len:#x} bytes at {:#x} failed: {err}", mode.physical_base);
                err
            })?;

        if let Err(err) = set_mode(&mut self.dispi, &self.catalog, request.mode_index) {
            self.mapper.unmap_frame_buffer(mapping);
            return Err(err);
        }

        let source_size = request.source_size.unwrap_or(if request.rotation.swaps_axes() {
            (u32::from(mode.height), u32::from(mode.width))
        } else {
            (u32::from(mode.width), u32::from(mode.height))
        });
        let previous = self.sources[source_id].activate(
            &mode,
            request.target_id,
            request.rotation,
            request.scaling,
            source_size,
            mapping,
        );
        if let Some(previous) = previous {
            self.mapper.unmap_frame_buffer(previous);
        }
        tracing::debug!(
            "source {source_id} now {}x{} (mode {}), rotation {}",
            mode.width,
            mode.height,
            request.mode_index,
            request.rotation.degrees()
        );
        Ok(())
    }

    /// Drops the source's framebuffer mapping.
    pub fn release_source(&mut self, source_id: usize) -> Result<()> {
        self.check_source(source_id)?;
        if let Some(mapping) = self.sources[source_id].deactivate() {
            self.mapper.unmap_frame_buffer(mapping);
        }
        Ok(())
    }

    /// Hiding a source blanks it first; presents are dropped until it is shown again.
    pub fn set_source_visibility(&mut self, selector: SourceSelector, visible: bool) -> Result<()> {
        let ids = match selector {
            SourceSelector::All => 0..MAX_SOURCES,
            SourceSelector::Source(id) => {
                self.check_source(id)?;
                id..id + 1
            }
        };
        for source in &mut self.sources[ids] {
            if !visible {
                source.blank();
            }
            source.set_visible(visible);
        }
        Ok(())
    }

    pub fn set_power_state(
        &mut self,
        target: PowerTarget,
        state: DevicePowerState,
        boot_mode: Option<&DisplayInfo>,
    ) -> Result<()> {
        match target {
            PowerTarget::Adapter => {
                if state == DevicePowerState::D0 {
                    self.ensure_started()?;
                    let boot = boot_mode
                        .filter(|boot| boot.width != 0)
                        .ok_or(DisplayError::NoPostDisplay)?;
                    self.enumerate_modes(Some(boot))?;
                    self.sources[0].display = *boot;

                    // Coming back from D3 every source starts out hidden.
                    if self.adapter_power == DevicePowerState::D3 {
                        self.set_source_visibility(SourceSelector::All, false)?;
                    }
                }
                tracing::debug!("adapter power {:?} -> {state:?}", self.adapter_power);
                self.adapter_power = state;
            }
            PowerTarget::Monitor(target_id) => {
                if state == DevicePowerState::D0 && self.monitor_power != DevicePowerState::D0 {
                    let source_id = self.find_source_for_target(target_id, true).unwrap_or(0);
                    self.set_source_visibility(SourceSelector::Source(source_id), true)?;
                }
                tracing::debug!("monitor power {:?} -> {state:?}", self.monitor_power);
                self.monitor_power = state;
            }
        }
        Ok(())
    }

    /// First source with a mapped framebuffer. Every source can drive every target.
    pub fn find_source_for_target(&self, _target_id: u32, default_to_zero: bool) -> Option<usize> {
        self.sources
            .iter()
            .position(|source| source.has_mapping())
            .or(default_to_zero.then_some(0))
    }

    /// Presents to `source_id`. Frames are dropped while the monitor is powered down.
    pub fn present(&mut self, source_id: usize, request: &PresentRequest<'_>) -> Result<()> {
        self.check_source(source_id)?;
        check_pixel_format(request.bytes_per_pixel)?;
        if self.monitor_power > DevicePowerState::D0 {
            return Ok(());
        }
        self.sources[source_id].present(request)
    }

    pub fn blank(&mut self, source_id: usize) -> Result<()> {
        self.check_source(source_id)?;
        self.sources[source_id].blank();
        Ok(())
    }

    /// Hands the display back to firmware: the monitor is powered, the screen blanked and the
    /// device stopped. Returns the display the next owner inherits.
    pub fn stop_and_release_post_display(&mut self, target_id: u32) -> Result<DisplayInfo> {
        let source_id = self.find_source_for_target(target_id, true).unwrap_or(0);

        if self.monitor_power > DevicePowerState::D0 {
            self.set_power_state(PowerTarget::Monitor(target_id), DevicePowerState::D0, None)?;
        }

        self.sources[source_id].blank();
        let info = self.sources[source_id].display;
        self.stop();
        Ok(info)
    }

    /// Picks the source used for bugcheck output and reports its logical size and depth.
    pub fn system_display_enable(&mut self, target_id: Option<u32>) -> Result<(u32, u32, u32)> {
        self.system_display_source = None;
        let source_id = match target_id {
            None => self.sources.iter().position(|source| source.has_mapping()),
            Some(target_id) => self.find_source_for_target(target_id, false),
        };
        let Some(source_id) = source_id else {
            return Err(DisplayError::NoSystemDisplay);
        };
        self.system_display_source = Some(source_id);

        let source = &self.sources[source_id];
        let info = source.display;
        let (width, height) = if source.rotation.swaps_axes() {
            (info.height, info.width)
        } else {
            (info.width, info.height)
        };
        Ok((width, height, info.bits_per_pixel))
    }

    /// Draws a 32bpp image at `(x, y)` of the system display, clipped to the screen.
    pub fn system_display_write(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        x: i32,
        y: i32,
    ) -> Result<()> {
        let source_id = self
            .system_display_source
            .ok_or(DisplayError::NoSystemDisplay)?;
        let source = &mut self.sources[source_id];
        let info = source.display;
        let rotation = source.rotation;
        let Some(frame_buffer) = source.frame_buffer.as_mut() else {
            return Err(DisplayError::NoSystemDisplay);
        };

        let row_bytes = width as usize * 4;
        let needed = match height {
            0 => 0,
            rows => (rows as usize - 1) * stride + row_bytes,
        };
        if stride < row_bytes || src.len() < needed {
            return Err(DisplayError::InvalidPresentRequest(
                "system display image shorter than its size",
            ));
        }
        let footprint = usize::try_from(info.footprint()).unwrap_or(usize::MAX);
        if frame_buffer.len() < footprint {
            return Err(DisplayError::InvalidPresentRequest(
                "frame buffer mapping smaller than the active mode",
            ));
        }

        let dst_layout = SurfaceLayout {
            pitch: info.pitch as usize,
            bits_per_pixel: info.bits_per_pixel,
            width: info.width,
            height: info.height,
            rotation,
            offset: Point::default(),
        };
        let (screen_width, screen_height) = dst_layout.logical_size();
        let rect = Rect::from_size(x, y, width, height);
        let Some(rect) = rect.intersect(&Rect::from_size(0, 0, screen_width, screen_height)) else {
            return Ok(());
        };
        let (Some(dx), Some(dy)) = (x.checked_neg(), y.checked_neg()) else {
            return Err(DisplayError::InvalidPresentRequest(
                "system display position out of range",
            ));
        };

        let src = Surface {
            bits: src,
            layout: SurfaceLayout::linear(width, height, stride).with_offset(Point::new(dx, dy)),
        };
        let mut dst = SurfaceMut {
            bits: frame_buffer.as_bytes_mut(),
            layout: dst_layout,
        };
        blt_rect(&mut dst, &src, &rect);
        Ok(())
    }

    /// Marks a source as driving a built-in panel; children then report an internal connector.
    pub fn set_source_internal(&mut self, source_id: usize, internal: bool) -> Result<()> {
        self.check_source(source_id)?;
        self.sources[source_id].set_internal(internal);
        Ok(())
    }

    /// One video output per child uid. The connector technology follows source 0.
    pub fn query_child_relations(&self) -> [ChildDescriptor; MAX_CHILDREN] {
        let technology = if self.sources[0].is_internal() {
            OutputTechnology::Internal
        } else {
            OutputTechnology::Other
        };
        std::array::from_fn(|uid| ChildDescriptor::video_output(uid as u32, technology))
    }

    /// Hot-plug is not observable, so every child is connected while the device runs.
    pub fn is_child_connected(&self, _child_uid: u32) -> bool {
        self.started
    }

    /// Answers a child status query. Children are not orientation aware, so rotation queries
    /// are refused.
    pub fn query_child_status(&self, child_uid: u32, query: ChildStatusQuery) -> Result<bool> {
        if child_uid as usize >= MAX_CHILDREN {
            return Err(DisplayError::InvalidChild(child_uid));
        }
        match query {
            ChildStatusQuery::Connection => Ok(self.is_child_connected(child_uid)),
            ChildStatusQuery::Rotation => {
                tracing::error!("rotation status queried for child {child_uid}");
                Err(DisplayError::RotationStatusUnsupported)
            }
        }
    }

    /// Copies the EDID base block for `child_uid` into `buf`; returns the bytes written.
    pub fn query_device_descriptor(
        &mut self,
        child_uid: u32,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<usize> {
        let Some(slot) = self.edids.get_mut(child_uid as usize) else {
            return Err(DisplayError::DescriptorNotSupported(child_uid));
        };
        let location = self.device.location;
        let edid = slot.get_or_insert_with(|| generate_edid(serial_number(location, child_uid)));
        if !is_valid_block(&edid[..]) {
            return Err(DisplayError::DescriptorNotSupported(child_uid));
        }
        if offset != 0 {
            return Err(DisplayError::NoMoreDescriptorData(offset));
        }
        let len = buf.len().min(EDID_BLOCK_SIZE);
        buf[..len].copy_from_slice(&edid[..len]);
        Ok(len)
    }

    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }

    pub fn source(&self, source_id: usize) -> Option<&SourceState<M::Mapping>> {
        self.sources.get(source_id)
    }

    pub fn sources(&self) -> &[SourceState<M::Mapping>] {
        &self.sources
    }

    pub fn adapter_power(&self) -> DevicePowerState {
        self.adapter_power
    }

    pub fn monitor_power(&self) -> DevicePowerState {
        self.monitor_power
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_post_display(&self) -> bool {
        self.has_post_display
    }

    pub fn system_display_source(&self) -> Option<usize> {
        self.system_display_source
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn hardware_info(&self) -> &HardwareInfo {
        &self.config.hardware_info
    }

    pub fn vidpn_hw_capabilities(&self) -> VidPnHwCapabilities {
        VIDPN_HW_CAPABILITIES
    }

    pub fn driver_caps(&self) -> DriverCaps {
        DRIVER_CAPS
    }

    pub fn registers(&self) -> &W {
        self.dispi.window()
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut M {
        &mut self.mapper
    }
}
