use crate::dispi::{
    Dispi, DispiIndex, MmioWindow, VBE_DISPI_DISABLED, VBE_DISPI_ENABLED, VBE_DISPI_LFB_ENABLED,
};
use crate::mode::ModeCatalog;
use crate::{DisplayError, Result};

/// Programs the DISPI registers for catalog entry `index`.
///
/// Depth and resolution are written with the output disabled; the device ignores resolution
/// changes while enabled. The virtual size matches the visible size, so the scanline pitch is
/// always `width * bpp / 8` and panning is reset.
pub fn set_mode<W: MmioWindow>(
    dispi: &mut Dispi<W>,
    catalog: &ModeCatalog,
    index: usize,
) -> Result<()> {
    let Some(mode) = catalog.get(index) else {
        return Err(DisplayError::InvalidModeIndex {
            index,
            count: catalog.len(),
        });
    };

    tracing::debug!(
        "setting mode {index}: {}x{}x{}",
        mode.width,
        mode.height,
        mode.bits_per_pixel
    );

    dispi.write(DispiIndex::Enable, VBE_DISPI_DISABLED);
    dispi.write(DispiIndex::Bank, 0);
    dispi.write(DispiIndex::XOffset, 0);
    dispi.write(DispiIndex::YOffset, 0);

    dispi.write(DispiIndex::Bpp, mode.bits_per_pixel);
    dispi.write(DispiIndex::Xres, mode.width);
    dispi.write(DispiIndex::VirtWidth, mode.width);
    dispi.write(DispiIndex::Yres, mode.height);
    dispi.write(DispiIndex::VirtHeight, mode.height);

    dispi.write(DispiIndex::Enable, VBE_DISPI_ENABLED | VBE_DISPI_LFB_ENABLED);
    Ok(())
}
