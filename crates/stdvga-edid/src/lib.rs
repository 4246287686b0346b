//! Synthetic EDID for the Bochs/QEMU Standard VGA display output.
//!
//! The virtual adapter has no DDC channel, so the display driver hands the OS a fixed EDID 1.4
//! base block. Only the serial number varies: it encodes the PCI location of the adapter and the
//! child (target) id, so several adapters in one guest do not look like the same monitor.
//!
//! The preferred timing is 1152x864@60Hz with CVT reduced blanking. That mode is not a VESA DMT
//! mode at 60Hz, which matters because the driver reports its refresh rates as "not specified";
//! for the same reason no established or standard timings are advertised.

#![forbid(unsafe_code)]

/// Size of an EDID 1.x block in bytes.
pub const EDID_BLOCK_SIZE: usize = 128;

/// Byte offset of the little-endian 32-bit serial number.
pub const SERIAL_NUMBER_OFFSET: usize = 0x0C;

/// Byte offset of the first 18-byte descriptor (the preferred timing).
pub const PREFERRED_TIMING_OFFSET: usize = 54;

/// Monitor name advertised in the display product name descriptor.
pub const MONITOR_NAME: &str = "XSTDVGA";

const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// PCI bus/device/function of the adapter, as reported by the bus driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PciLocation {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

/// Computes the EDID serial number for `target_id`.
///
/// Layout: `bus[31:24] | device[23:19] | function[18:16] | target[15:0]`. Without a known PCI
/// location only the target id is encoded.
pub fn serial_number(location: Option<PciLocation>, target_id: u32) -> u32 {
    let target = target_id & 0xFFFF;
    let Some(loc) = location else {
        return target;
    };
    let bus = u32::from(loc.bus);
    let device = u32::from(loc.device) & 0x1F;
    let function = u32::from(loc.function) & 0x7;
    (bus << 24) | (device << 19) | (function << 16) | target
}

fn base_template() -> [u8; EDID_BLOCK_SIZE] {
    let mut edid = [0u8; EDID_BLOCK_SIZE];
    edid[0..8].copy_from_slice(&EDID_HEADER);

    // Manufacturer "RHT", product code 0, serial filled in later.
    edid[8] = 0x49;
    edid[9] = 0x14;

    // Week 0xFF marks the following byte as a model year: 1990 + 36 = 2026.
    edid[16] = 0xFF;
    edid[17] = 0x24;

    // EDID 1.4.
    edid[18] = 0x01;
    edid[19] = 0x04;

    // Digital input, 8 bits per colour, undefined interface.
    edid[20] = 0xA0;
    // Screen size unknown.
    edid[21] = 0x00;
    edid[22] = 0x00;
    // Gamma 2.2.
    edid[23] = 0x78;
    // Active-off DPM, RGB 4:4:4, sRGB default, preferred timing is native, continuous frequency.
    edid[24] = 0x26;

    // sRGB chromaticity coordinates.
    edid[25..35].copy_from_slice(&[0xEE, 0x91, 0xA3, 0x54, 0x4C, 0x99, 0x26, 0x0F, 0x50, 0x54]);

    // Established timings (35..38) stay zero. Standard timings are all "unused".
    for b in &mut edid[38..54] {
        *b = 0x01;
    }

    // Preferred timing: 1152x864@60Hz, CVT-RB, 69.75 MHz pixel clock.
    edid[54..72].copy_from_slice(&[
        0x3F, 0x1B, 0x80, 0xA0, 0x40, 0x60, 0x19, 0x30, 0x30, 0x20, 0x34, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x1A,
    ]);

    // Display product name.
    let name = &mut edid[72..90];
    name[..5].copy_from_slice(&[0x00, 0x00, 0x00, 0xFC, 0x00]);
    let text = &mut name[5..];
    text.fill(b' ');
    text[..MONITOR_NAME.len()].copy_from_slice(MONITOR_NAME.as_bytes());
    text[MONITOR_NAME.len()] = b'\n';

    // Two dummy descriptors.
    edid[93] = 0x10;
    edid[111] = 0x10;

    // No extension blocks; checksum is written by `generate_edid`.
    edid
}

/// Builds the EDID base block carrying `serial`, with a valid checksum.
pub fn generate_edid(serial: u32) -> [u8; EDID_BLOCK_SIZE] {
    let mut edid = base_template();
    edid[SERIAL_NUMBER_OFFSET..SERIAL_NUMBER_OFFSET + 4].copy_from_slice(&serial.to_le_bytes());
    let sum = edid[..EDID_BLOCK_SIZE - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    edid[EDID_BLOCK_SIZE - 1] = sum.wrapping_neg();
    edid
}

/// Returns EDID block `block` for `serial`.
///
/// The generated EDID advertises no extension blocks, so only block 0 exists.
pub fn read_edid(block: u8, serial: u32) -> Option<[u8; EDID_BLOCK_SIZE]> {
    (block == 0).then(|| generate_edid(serial))
}

/// Returns whether `edid` starts with the fixed header and its bytes sum to zero.
pub fn is_valid_block(edid: &[u8]) -> bool {
    edid.len() == EDID_BLOCK_SIZE
        && edid[..8] == EDID_HEADER
        && edid.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) == 0
}
