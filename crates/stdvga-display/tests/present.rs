mod common;

use common::*;
use pretty_assertions::assert_eq;
use stdvga_display::{
    DevicePowerState, DisplayError, MoveRect, Point, PowerTarget, PresentRequest, Rect, Rotation,
    Scaling, SourceModeRequest, SourceSelector,
};

const FILL: u8 = 0xAA;

fn adapter_with_mode(width: u32, height: u32, request: SourceModeRequest) -> TestAdapter {
    let mut adapter = started_adapter();
    let index = adapter.find_matching_mode(width, height, 32).unwrap();
    adapter
        .commit_source_mode(
            0,
            &SourceModeRequest {
                mode_index: index,
                ..request
            },
        )
        .unwrap();
    adapter
}

fn full_present<'a>(source: &'a [u8], width: u32, rects: &'a [Rect]) -> PresentRequest<'a> {
    PresentRequest {
        bytes_per_pixel: 4,
        source,
        pitch: width as usize * 4,
        rotate: true,
        moves: &[],
        dirty_rects: rects,
    }
}

fn frame_buffer(adapter: &TestAdapter) -> &CountingFrameBuffer {
    adapter.source(0).unwrap().frame_buffer().unwrap()
}

fn pixel_at(bytes: &[u8], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}

#[test]
fn identity_present_copies_dirty_rects_only() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    let image = pattern_surface(640, 480);
    let rects = [Rect::new(10, 20, 30, 25), Rect::new(600, 470, 640, 480)];
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();

    let mut expected = vec![FILL; 640 * 480 * 4];
    for rect in rects {
        for y in rect.top..rect.bottom {
            let start = (y as usize * 640 + rect.left as usize) * 4;
            let end = (y as usize * 640 + rect.right as usize) * 4;
            expected[start..end].copy_from_slice(&image[start..end]);
        }
    }
    assert!(frame_buffer(&adapter).bytes == expected);
}

#[test]
fn centered_present_lands_at_the_floor_offset() {
    // 800x600 mode, 637x475 content: 62 rows and 81 columns of border.
    let mut adapter = adapter_with_mode(
        800,
        600,
        SourceModeRequest {
            scaling: Scaling::Centered,
            source_size: Some((637, 475)),
            ..SourceModeRequest::new(0)
        },
    );
    let image = pattern_surface(637, 475);
    let rects = [Rect::from_size(0, 0, 637, 475)];
    adapter.present(0, &full_present(&image, 637, &rects)).unwrap();

    let shift = 62 * 3200 + 81 * 4;
    let mut expected = vec![FILL; 800 * 600 * 4];
    for y in 0..475usize {
        let dst = shift + y * 3200;
        expected[dst..dst + 637 * 4].copy_from_slice(&image[y * 637 * 4..(y + 1) * 637 * 4]);
    }
    let bytes = &frame_buffer(&adapter).bytes;
    assert_eq!(pixel_at(bytes, shift), pattern_pixel(0, 0));
    assert_eq!(pixel_at(bytes, shift - 4), [FILL; 4]);
    assert!(*bytes == expected);
}

#[test]
fn oversized_content_is_rejected() {
    let mut adapter = adapter_with_mode(
        640,
        480,
        SourceModeRequest {
            scaling: Scaling::Centered,
            source_size: Some((800, 600)),
            ..SourceModeRequest::new(0)
        },
    );
    let image = pattern_surface(800, 600);
    let rects = [Rect::from_size(0, 0, 800, 600)];
    assert!(matches!(
        adapter.present(0, &full_present(&image, 800, &rects)),
        Err(DisplayError::InvalidPresentRequest(_))
    ));
    assert_eq!(frame_buffer(&adapter).write_borrows, 0);
}

#[test]
fn short_source_buffers_are_rejected() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    let image = pattern_surface(640, 479);
    let rects = [Rect::from_size(0, 0, 640, 480)];
    assert!(matches!(
        adapter.present(0, &full_present(&image, 640, &rects)),
        Err(DisplayError::InvalidPresentRequest(_))
    ));

    let image = pattern_surface(640, 480);
    let request = PresentRequest {
        pitch: 640 * 4 - 4,
        ..full_present(&image, 640, &rects)
    };
    assert!(matches!(
        adapter.present(0, &request),
        Err(DisplayError::InvalidPresentRequest(_))
    ));
    assert_eq!(frame_buffer(&adapter).write_borrows, 0);
}

#[test]
fn rects_are_clipped_to_the_source() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    let image = pattern_surface(640, 480);
    let rects = [Rect::new(-10, -10, 2, 1), Rect::new(700, 0, 710, 10)];
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();

    let bytes = &frame_buffer(&adapter).bytes;
    assert_eq!(pixel_at(bytes, 0), pattern_pixel(0, 0));
    assert_eq!(pixel_at(bytes, 4), pattern_pixel(1, 0));
    assert_eq!(pixel_at(bytes, 8), [FILL; 4]);
    assert_eq!(pixel_at(bytes, 640 * 4), [FILL; 4]);
}

#[test]
fn moves_refresh_their_destination_from_the_source() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    let image = pattern_surface(640, 480);
    let moves = [MoveRect {
        source_point: Point::new(0, 0),
        dest_rect: Rect::new(100, 100, 104, 102),
    }];
    let request = PresentRequest {
        moves: &moves,
        ..full_present(&image, 640, &[])
    };
    adapter.present(0, &request).unwrap();

    let bytes = &frame_buffer(&adapter).bytes;
    assert_eq!(pixel_at(bytes, (100 * 640 + 100) * 4), pattern_pixel(100, 100));
    assert_eq!(pixel_at(bytes, (101 * 640 + 103) * 4), pattern_pixel(103, 101));
    assert_eq!(pixel_at(bytes, (102 * 640 + 100) * 4), [FILL; 4]);
}

#[test]
fn rotated_present_follows_the_source_rotation() {
    // Physical 800x600, logical 600x800.
    let mut adapter = adapter_with_mode(
        800,
        600,
        SourceModeRequest {
            rotation: Rotation::Rotate90,
            ..SourceModeRequest::new(0)
        },
    );
    let image = pattern_surface(600, 800);
    let rects = [Rect::new(0, 0, 3, 2)];
    adapter.present(0, &full_present(&image, 600, &rects)).unwrap();

    // Logical (x, y) lands at physical row 599 - x, column y.
    let bytes = &frame_buffer(&adapter).bytes;
    for y in 0..2u32 {
        for x in 0..3u32 {
            let offset = (599 - x as usize) * 3200 + y as usize * 4;
            assert_eq!(pixel_at(bytes, offset), pattern_pixel(x, y), "({x}, {y})");
        }
    }
    assert_eq!(pixel_at(bytes, 599 * 3200 + 2 * 4), [FILL; 4]);
}

#[test]
fn rotate_flag_off_presents_unrotated() {
    let mut adapter = adapter_with_mode(
        640,
        480,
        SourceModeRequest {
            rotation: Rotation::Rotate180,
            ..SourceModeRequest::new(0)
        },
    );
    let image = pattern_surface(640, 480);
    let rects = [Rect::new(0, 0, 1, 1)];
    let request = PresentRequest {
        rotate: false,
        ..full_present(&image, 640, &rects)
    };
    adapter.present(0, &request).unwrap();
    assert_eq!(pixel_at(&frame_buffer(&adapter).bytes, 0), pattern_pixel(0, 0));

    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();
    let last = (480 * 640 - 1) * 4;
    assert_eq!(pixel_at(&frame_buffer(&adapter).bytes, last), pattern_pixel(0, 0));
}

#[test]
fn monitor_off_drops_frames_without_touching_memory() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    adapter
        .set_power_state(PowerTarget::Monitor(0), DevicePowerState::D3, None)
        .unwrap();

    let image = pattern_surface(640, 480);
    let rects = [Rect::from_size(0, 0, 640, 480)];
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();

    let fb = frame_buffer(&adapter);
    assert_eq!(fb.write_borrows, 0);
    assert!(fb.bytes.iter().all(|&b| b == FILL));
}

#[test]
fn pixel_format_is_checked_before_anything_else() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    adapter
        .set_power_state(PowerTarget::Monitor(0), DevicePowerState::D1, None)
        .unwrap();
    let image = pattern_surface(640, 480);
    for bytes_per_pixel in [2, 3, 8] {
        let request = PresentRequest {
            bytes_per_pixel,
            ..full_present(&image, 640, &[])
        };
        assert_eq!(
            adapter.present(0, &request),
            Err(DisplayError::UnsupportedPixelFormat { bytes_per_pixel })
        );
    }
    assert_eq!(
        adapter.present(7, &full_present(&image, 640, &[])),
        Err(DisplayError::InvalidSource(7))
    );
}

#[test]
fn hidden_or_unmapped_sources_drop_frames() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    adapter
        .set_source_visibility(SourceSelector::Source(0), false)
        .unwrap();
    // Hiding blanks once.
    assert_eq!(frame_buffer(&adapter).write_borrows, 1);

    let image = pattern_surface(640, 480);
    let rects = [Rect::from_size(0, 0, 640, 480)];
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();
    assert_eq!(frame_buffer(&adapter).write_borrows, 1);
    assert!(frame_buffer(&adapter).bytes.iter().all(|&b| b == 0));

    adapter
        .set_source_visibility(SourceSelector::Source(0), true)
        .unwrap();
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();
    assert_eq!(frame_buffer(&adapter).write_borrows, 2);

    // Source 2 never had a mode.
    adapter.present(2, &full_present(&image, 640, &rects)).unwrap();
}

#[test]
fn present_forgets_the_zeroed_range() {
    let mut adapter = adapter_with_mode(640, 480, SourceModeRequest::new(0));
    adapter.blank(0).unwrap();
    assert!(!adapter.source(0).unwrap().zeroed_range().is_empty());

    let image = pattern_surface(640, 480);
    let rects = [Rect::new(0, 0, 1, 1)];
    adapter.present(0, &full_present(&image, 640, &rects)).unwrap();
    assert!(adapter.source(0).unwrap().zeroed_range().is_empty());

    adapter.blank(0).unwrap();
    assert_eq!(frame_buffer(&adapter).write_borrows, 3);
    assert_eq!(pixel_at(&frame_buffer(&adapter).bytes, 0), [0; 4]);
}
