#![cfg(not(target_arch = "wasm32"))]

fn stdout_of(args: &[&str]) -> String {
    let output = assert_cmd::cargo::cargo_bin_cmd!("stdvga-modes")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn modes_lists_the_standard_table() {
    let out = stdout_of(&["modes"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "video memory: 16384 KiB");
    assert!(lines[1].contains(" 640x480 "), "{out}");
    assert!(out.contains("1920x1200"));
    assert!(!out.contains("1366x768"));
    assert!(!out.contains("(boot)"));
}

#[test]
fn boot_mode_is_listed_first() {
    let out = stdout_of(&["--boot", "1280x800", "modes"]);
    let first = out.lines().nth(1).unwrap();
    assert!(first.contains("1280x800"), "{first}");
    assert!(first.ends_with("(boot)"));
    assert_eq!(out.matches("1280x800").count(), 1);
}

#[test]
fn video_memory_is_clamped_to_the_bar() {
    let out = stdout_of(&["--vram-mib", "64", "--fb-bar-mib", "8", "modes"]);
    assert!(out.starts_with("video memory: 8192 KiB"));
    assert!(!out.contains("2560x1600"));
}

#[test]
fn set_mode_prints_the_register_sequence() {
    let out = stdout_of(&["set-mode", "0"]);
    let registers: Vec<&str> = out
        .lines()
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(
        registers,
        [
            "Enable",
            "Bank",
            "XOffset",
            "YOffset",
            "Bpp",
            "Xres",
            "VirtWidth",
            "Yres",
            "VirtHeight",
            "Enable"
        ]
    );
    assert!(out.lines().last().unwrap().ends_with("0x0041"));
    assert!(out.contains("Xres             <- 0x0280"));
}

#[test]
fn out_of_range_mode_fails() {
    assert_cmd::cargo::cargo_bin_cmd!("stdvga-modes")
        .args(["set-mode", "999"])
        .assert()
        .failure();
}

#[test]
fn zero_video_memory_fails_to_start() {
    assert_cmd::cargo::cargo_bin_cmd!("stdvga-modes")
        .args(["--vram-mib", "0", "--fb-bar-mib", "16", "modes"])
        .assert()
        .failure();
}

#[test]
fn edid_dump_starts_with_the_header() {
    let out = stdout_of(&["--pci", "00:02.0", "edid", "--target", "1"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "serial 0x00100001");
    assert!(lines[1].starts_with("00: 00 ff ff ff ff ff ff 00"));
    assert_eq!(lines.len(), 1 + 8);
}
