#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn lsrsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lsrsim"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("lsrsim should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn encode_packet_outputs_wire_text() {
    let output = lsrsim(&[
        "--format",
        "raw",
        "encode",
        "--priority",
        "1",
        "--destination",
        "42",
        "--payload",
        "HELLO",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "100042HELLO");
}

#[test]
fn encode_label_frame_prefixes_two_digit_label() {
    let output = lsrsim(&[
        "--format",
        "json",
        "encode",
        "--priority",
        "1",
        "--destination",
        "42",
        "--payload",
        "HELLO",
        "--label",
        "5",
    ]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("output should be JSON");
    assert_eq!(json["wire"], "05100042HELLO");
    assert_eq!(json["size"], 13);
    assert_eq!(json["label"], 5);
}

#[test]
fn encode_with_link_tag() {
    let output = lsrsim(&[
        "--format", "raw", "encode", "-p", "0", "-D", "3", "--payload", "x", "--link",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "N000003x");
}

#[test]
fn encode_rejects_label_above_99() {
    let output = lsrsim(&["encode", "--destination", "42", "--label", "100"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid label"));
}

#[test]
fn encode_rejects_long_destination() {
    let output = lsrsim(&["encode", "--destination", "123456"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_label_frame_fields() {
    let output = lsrsim(&["--format", "json", "decode", "--label", "05100042HELLO"]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("output should be JSON");
    assert_eq!(json["label"], 5);
    assert_eq!(json["priority"], 1);
    assert_eq!(json["destination"], "42");
    assert_eq!(json["payload"], "HELLO");
}

#[test]
fn decode_link_frame_reports_kind() {
    let output = lsrsim(&["--format", "pretty", "decode", "--link", "M07200003hi"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        "kind=MPLS label=07 priority=2 destination=3 payload=hi"
    );
}

#[test]
fn decode_truncated_packet_is_data_invalid() {
    let output = lsrsim(&["decode", "100"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_unknown_tag_is_data_invalid() {
    let output = lsrsim(&["decode", "--link", "X100042HELLO"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn version_prints_package_version() {
    let output = lsrsim(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("lsrsim {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_lists_wire_widths() {
    let output = lsrsim(&["version", "--extended"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("wire: address_width=5 label_width=2 max_label=99"));
}
