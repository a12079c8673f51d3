//! End-to-end integration tests demonstrating the test harness.
//!
//! These tests exercise the CLI through the harness API, showing how to
//! set up test environments, build pages, and make assertions.

mod common;

use common::harness::{TestEnv, TestPage};
use predicates::prelude::*;

#[test]
fn test_export_then_format_round_trip() {
    let env = TestEnv::new();
    let page = TestPage::new()
        .paragraph("Round trip")
        .styles(".a{color:red}");
    let (markup, styles) = env.add_page("index", &page);
    let out = env.path("out");

    env.cmd()
        .export(&markup, Some(&styles), &out)
        .assert()
        .success();

    // An exported stylesheet is already canonical.
    let exported = out.join("styles.css");
    let expected = format!("{}\n", env.read(&exported));
    env.cmd()
        .format(&exported)
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn test_bundle_paths_format() {
    let env = TestEnv::new();
    let page = TestPage::new()
        .embedded_image("png", 12)
        .embedded_image("jpeg", 12)
        .styles("p{}");
    let (markup, styles) = env.add_page("index", &page);
    let out = env.path("site");

    let stdout = env
        .cmd()
        .export(&markup, Some(&styles), &out)
        .mode("bundle")
        .format_paths()
        .output_success();

    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.rsplit(['/', '\\']).next())
        .collect();
    assert_eq!(names, vec!["index.html", "styles.css", "image1.png", "image2.jpg"]);
}

#[test]
fn test_placeholder_images_stay_embedded() {
    let env = TestEnv::new();
    let page = TestPage::new()
        .embedded_image("png", 4)
        .embedded_image("gif", 16);
    let (markup, styles) = env.add_page("index", &page);
    let out = env.path("site");

    let json: serde_json::Value = env
        .cmd()
        .export(&markup, Some(&styles), &out)
        .mode("bundle")
        .format_json()
        .output_json();

    assert_eq!(json["data"]["assets"], 1);
    let document = env.read(&out.join("index.html"));
    assert!(document.contains("data:image/png;base64,"));
    assert!(document.contains(r#"src="images/image1.gif""#));
}

#[test]
fn test_verbose_flag_logs_to_stderr() {
    let env = TestEnv::new();
    let markup = env.write_file("page.html", "<p>x</p>");

    env.cmd()
        .args(["-vv"])
        .format(&markup)
        .assert()
        .success()
        .stdout("<p>\n  x\n</p>\n")
        .stderr(predicate::str::contains("formatting"));
}

#[test]
fn test_json_log_format_from_config() {
    let env = TestEnv::new();
    env.write_config("[logging]\nlevel = \"debug\"\nformat = \"json\"\n");
    let markup = env.write_file("page.html", "<p>x</p>");

    let assert = env.cmd().format(&markup).assert().success();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();

    let first = stderr.lines().next().expect("should log at debug level");
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["level"], "DEBUG");
}
