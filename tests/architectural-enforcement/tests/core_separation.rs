//! Integration Test: Headless Core
//!
//! **Policy**: `roadscan-core` holds identity, navigation and capture state
//! with no terminal dependencies, so the daemon and the TUI share one
//! implementation.

use std::fs;

use architectural_enforcement::{production_lines, rust_files, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("roadscan/core/Cargo.toml"))
        .expect("core manifest");

    for line in manifest.lines() {
        let name = line.split('=').next().unwrap_or("").trim();
        assert!(
            !UI_CRATES.contains(&name),
            "roadscan-core must not depend on {name}"
        );
    }
}

#[test]
fn test_core_sources_do_not_import_ui_crates() {
    let mut violations = Vec::new();
    for file in rust_files("roadscan/core/src") {
        for (line_number, code) in production_lines(&file) {
            if UI_CRATES
                .iter()
                .any(|krate| code.contains(&format!("{krate}::")))
            {
                violations.push(format!("{}:{line_number}", file.display()));
            }
        }
    }
    assert!(violations.is_empty(), "UI imports in core: {violations:?}");
}
