//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Periodic work
//! (the capture timer, the TUI frame tick, session expiry checks) uses
//! `tokio::time::interval`, and everything else waits on I/O or channels.
//! **Exceptions**: test code

use architectural_enforcement::{production_lines, rust_files, PRODUCTION_DIRS};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for file in rust_files(dir) {
            for (line_number, code) in production_lines(&file) {
                if code.contains("::sleep(") || code.contains(".sleep(") {
                    violations.push(format!(
                        "{}:{} - {}",
                        file.display(),
                        line_number,
                        code.trim()
                    ));
                }
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::time::interval() for periodic work");
        eprintln!("✅ Wait on channels or I/O for everything else");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The capture loop ticks on an interval that skips missed ticks
#[test]
fn test_capture_loop_uses_interval() {
    let runner = rust_files("roadscan/core/src")
        .into_iter()
        .find(|p| p.ends_with("capture/runner.rs"))
        .expect("capture runner not found");

    let code: String = production_lines(&runner)
        .into_iter()
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n");

    assert!(code.contains("interval_at("), "capture timer must use interval_at");
    assert!(
        code.contains("MissedTickBehavior::Skip"),
        "capture timer must skip missed ticks"
    );
}
