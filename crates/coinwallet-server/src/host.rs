//! Instance hostname reported in the `hostname` response header.

use std::time::{SystemTime, UNIX_EPOCH};

/// OS host name, or `generated-NNN` when none is available, with
/// `_<suffix>` appended when `suffix` is non-empty.
pub fn instance_hostname(suffix: &str) -> String {
    let base = os_hostname().unwrap_or_else(generated_hostname);
    with_suffix(base, suffix)
}

fn os_hostname() -> Option<String> {
    let from_env = std::env::var("HOSTNAME").ok();
    let from_file = || std::fs::read_to_string("/etc/hostname").ok();
    from_env
        .or_else(from_file)
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

fn generated_hostname() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!("generated-{:03}", nanos % 1000)
}

fn with_suffix(base: String, suffix: &str) -> String {
    if suffix.is_empty() {
        base
    } else {
        format!("{base}_{suffix}")
    }
}
