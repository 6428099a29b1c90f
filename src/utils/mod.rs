/// Formats a byte count as a human label using base-1024 units.
///
/// Returns `None` for zero so callers report the size as unknown instead of
/// showing "0 Bytes". Values are rounded to 2 decimal places with trailing
/// zeros trimmed, so 1048576 renders as "1 MB" and 1536 as "1.5 KB".
pub fn format_size(bytes: u64) -> Option<String> {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return None;
    }

    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);

    let mut rendered = format!("{:.2}", value);
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }

    Some(format!("{} {}", rendered, UNITS[exponent]))
}

/// Formats a view count the way the result card shows it: "1.5M", "2.5K",
/// or the literal integer. Zero means the count is unknown and renders as
/// the "--" placeholder.
pub fn format_count(count: u64) -> String {
    if count == 0 {
        "--".to_string()
    } else if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Lowercases and replaces everything outside [a-z0-9] with underscores,
/// producing a name safe to use as a filename stem.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
