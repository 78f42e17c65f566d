//! Short human-readable strings for HUD overlays.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Binary-unit byte count: `"512 B"`, `"384.0 MiB"`, `"1.2 GiB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// `"45.2%"`, or `"--%"` before the first sample.
pub fn format_percent(value: f32) -> String {
    if value.is_nan() {
        "--%".into()
    } else {
        format!("{value:.1}%")
    }
}

/// Elapsed time in the largest two or three units: `"2h 15m 30s"`, `"45s"`.
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let s = secs % 60;

    if hours > 0 {
        format!("{hours}h {mins}m {s}s")
    } else if mins > 0 {
        format!("{mins}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_the_largest_unit() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(384 * MIB), "384.0 MiB");
        assert_eq!(format_bytes(GIB + GIB / 5), "1.2 GiB");
    }

    #[test]
    fn percent_handles_missing_samples() {
        assert_eq!(format_percent(45.2), "45.2%");
        assert_eq!(format_percent(f32::NAN), "--%");
    }

    #[test]
    fn elapsed_drops_empty_leading_units() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(125), "2m 5s");
        assert_eq!(format_elapsed(2 * 3600 + 15 * 60 + 30), "2h 15m 30s");
        assert_eq!(format_elapsed(50 * 3600), "50h 0m 0s");
    }
}
