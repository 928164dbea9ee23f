//! 数值格式化：字节、docker 的人类可读尺寸、时长

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Binary-scaled byte count. MB keeps one decimal, GB and above keep two,
/// smaller units none. Extra digits are truncated, not rounded.
pub fn human_bytes(v: u64) -> String {
    let mut f = v as f64;
    let mut i = 0;
    while f >= 1024.0 && i < UNITS.len() - 1 {
        f /= 1024.0;
        i += 1;
    }

    let decimals = match UNITS[i] {
        "MB" => 1,
        "GB" | "TB" | "PB" => 2,
        _ => 0,
    };
    let pow = 10f64.powi(decimals as i32);
    let f = (f * pow).trunc() / pow;

    format!("{:.*} {}", decimals, f, UNITS[i])
}

/// 解析 docker 输出的尺寸字符串 "1.5GB" / "512MiB" / "0B" → bytes
///
/// docker prints decimal units (`kB`, `MB`, `GB`) in `system df` and
/// binary ones (`KiB`, `MiB`, `GiB`) in `stats`, so both are accepted.
pub fn parse_size_to_bytes(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let split = s.find(|c: char| c.is_alphabetic()).unwrap_or(s.len());
    let (num_part, unit) = s.split_at(split);
    let num: f64 = num_part.trim().parse().ok()?;

    let multiplier: f64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1.0,
        "KB" | "K" => 1e3,
        "MB" | "M" => 1e6,
        "GB" | "G" => 1e9,
        "TB" | "T" => 1e12,
        "PB" | "P" => 1e15,
        "KIB" => 1024.0,
        "MIB" => 1024.0 * 1024.0,
        "GIB" => 1024.0 * 1024.0 * 1024.0,
        "TIB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((num * multiplier).round() as u64)
}

/// Whole-second duration in `1h2m3s` form.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else {
        format!("{}h {}m", hours, mins)
    }
}
