//! 展示格式化模块
//!
//! 提供金额、时间、文本与徽章样式的格式化函数，视图层共用。

use chrono::{DateTime, NaiveDateTime};

const DATE_DISPLAY_FORMAT: &str = "%b %-d, %I:%M %p";

/// 后端可能返回的不带时区的时间格式
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// 将时间字符串格式化为 `Jan 5, 10:30 AM`
///
/// - 缺失或空字符串返回 `N/A`
/// - 无法解析时原样返回
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return "N/A".to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_DISPLAY_FORMAT).to_string();
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DATE_DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// 千分位分组，最多保留两位小数
pub fn group_thousands(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = if rounded.fract() == 0.0 {
        format!("{:.0}", rounded.abs())
    } else {
        let s = format!("{:.2}", rounded.abs());
        s.trim_end_matches('0').to_string()
    };

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_usd(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = group_thousands((cents / 100) as f64);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, dollars, cents % 100)
}

/// 按币种格式化金额
///
/// `currency` 取后端的币种代码：`BONUS_BALANCE`/`CASH`/`LP`/`RP`/`TICKETS`。
pub fn format_currency(value: f64, currency: &str) -> String {
    match currency {
        "BONUS_BALANCE" | "CASH" => format_usd(value),
        "LP" => format!("{} LP", group_thousands(value)),
        "RP" => format!("{} RP", group_thousands(value)),
        "TICKETS" => format!("{} 🎫", value),
        _ => group_thousands(value),
    }
}

/// `LOSING_STREAK` -> `Losing streak` 风格的展示文本
///
/// 只替换第一个下划线，随后每个单词首字母大写。
pub fn capitalize(value: &str) -> String {
    let lowered = value.replacen('_', " ", 1).to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut at_word_start = true;
    for ch in lowered.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

pub fn tier_badge_class(tier: &str) -> String {
    format!("badge badge-{}", tier.to_lowercase())
}

pub fn status_badge_class(status: &str) -> &'static str {
    match status {
        "NEW" => "badge badge-blue",
        "VIP" => "badge badge-purple",
        "LOSING" => "badge badge-red",
        "WINNING" => "badge badge-green",
        "BREAKEVEN" => "badge badge-yellow",
        _ => "badge badge-gray",
    }
}

pub fn active_badge_class(active: bool) -> &'static str {
    if active {
        "badge badge-green"
    } else {
        "badge badge-red"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(
            format_date(Some("2024-01-05T10:30:00.123456")),
            "Jan 5, 10:30 AM"
        );
        assert_eq!(format_date(Some("2024-03-15T21:05:00Z")), "Mar 15, 09:05 PM");
        assert_eq!(format_date(Some("not a date")), "not a date");
    }

    #[test]
    fn thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(-1500.5), "-1,500.5");
    }

    #[test]
    fn currencies() {
        assert_eq!(format_currency(1234.5, "CASH"), "$1,234.50");
        assert_eq!(format_currency(-12.0, "BONUS_BALANCE"), "-$12.00");
        assert_eq!(format_currency(2500.0, "LP"), "2,500 LP");
        assert_eq!(format_currency(40.0, "RP"), "40 RP");
        assert_eq!(format_currency(3.0, "TICKETS"), "3 🎫");
        assert_eq!(format_currency(10000.0, "OTHER"), "10,000");
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("HIGH_ROLLER"), "High Roller");
        assert_eq!(capitalize("add_lp_bonus"), "Add Lp_bonus");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn badges() {
        assert_eq!(tier_badge_class("GOLD"), "badge badge-gold");
        assert_eq!(status_badge_class("VIP"), "badge badge-purple");
        assert_eq!(status_badge_class("???"), "badge badge-gray");
        assert_eq!(active_badge_class(false), "badge badge-red");
    }
}
