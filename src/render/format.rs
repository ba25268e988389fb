//! Text and color formatting for entities, values and dates.

use chrono::NaiveDateTime;

/// Deterministic color for an entity name.
///
/// 32-bit rolling hash over the UTF-16 code units (`hash * 31 + unit`,
/// wrapping); the three low bytes become red, green and blue. Distinct
/// names can collide.
pub fn entity_rgb(name: &str) -> (u8, u8, u8) {
    let hash = name.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });

    let byte = |shift: u32| ((hash >> shift) & 0xFF) as u8;
    (byte(0), byte(8), byte(16))
}

/// `#rrggbb` form of [`entity_rgb`].
pub fn entity_color(name: &str) -> String {
    let (r, g, b) = entity_rgb(name);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Round to an integer and group thousands with commas, e.g. `1,234,568`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value + 0.5).floor();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Calendar part of a frame label.
pub fn format_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_entity_color_known_values() {
        // 'a' = 97 = 0x61
        assert_eq!(entity_color("a"), "#610000");
        // 'a' * 31 + 'b' = 3105 = 0x0c21
        assert_eq!(entity_color("ab"), "#210c00");
        assert_eq!(entity_color(""), "#000000");
    }

    #[test]
    fn test_entity_color_is_stable_and_wraps() {
        let long = "United Kingdom of Great Britain and Northern Ireland";
        assert_eq!(entity_color(long), entity_color(long));
        assert_eq!(entity_color(long).len(), 7);
        assert_ne!(entity_color("Germany"), entity_color("Italy"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.4), "999");
        assert_eq!(format_number(999.5), "1,000");
        assert_eq!(format_number(1234567.89), "1,234,568");
        assert_eq!(format_number(-1500.0), "-1,500");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2022, 2, 24)
            .and_then(|d| d.and_hms_opt(13, 45, 0))
            .unwrap();
        assert_eq!(format_date(&date), "2022-02-24");
    }
}
