/// Pure date/time utility functions (Discord-agnostic)
use chrono::{DateTime, Datelike, Utc};

/// ISO week number of a timestamp
pub fn iso_week_number(at: DateTime<Utc>) -> u32 {
    at.iso_week().week()
}

/// ISO week number of the current UTC time
pub fn current_week_number() -> u32 {
    iso_week_number(Utc::now())
}

/// Prize draws run on even weeks only
pub fn is_prize_draw_week(week: u32) -> bool {
    week % 2 == 0
}

/// Format a timestamp as a Discord relative timestamp tag
pub fn discord_relative(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

/// Format a timestamp as a Discord full date tag
pub fn discord_full(at: DateTime<Utc>) -> String {
    format!("<t:{}:F>", at.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_week_number() {
        // 2024-01-01 is a Monday in ISO week 1
        let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(iso_week_number(monday), 1);

        let tuesday = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();
        assert_eq!(iso_week_number(tuesday), 2);
    }

    #[test]
    fn test_is_prize_draw_week() {
        assert!(is_prize_draw_week(2));
        assert!(is_prize_draw_week(52));
        assert!(!is_prize_draw_week(1));
        assert!(!is_prize_draw_week(53));
    }

    #[test]
    fn test_discord_tags() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(discord_relative(at), "<t:1700000000:R>");
        assert_eq!(discord_full(at), "<t:1700000000:F>");
    }
}
