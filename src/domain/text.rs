use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const ELLIPSIS: &str = "...";
pub const UNKNOWN_DATE: &str = "unknown";

/// Limits `text` to `max_bytes` of UTF-8. Longer text keeps whole characters up to
/// `max_bytes - ELLIPSIS.len()` bytes and gets the ellipsis appended.
pub fn truncate_utf8_bytes(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let keep = max_bytes.saturating_sub(ELLIPSIS.len());
    let mut end = 0usize;
    for (offset, ch) in text.char_indices() {
        let next = offset + ch.len_utf8();
        if next > keep {
            break;
        }
        end = next;
    }

    let mut out = String::with_capacity(end + ELLIPSIS.len());
    out.push_str(&text[..end]);
    out.push_str(ELLIPSIS);
    out
}

pub fn format_order_date(created_at: Option<i64>, offset: UtcOffset) -> String {
    let Some(timestamp) = created_at.filter(|ts| *ts != 0) else {
        return UNKNOWN_DATE.to_string();
    };
    let Ok(moment) = OffsetDateTime::from_unix_timestamp(timestamp) else {
        return UNKNOWN_DATE.to_string();
    };
    moment
        .to_offset(offset)
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| UNKNOWN_DATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_within_budget_is_unchanged() {
        assert_eq!(truncate_utf8_bytes("short", 10), "short");
        assert_eq!(truncate_utf8_bytes("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn ascii_is_cut_to_budget_with_ellipsis() {
        assert_eq!(truncate_utf8_bytes("abcdefghijkl", 10), "abcdefg...");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundary() {
        // Each CJK character is three bytes: 7 bytes of room fits two of them.
        let truncated = truncate_utf8_bytes("已完成订单", 10);
        assert_eq!(truncated, "已完...");
        assert!(truncated.len() <= 10);

        let mixed = truncate_utf8_bytes("ab演唱会门票", 10);
        assert_eq!(mixed, "ab演...");
    }

    #[test]
    fn tiny_budget_still_yields_ellipsis() {
        assert_eq!(truncate_utf8_bytes("演唱会", 2), "...");
    }

    #[test]
    fn formats_dates_in_given_offset() {
        assert_eq!(
            format_order_date(Some(1_700_000_000), UtcOffset::UTC),
            "2023-11-14"
        );
        let east8 = UtcOffset::from_hms(8, 0, 0).expect("offset");
        assert_eq!(format_order_date(Some(1_700_000_000), east8), "2023-11-15");
    }

    #[test]
    fn missing_date_uses_placeholder() {
        assert_eq!(format_order_date(None, UtcOffset::UTC), UNKNOWN_DATE);
        assert_eq!(format_order_date(Some(0), UtcOffset::UTC), UNKNOWN_DATE);
    }
}
