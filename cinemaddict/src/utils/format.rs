use chrono::{DateTime, NaiveDate, Utc};

const MAX_DESCRIPTION_LENGTH: usize = 140;
const TRUNCATED_DESCRIPTION_LENGTH: usize = 138;

/// Escape text for safe interpolation into markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Runtime in minutes as "1h 55m", or "55m" under an hour
pub fn format_runtime(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours == 0 {
        format!("{}m", rest)
    } else {
        format!("{}h {}m", hours, rest)
    }
}

/// Card descriptions longer than 140 characters are cut to 138 plus an ellipsis
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        let cut: String = description
            .chars()
            .take(TRUNCATED_DESCRIPTION_LENGTH)
            .collect();
        format!("{}…", cut)
    } else {
        description.to_string()
    }
}

pub fn format_release_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

pub fn format_comment_date(date: DateTime<Utc>) -> String {
    date.format("%Y/%m/%d %H:%M").to_string()
}

/// "1 comment", "5 comments"
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Great" & 'bold'</b>"#),
            "&lt;b&gt;&quot;Great&quot; &amp; &#x27;bold&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(115), "1h 55m");
        assert_eq!(format_runtime(54), "54m");
        assert_eq!(format_runtime(120), "2h 0m");
    }

    #[test]
    fn test_truncate_description() {
        let short = "a".repeat(140);
        assert_eq!(truncate_description(&short), short);

        let long = "b".repeat(141);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 139);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(1929, 3, 30).unwrap();
        assert_eq!(format_release_date(date), "30 March 1929");

        let date = Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(format_comment_date(date), "2019/12/31 23:59");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "comment", "comments"), "1 comment");
        assert_eq!(pluralize(0, "comment", "comments"), "0 comments");
    }
}
