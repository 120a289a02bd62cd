use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(AnnouncementId);

pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the `announcement` table. `date` is `None` for rows written
/// without a timestamp by other clients of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub author: String,
    pub date: Option<NaiveDateTime>,
    pub msg: String,
}

impl Announcement {
    /// Empty when the row carries no date.
    pub fn display_date(&self) -> String {
        self.date
            .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Main,
}

/// Parses the id typed into the update form. Surrounding whitespace is
/// tolerated; signs, fractions and negatives are not.
pub fn parse_announcement_id(raw: &str) -> Option<AnnouncementId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok().map(AnnouncementId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_padded_ids() {
        assert_eq!(parse_announcement_id("7"), Some(AnnouncementId(7)));
        assert_eq!(parse_announcement_id("  42 "), Some(AnnouncementId(42)));
        assert_eq!(parse_announcement_id("0"), Some(AnnouncementId(0)));
    }

    #[test]
    fn rejects_negative_signed_and_non_numeric_ids() {
        assert_eq!(parse_announcement_id(""), None);
        assert_eq!(parse_announcement_id("-1"), None);
        assert_eq!(parse_announcement_id("+3"), None);
        assert_eq!(parse_announcement_id("1.5"), None);
        assert_eq!(parse_announcement_id("abc"), None);
        assert_eq!(parse_announcement_id("99999999999999999999"), None);
    }

    #[test]
    fn formats_date_without_fraction() {
        let announcement = Announcement {
            id: AnnouncementId(1),
            author: "user_1".to_string(),
            date: Some(
                NaiveDateTime::parse_from_str("2024-03-05 07:08:09", DISPLAY_DATE_FORMAT)
                    .expect("date"),
            ),
            msg: "hello".to_string(),
        };
        assert_eq!(announcement.display_date(), "2024-03-05 07:08:09");
        assert_eq!(announcement.id.to_string(), "1");
    }

    #[test]
    fn missing_date_displays_as_empty() {
        let announcement = Announcement {
            id: AnnouncementId(2),
            author: String::new(),
            date: None,
            msg: "undated".to_string(),
        };
        assert_eq!(announcement.display_date(), "");
    }
}
