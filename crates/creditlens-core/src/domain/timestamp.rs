use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ValidationError;

/// Publication instant of a news article, normalized to UTC.
///
/// Feeds disagree on the format: NewsAPI sends RFC3339 with `Z`, others an
/// explicit offset, and dataframe exports a naive `YYYY-MM-DD HH:MM:SS`
/// that is taken to be UTC already.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishedAt(OffsetDateTime);

impl PublishedAt {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(stamped) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self(stamped.to_offset(UtcOffset::UTC)));
        }
        let naive = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        PrimitiveDateTime::parse(trimmed, naive)
            .map(|parsed| Self(parsed.assume_utc()))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }
}

impl Display for PublishedAt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl Serialize for PublishedAt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublishedAt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Calendar day of a daily market bar, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Parses `YYYY-MM-DD`, or any timestamp whose first ten characters are
    /// such a date (`2024-03-01T00:00:00Z`, `2024-03-01 00:00:00`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: input.to_owned(),
        };
        let trimmed = input.trim();
        let head = trimmed.get(..10).ok_or_else(invalid)?;
        if trimmed.len() > 10 && !matches!(trimmed.as_bytes()[10], b'T' | b't' | b' ') {
            return Err(invalid());
        }

        let mut parts = head.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let day: u8 = day.parse().map_err(|_| invalid())?;
        Self::from_calendar_date(year, month, day).map_err(|_| invalid())
    }

    /// Day of a Unix epoch timestamp in milliseconds (pandas' default JSON dates).
    pub fn from_unix_millis(millis: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(millis.div_euclid(1_000))
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::InvalidDate {
                value: millis.to_string(),
            })
    }

    /// Whole days from `earlier` to `self` (negative when `earlier` is later).
    pub fn days_since(self, earlier: TradingDate) -> i64 {
        (self.0 - earlier.0).whole_days()
    }

    pub fn into_inner(self) -> Date {
        self.0
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_offsets_are_normalized_to_utc() {
        let zulu = PublishedAt::parse("2024-01-01T00:00:00Z").expect("zulu");
        let offset = PublishedAt::parse("2024-01-01T01:00:00+01:00").expect("offset");
        assert_eq!(zulu, offset);
        assert_eq!(offset.to_string(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn naive_dataframe_timestamps_are_read_as_utc() {
        let naive = PublishedAt::parse("2024-01-01 09:30:00").expect("naive");
        assert_eq!(naive.to_string(), "2024-01-01T09:30:00Z");
        assert!(matches!(
            PublishedAt::parse("yesterday"),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn trading_date_accepts_plain_and_timestamped_forms() {
        let plain = TradingDate::parse("2024-03-01").expect("plain date");
        let stamped = TradingDate::parse("2024-03-01T00:00:00Z").expect("rfc3339");
        let spaced = TradingDate::parse("2024-03-01 00:00:00").expect("pandas style");
        assert_eq!(plain, stamped);
        assert_eq!(plain, spaced);
        assert_eq!(plain.to_string(), "2024-03-01");
    }

    #[test]
    fn trading_date_rejects_garbage() {
        for input in ["", "2024-3-1", "2024-02-30", "20240301", "2024-03-01X"] {
            assert!(
                TradingDate::parse(input).is_err(),
                "'{input}' should be rejected"
            );
        }
    }

    #[test]
    fn epoch_millis_map_to_calendar_day() {
        let date = TradingDate::from_unix_millis(1_709_251_200_000).expect("valid millis");
        assert_eq!(date.to_string(), "2024-03-01");
    }

    #[test]
    fn days_since_counts_calendar_days() {
        let later = TradingDate::parse("2024-03-31").expect("date");
        let earlier = TradingDate::parse("2024-01-01").expect("date");
        assert_eq!(later.days_since(earlier), 90);
        assert_eq!(earlier.days_since(later), -90);
    }
}
