//! Sample feedback records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::Record;

/// A user feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Feedback category (feature, bug, improvement).
    pub category: String,
    /// Free-text feedback.
    pub feedback: String,
    /// Submitter email.
    pub email: String,
    /// Sentiment label.
    pub sentiment: String,
    /// Submission time, serialized as RFC 3339.
    #[serde(with = "rfc3339_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl FeedbackEntry {
    /// Converts the entry into a generic record.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("category", self.category.as_str());
        record.insert("feedback", self.feedback.as_str());
        record.insert("email", self.email.as_str());
        record.insert("sentiment", self.sentiment.as_str());
        record.insert("timestamp", rfc3339_seconds::format(&self.timestamp));
        record
    }
}

/// The fixed sample set seeded on every run.
pub fn sample_feedback() -> Vec<FeedbackEntry> {
    let entry = |category: &str, feedback: &str, email: &str, sentiment: &str, ts: DateTime<Utc>| {
        FeedbackEntry {
            category: category.to_string(),
            feedback: feedback.to_string(),
            email: email.to_string(),
            sentiment: sentiment.to_string(),
            timestamp: ts,
        }
    };

    vec![
        entry(
            "feature",
            "Love the new prediction dashboard! Very intuitive.",
            "user1@example.com",
            "positive",
            utc(2024, 1, 15, 10, 30),
        ),
        entry(
            "bug",
            "The profit prediction seems to be off by a significant margin.",
            "user2@example.com",
            "critical",
            utc(2024, 1, 16, 14, 45),
        ),
        entry(
            "improvement",
            "Would be great to have more detailed analytics charts.",
            "user3@example.com",
            "neutral",
            utc(2024, 1, 17, 9, 15),
        ),
    ]
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// `YYYY-MM-DDTHH:MM:SSZ` timestamps.
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_set_has_three_entries() {
        let samples = sample_feedback();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].sentiment, "critical");
    }

    #[test]
    fn test_record_uses_iso_timestamp() {
        let record = sample_feedback()[0].to_record();
        assert_eq!(record.get("timestamp"), Some(&json!("2024-01-15T10:30:00Z")));
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["category", "feedback", "email", "sentiment", "timestamp"]);
    }

    #[test]
    fn test_serde_matches_record_shape() {
        let entry = &sample_feedback()[2];
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value, serde_json::to_value(entry.to_record()).unwrap());
        let back: FeedbackEntry = serde_json::from_value(value).unwrap();
        assert_eq!(&back, entry);
    }
}
