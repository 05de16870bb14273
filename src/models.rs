//! Records returned by the image search API.

use serde::{Deserialize, Serialize};

/// Field the backend should include for each returned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetField {
    Path,
    Datetime,
}

/// One image in a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Asset locator, either relative to the asset root or a full URL.
    pub path: String,
    /// ISO-8601 capture time, when requested via `rets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
}

impl ImageRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            datetime: None,
        }
    }

    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_datetime() {
        let record: ImageRecord = serde_json::from_str(r#"{"path": "a.jpg"}"#).unwrap();
        assert_eq!(record, ImageRecord::new("a.jpg"));
    }

    #[test]
    fn test_bare_string_is_not_a_record() {
        assert!(serde_json::from_str::<ImageRecord>(r#""a.jpg""#).is_err());
    }

    #[test]
    fn test_ret_field_names() {
        let json = serde_json::to_string(&[RetField::Path, RetField::Datetime]).unwrap();
        assert_eq!(json, r#"["path","datetime"]"#);
    }
}
