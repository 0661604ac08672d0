use serde::{Deserialize, Serialize};

/// One extracted glossary entry
///
/// `url` is the unique key across the whole store; the three text fields
/// default to empty strings when the page did not provide them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub url: String,

    #[serde(default)]
    pub h1: String,

    #[serde(default)]
    pub h2: String,

    #[serde(default)]
    pub content: String,
}

impl Record {
    /// Creates a record with all text fields empty
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            h1: String::new(),
            h2: String::new(),
            content: String::new(),
        }
    }

    /// True if at least one text field is non-empty
    ///
    /// An extraction counts as successful only when this holds.
    pub fn has_content(&self) -> bool {
        !self.h1.is_empty() || !self.h2.is_empty() || !self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_no_content() {
        assert!(!Record::empty("https://example.com/glossary/a").has_content());
    }

    #[test]
    fn test_any_field_counts_as_content() {
        let mut record = Record::empty("https://example.com/glossary/a");
        record.h2 = "Term".to_string();
        assert!(record.has_content());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let record: Record =
            serde_json::from_str(r#"{"url": "https://example.com/glossary/a"}"#).unwrap();
        assert_eq!(record.url, "https://example.com/glossary/a");
        assert_eq!(record.h1, "");
        assert_eq!(record.content, "");
    }
}
