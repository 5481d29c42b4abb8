//! Localized content collections.
//!
//! Every logical entity (a service, an FAQ entry) is stored as one row per
//! locale. Rows of the same entity share a `group_id`. Fields split into
//! *shared* fields, which must be identical across the group and are owned
//! by the canonical row, and *text* fields, which are translated per locale.

use crate::store::{StoreError, StoredRow, Table};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Binds a collection to its storage table and field types.
pub trait ContentKind: Send + Sync + 'static {
    const TABLE: Table;

    /// Singular name used in messages (e.g., "service")
    const LABEL: &'static str;

    type Shared: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync;
    type Text: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync;

    /// Check required shared fields. Only applied to canonical rows, since
    /// translations always take their shared fields from the canonical row.
    fn validate_shared(shared: &Self::Shared) -> Result<(), String>;

    /// Check required locale-specific fields.
    fn validate_text(text: &Self::Text) -> Result<(), String>;
}

/// One locale row of a logical entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedRecord<K: ContentKind> {
    pub id: i64,
    pub group_id: i64,
    pub locale: String,
    pub shared: K::Shared,
    pub text: K::Text,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<K: ContentKind> LocalizedRecord<K> {
    /// Decode a stored row into typed fields.
    pub fn from_row(row: StoredRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            group_id: row.group_id,
            locale: row.locale,
            shared: serde_json::from_value(row.shared)?,
            text: serde_json::from_value(row.text)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

// ==================== Services ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceShared {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub show_on_home: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceText {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl ContentKind for Service {
    const TABLE: Table = Table::Services;
    const LABEL: &'static str = "service";

    type Shared = ServiceShared;
    type Text = ServiceText;

    fn validate_shared(shared: &ServiceShared) -> Result<(), String> {
        require(&shared.icon, "icon")
    }

    fn validate_text(text: &ServiceText) -> Result<(), String> {
        require(&text.title, "title")?;
        require(&text.description, "description")?;
        if text.benefits.iter().any(|b| b.trim().is_empty()) {
            return Err("benefits must not contain empty entries".to_string());
        }
        Ok(())
    }
}

// ==================== FAQs ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faq;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqShared {
    #[serde(default = "default_faq_category")]
    pub category: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for FaqShared {
    fn default() -> Self {
        Self {
            category: default_faq_category(),
            sort_order: 0,
            is_active: true,
        }
    }
}

fn default_faq_category() -> String {
    "general".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqText {
    pub question: String,
    pub answer: String,
}

impl ContentKind for Faq {
    const TABLE: Table = Table::Faqs;
    const LABEL: &'static str = "faq";

    type Shared = FaqShared;
    type Text = FaqText;

    fn validate_shared(shared: &FaqShared) -> Result<(), String> {
        require(&shared.category, "category")
    }

    fn validate_text(text: &FaqText) -> Result<(), String> {
        require(&text.question, "question")?;
        require(&text.answer, "answer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_validation() {
        let text = ServiceText {
            title: "Binary Plan".to_string(),
            description: "Two legs".to_string(),
            content: None,
            benefits: vec!["Spillover".to_string()],
        };
        assert!(Service::validate_text(&text).is_ok());

        let missing_title = ServiceText {
            title: "  ".to_string(),
            ..text.clone()
        };
        assert_eq!(
            Service::validate_text(&missing_title).unwrap_err(),
            "title is required"
        );

        let empty_benefit = ServiceText {
            benefits: vec!["".to_string()],
            ..text
        };
        assert!(Service::validate_text(&empty_benefit).is_err());
    }

    #[test]
    fn test_service_shared_requires_icon() {
        assert!(Service::validate_shared(&ServiceShared::default()).is_err());
        let shared = ServiceShared {
            icon: "layers".to_string(),
            ..Default::default()
        };
        assert!(Service::validate_shared(&shared).is_ok());
    }

    #[test]
    fn test_faq_shared_defaults_from_json() {
        let shared: FaqShared = serde_json::from_value(json!({})).unwrap();
        assert_eq!(shared, FaqShared::default());
        assert!(shared.is_active);
        assert_eq!(shared.category, "general");
    }

    #[test]
    fn test_faq_validation() {
        let text = FaqText {
            question: "Is there a demo?".to_string(),
            answer: "".to_string(),
        };
        assert_eq!(Faq::validate_text(&text).unwrap_err(), "answer is required");
    }

    #[test]
    fn test_record_from_row() {
        let now = Utc::now();
        let row = StoredRow {
            id: 7,
            group_id: 3,
            locale: "es".to_string(),
            shared: json!({ "icon": "globe", "image": null, "showOnHome": true }),
            text: json!({ "title": "Plan", "description": "Desc" }),
            created_at: now,
            updated_at: now,
        };

        let record = LocalizedRecord::<Service>::from_row(row).expect("Should decode");
        assert_eq!(record.group_id, 3);
        assert!(record.shared.show_on_home);
        assert!(record.text.benefits.is_empty());
    }

    #[test]
    fn test_record_from_row_rejects_bad_text() {
        let now = Utc::now();
        let row = StoredRow {
            id: 1,
            group_id: 1,
            locale: "en".to_string(),
            shared: json!({}),
            text: json!({ "question": 42 }),
            created_at: now,
            updated_at: now,
        };
        assert!(LocalizedRecord::<Faq>::from_row(row).is_err());
    }
}
