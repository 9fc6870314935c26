use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A persisted key to URL mapping
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// The short code; unique across all links
    pub key: String,

    /// The destination URL, stored exactly as submitted (after trimming)
    pub url: String,

    /// When this mapping was first stored
    pub created_at: DateTime<Utc>,

    /// Number of redirects served for this key
    pub clicks: i64,
}

/// `GET /api/links` payload: the mapping plus a scannable code for it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetails {
    #[serde(flatten)]
    pub link: Link,

    /// `data:` URI of an SVG QR code; absent when the URL is too long to encode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// A mapping about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub key: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl NewLink {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            created_at: Utc::now(),
        }
    }
}

/// Request body for a single allocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLinkDto {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub key: Option<String>,
}

/// `POST /api/links` accepts either one item or a `batch` of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateLinkRequest {
    Batch { batch: Vec<CreateLinkDto> },
    Single(CreateLinkDto),
}

/// Outcome of a successful allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub key: String,
    pub url: String,
    pub existing: bool,
}

/// Per-item outcome of a batch allocation, in input order
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchItemResult {
    Success(Allocation),
    Error {
        error: &'static str,
        message: String,
        input: CreateLinkDto,
    },
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkKeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Key must not be empty"))]
    pub key: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "New URL must not be empty"))]
    pub new_url: String,
}

impl UpdateLinkDto {
    pub fn trimmed(self) -> Self {
        Self {
            key: self.key.trim().to_string(),
            new_url: self.new_url.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub key: String,
    pub url: String,
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// 1-based page number
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Serialize)]
pub struct LinkPage {
    pub shortlinks: Vec<Link>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminPasswordDto {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminDeleteDto {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_distinguishes_batch_from_single() {
        let single: CreateLinkRequest =
            serde_json::from_value(json!({"url": "https://a.com", "key": "abc"})).unwrap();
        assert!(matches!(single, CreateLinkRequest::Single(ref dto) if dto.key.as_deref() == Some("abc")));

        let batch: CreateLinkRequest = serde_json::from_value(json!({
            "batch": [{"url": "https://a.com"}, {"url": "https://b.com", "key": ""}]
        }))
        .unwrap();
        match batch {
            CreateLinkRequest::Batch { batch } => assert_eq!(batch.len(), 2),
            other => panic!("expected batch, got {:?}", other),
        }
    }

    #[test]
    fn missing_url_deserializes_as_empty() {
        let single: CreateLinkRequest = serde_json::from_value(json!({})).unwrap();
        match single {
            CreateLinkRequest::Single(dto) => assert!(dto.url.is_empty()),
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn batch_results_are_tagged_by_status() {
        let ok = BatchItemResult::Success(Allocation {
            key: "abc123".into(),
            url: "https://a.com".into(),
            existing: false,
        });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "success", "key": "abc123", "url": "https://a.com", "existing": false})
        );

        let failed = BatchItemResult::Error {
            error: "INVALID_URL",
            message: "Invalid URL: not-a-url".into(),
            input: CreateLinkDto {
                url: "not-a-url".into(),
                key: None,
            },
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "INVALID_URL");
        assert_eq!(value["input"]["url"], "not-a-url");
    }

    #[test]
    fn link_serializes_created_at_in_camel_case() {
        let link = Link {
            key: "abc123".into(),
            url: "https://a.com".into(),
            created_at: Utc::now(),
            clicks: 3,
        };
        let value = serde_json::to_value(&link).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["clicks"], 3);
    }

    #[test]
    fn pagination_is_clamped() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(1_000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), PaginationParams::MAX_LIMIT);
        assert_eq!(params.offset(), 0);

        let third = PaginationParams {
            page: Some(3),
            limit: None,
        };
        assert_eq!(third.offset(), 40);
    }
}
