use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadCategory {
    #[serde(rename = "PAYSTUB_W2")]
    PaystubW2,
    #[serde(rename = "ID")]
    Id,
    #[serde(rename = "OTHER")]
    Other,
}

impl UploadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::PaystubW2 => "PAYSTUB_W2",
            UploadCategory::Id => "ID",
            UploadCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PAYSTUB_W2" => Ok(UploadCategory::PaystubW2),
            "ID" => Ok(UploadCategory::Id),
            "OTHER" | "" => Ok(UploadCategory::Other),
            other => Err(format!("unknown upload category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: Uuid,
    pub application_id: Uuid,
    /// Name the applicant's browser sent, unsanitized.
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub category: UploadCategory,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UploadRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub category: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing_defaults_blank_to_other() {
        assert_eq!("".parse::<UploadCategory>(), Ok(UploadCategory::Other));
        assert_eq!("ID".parse::<UploadCategory>(), Ok(UploadCategory::Id));
        assert_eq!(
            "PAYSTUB_W2".parse::<UploadCategory>(),
            Ok(UploadCategory::PaystubW2)
        );
        assert!("RECEIPT".parse::<UploadCategory>().is_err());
    }
}
