use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use stations_core::{FieldError, Patch};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StationType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Number of stations of this type.
    pub stations: i64,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewStationType {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStationType {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
}

impl UpdateStationType {
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self.name.as_set() {
            Some(name) if name.trim().is_empty() => {
                vec![FieldError::new("name", "name must not be blank")]
            }
            _ => Vec::new(),
        }
    }
}
