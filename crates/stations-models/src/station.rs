use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use stations_core::{FieldError, Patch};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Station {
    pub id: Uuid,
    pub station_type_id: Uuid,
    /// Account that created the station. Seeded stations have no owner.
    pub account_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub location_x: i32,
    pub location_y: i32,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewStation {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "location_x must not be negative"))]
    pub location_x: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "location_y must not be negative"))]
    pub location_y: i32,
}

/// Partial update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStation {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub location_x: Patch<i32>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub location_y: Patch<i32>,
}

impl UpdateStation {
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.as_set().is_some_and(|name| name.trim().is_empty()) {
            errors.push(FieldError::new("name", "name must not be blank"));
        }
        if self.location_x.as_set().is_some_and(|x| *x < 0) {
            errors.push(FieldError::new("location_x", "location_x must not be negative"));
        }
        if self.location_y.as_set().is_some_and(|y| *y < 0) {
            errors.push(FieldError::new("location_y", "location_y must not be negative"));
        }

        errors
    }

    /// Applies the set fields onto `station`.
    pub fn apply(self, station: &mut Station) {
        self.name.apply_to(&mut station.name);
        self.description.apply_to(&mut station.description);
        self.location_x.apply_to(&mut station.location_x);
        self.location_y.apply_to(&mut station.location_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station {
            id: Uuid::new_v4(),
            station_type_id: Uuid::new_v4(),
            account_id: None,
            name: "Plant Station One".to_string(),
            description: "Some description".to_string(),
            location_x: 3,
            location_y: 3,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    #[test]
    fn negative_locations_fail_validation() {
        let new_station: NewStation =
            serde_json::from_str(r#"{"name": "Pump", "location_x": -1, "location_y": 2}"#)
                .unwrap();
        let errors = new_station.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("location_x"));
        assert!(!errors.field_errors().contains_key("location_y"));
    }

    #[test]
    fn update_applies_only_sent_fields() {
        let update: UpdateStation =
            serde_json::from_str(r#"{"location_y": 9, "description": ""}"#).unwrap();
        assert!(update.field_errors().is_empty());

        let mut target = station();
        update.apply(&mut target);

        assert_eq!(target.name, "Plant Station One");
        assert_eq!(target.description, "");
        assert_eq!(target.location_x, 3);
        assert_eq!(target.location_y, 9);
    }

    #[test]
    fn update_reports_every_bad_field() {
        let update: UpdateStation =
            serde_json::from_str(r#"{"name": "", "location_x": -4, "location_y": -1}"#).unwrap();
        let fields: Vec<_> = update
            .field_errors()
            .into_iter()
            .map(|error| error.field)
            .collect();
        assert_eq!(fields, vec!["name", "location_x", "location_y"]);
    }
}
