// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::{decimal, empty_string_as_none, patch_string};

#[derive(Debug, Clone, FromRow)]
pub struct ServicePack {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public shape of a pack. `price` is always rendered with two decimals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServicePackView {
    pub id: Uuid,
    #[schema(example = "Basic Pack")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "499.00")]
    pub price: String,
    #[schema(example = json!(["5-page responsive website", "Contact form integration"]))]
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ServicePack> for ServicePackView {
    fn from(pack: &ServicePack) -> Self {
        Self {
            id: pack.id,
            name: pack.name.clone(),
            description: pack.description.clone(),
            price: format_price(pack.price),
            features: pack.features.clone(),
            is_active: pack.is_active,
            created_at: pack.created_at,
        }
    }
}

pub fn format_price(price: Decimal) -> String {
    let mut rounded = price.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServicePackPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Service pack name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,

    #[serde(deserialize_with = "decimal")]
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = f64, example = 499.00)]
    pub price: Decimal,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one feature is required"),
        custom(function = "validate_features")
    )]
    pub features: Vec<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateServicePackPayload {
    #[validate(length(min = 1, max = 255, message = "Service pack name is required"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "patch_string")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some_decimal")]
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    #[validate(custom(function = "validate_features"))]
    pub features: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

fn deserialize_some_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    decimal(deserializer).map(Some)
}

impl UpdateServicePackPayload {
    /// Applies only the fields present in the request.
    pub fn apply(self, pack: &mut ServicePack) {
        if let Some(name) = self.name {
            pack.name = name;
        }
        if let Some(description) = self.description {
            pack.description = description;
        }
        if let Some(price) = self.price {
            pack.price = price;
        }
        if let Some(features) = self.features {
            pack.features = features;
        }
        if let Some(is_active) = self.is_active {
            pack.is_active = is_active;
        }
    }
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("min");
        error.message = Some("The value must be at least 0.".into());
        return Err(error);
    }
    Ok(())
}

fn validate_features(features: &[String]) -> Result<(), ValidationError> {
    if features.iter().any(|f| f.trim().is_empty() || f.chars().count() > 255) {
        let mut error = ValidationError::new("features");
        error.message = Some("Each feature must be a non-empty string of at most 255 characters.".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_pack() -> ServicePack {
        ServicePack {
            id: Uuid::new_v4(),
            name: "Basic".into(),
            description: Some("Starter".into()),
            price: Decimal::from(499),
            features: vec!["A".into()],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn price_is_rendered_with_two_decimals() {
        assert_eq!(format_price(Decimal::from(499)), "499.00");
        assert_eq!(format_price(Decimal::new(24995, 1)), "2499.50");
        assert_eq!(format_price(Decimal::new(1234567, 4)), "123.46");
    }

    #[test]
    fn partial_update_touches_only_sent_fields() {
        let mut pack = basic_pack();
        let patch: UpdateServicePackPayload =
            serde_json::from_str(r#"{"is_active":false,"description":null}"#).unwrap();
        patch.apply(&mut pack);

        assert!(!pack.is_active);
        assert_eq!(pack.description, None);
        assert_eq!(pack.name, "Basic");
        assert_eq!(pack.price, Decimal::from(499));
    }

    #[test]
    fn create_requires_a_feature_and_non_negative_price() {
        let payload: CreateServicePackPayload =
            serde_json::from_str(r#"{"name":"Basic","price":-1,"features":[]}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("features"));
    }
}
