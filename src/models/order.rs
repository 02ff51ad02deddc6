// src/models/order.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::serde_utils::empty_string_as_none;
use crate::models::catalog::ServicePackView;

// Free-assignment status: any value may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Capitalized, for mail bodies.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "Youssef Amrani")]
    pub customer_name: String,
    #[schema(example = "youssef@example.com")]
    pub email: String,
    pub phone: Option<String>,
    pub selected_pack_id: Option<Uuid>,
    pub crm_lead_id: Option<Uuid>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order with its service pack expanded. The pack is read live, so it is
/// `None` once the referenced pack has been deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub service_pack: Option<ServicePackView>,
}

/// Row handed to the repository once the submitter and lead are resolved.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub selected_pack_id: Uuid,
    pub crm_lead_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Customer name is required"))]
    pub customer_name: String,

    #[serde(default)]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(min = 1, max = 255, message = "Email address is required")
    )]
    pub email: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50, message = "Phone number is too long"))]
    pub phone: Option<String>,

    #[validate(required(message = "Please select a service pack"))]
    pub selected_pack_id: Option<Uuid>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 1000, message = "Notes may not exceed 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}
