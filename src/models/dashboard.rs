// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::order::OrderView;

// Cards at the top of the admin landing page
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStatistics {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub total_service_packs: i64,
    pub unread_messages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CrmSummary {
    pub total_leads: i64,
    pub new_leads_this_week: i64,
    pub won_leads: i64,
    #[schema(value_type = f64)]
    pub won_value: Decimal,
}

// Orders per calendar month of the current year (months without orders are absent)
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MonthlyOrders {
    pub month: i32,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub statistics: DashboardStatistics,
    pub crm: CrmSummary,
    pub recent_orders: Vec<OrderView>,
    pub monthly_orders: Vec<MonthlyOrders>,
}
