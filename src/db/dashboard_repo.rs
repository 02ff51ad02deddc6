// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::{
    common::error::AppError,
    models::dashboard::{CrmSummary, DashboardStatistics, MonthlyOrders},
};

#[derive(FromRow)]
struct OrderCounts {
    total: i64,
    pending: i64,
    completed: i64,
    cancelled: i64,
}

#[derive(FromRow)]
struct LeadCounts {
    total: i64,
    new_this_week: i64,
    won: i64,
    won_value: Decimal,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // All counters are read inside one transaction so the cards agree with
    // each other.
    pub async fn statistics(&self) -> Result<(DashboardStatistics, CrmSummary), AppError> {
        let mut tx = self.pool.begin().await?;

        // A. Orders by status
        let orders = sqlx::query_as::<_, OrderCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                    COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
             FROM orders",
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Catalog and inbox
        let total_service_packs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_packs")
            .fetch_one(&mut *tx)
            .await?;

        let unread_messages: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE is_read = FALSE")
                .fetch_one(&mut *tx)
                .await?;

        // C. CRM
        let leads = sqlx::query_as::<_, LeadCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS new_this_week,
                    COUNT(*) FILTER (WHERE status = 'won') AS won,
                    COALESCE(SUM(estimated_value) FILTER (WHERE status = 'won'), 0) AS won_value
             FROM crm_leads",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((
            DashboardStatistics {
                total_orders: orders.total,
                pending_orders: orders.pending,
                completed_orders: orders.completed,
                cancelled_orders: orders.cancelled,
                total_service_packs,
                unread_messages,
            },
            CrmSummary {
                total_leads: leads.total,
                new_leads_this_week: leads.new_this_week,
                won_leads: leads.won,
                won_value: leads.won_value,
            },
        ))
    }

    /// Orders per month of the current calendar year, months without orders
    /// omitted.
    pub async fn monthly_orders(&self) -> Result<Vec<MonthlyOrders>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyOrders>(
            "SELECT EXTRACT(MONTH FROM created_at)::INT AS month, COUNT(*) AS count
             FROM orders
             WHERE EXTRACT(YEAR FROM created_at) = EXTRACT(YEAR FROM NOW())
             GROUP BY month
             ORDER BY month",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
