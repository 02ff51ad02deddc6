// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::Dashboard,
    services::order_service::OrderService,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    order_service: OrderService,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, order_service: OrderService) -> Self {
        Self { repo, order_service }
    }

    // Computed fresh on every call
    pub async fn get_dashboard(&self) -> Result<Dashboard, AppError> {
        let (statistics, crm) = self.repo.statistics().await?;
        let recent_orders = self.order_service.recent().await?;
        let monthly_orders = self.repo.monthly_orders().await?;

        Ok(Dashboard { statistics, crm, recent_orders, monthly_orders })
    }
}
