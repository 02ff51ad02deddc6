// src/services/order_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, OrderRepository, ServicePackRepository},
    models::{
        auth::User,
        catalog::ServicePackView,
        crm::{LeadSource, LeadStatus, NewLead},
        order::{NewOrder, Order, OrderStatus, OrderView, PlaceOrderPayload},
    },
    services::{email_domain::EmailDomainCheck, notification_service::Notifier},
};

const RECENT_ORDERS: i64 = 10;

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    pack_repo: ServicePackRepository,
    lead_repo: LeadRepository,
    notifier: Notifier,
    email_domains: EmailDomainCheck,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        pack_repo: ServicePackRepository,
        lead_repo: LeadRepository,
        notifier: Notifier,
        email_domains: EmailDomainCheck,
        pool: PgPool,
    ) -> Self {
        Self { order_repo, pack_repo, lead_repo, notifier, email_domains, pool }
    }

    /// Public order submission.
    ///
    /// A signed-in customer owns the order and their account name and email
    /// replace the submitted ones. The submitter's email is resolved to a lead
    /// (oldest match reused untouched, otherwise a new `manual` lead) and the
    /// lead and order are written in one transaction. The confirmation mail is
    /// sent in the background after commit.
    ///
    /// The submitted email's domain must accept mail, even when the account
    /// email ends up on the order.
    pub async fn place_order(
        &self,
        payload: PlaceOrderPayload,
        customer: Option<&User>,
    ) -> Result<(OrderView, tokio::task::JoinHandle<()>), AppError> {
        let selected_pack_id = payload.selected_pack_id.ok_or_else(|| {
            AppError::field("selected_pack_id", "required", "Please select a service pack")
        })?;
        self.email_domains.verify("email", &payload.email).await?;

        let (user_id, customer_name, email) = match customer {
            Some(user) => (Some(user.id), user.name.clone(), user.email.clone()),
            None => (None, payload.customer_name, payload.email),
        };

        let mut tx = self.pool.begin().await?;

        let pack = self
            .pack_repo
            .find_for_share(&mut *tx, selected_pack_id)
            .await?
            .ok_or_else(|| {
                AppError::field("selected_pack_id", "exists", "Selected service pack does not exist")
            })?;

        let fallback = NewLead {
            name: customer_name.clone(),
            email: Some(email.clone()),
            phone: payload.phone.clone(),
            company: None,
            status: LeadStatus::New,
            source: LeadSource::Manual,
            contact_message_id: None,
            service_interest: None,
            estimated_value: None,
            message: None,
        };
        let lead = self.lead_repo.find_or_create_by_email(&mut *tx, &email, &fallback).await?;

        let order = self
            .order_repo
            .create(
                &mut *tx,
                &NewOrder {
                    user_id,
                    customer_name,
                    email,
                    phone: payload.phone,
                    selected_pack_id,
                    crm_lead_id: Some(lead.id),
                    notes: payload.notes,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, lead_id = %lead.id, email = %order.email, "new order created");

        // The pack row was locked until commit, so it is what the order references
        let view = OrderView { order, service_pack: Some(ServicePackView::from(&pack)) };
        let mail = self.notifier.order_placed(&view);
        Ok((view, mail))
    }

    pub async fn list(&self) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.list().await?;
        self.expand(orders).await
    }

    pub async fn recent(&self) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.recent(RECENT_ORDERS).await?;
        self.expand(orders).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.list_by_user(user_id).await?;
        self.expand(orders).await
    }

    pub async fn list_for_email(&self, email: &str) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.list_by_email(email).await?;
        self.expand(orders).await
    }

    pub async fn get(&self, id: Uuid) -> Result<OrderView, AppError> {
        let order = self.order_repo.find(id).await?.ok_or(AppError::NotFound("Order"))?;
        self.expand_one(order).await
    }

    /// Any status may follow any other. The customer is mailed the old and new
    /// status in the background; the caller sees success once the row is
    /// written, whatever happens to the mail.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(OrderView, tokio::task::JoinHandle<()>), AppError> {
        let current = self.order_repo.find(id).await?.ok_or(AppError::NotFound("Order"))?;
        let old_status = current.status;

        let order = self
            .order_repo
            .update_status(id, status)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        tracing::info!(order_id = %id, from = %old_status, to = %status, "order status updated");

        let view = self.expand_one(order).await?;
        let mail = self.notifier.order_status_changed(&view, old_status);
        Ok((view, mail))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.order_repo.delete(id).await? {
            return Err(AppError::NotFound("Order"));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    async fn expand_one(&self, order: Order) -> Result<OrderView, AppError> {
        let service_pack = match order.selected_pack_id {
            Some(pack_id) => self.pack_repo.find(pack_id).await?.as_ref().map(ServicePackView::from),
            None => None,
        };
        Ok(OrderView { order, service_pack })
    }

    // One query for all the packs referenced by the batch
    async fn expand(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, AppError> {
        let mut pack_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.selected_pack_id).collect();
        pack_ids.sort_unstable();
        pack_ids.dedup();

        let packs: HashMap<Uuid, ServicePackView> = self
            .pack_repo
            .find_many(&pack_ids)
            .await?
            .iter()
            .map(|p| (p.id, ServicePackView::from(p)))
            .collect();

        Ok(attach_packs(orders, &packs))
    }
}

fn attach_packs(orders: Vec<Order>, packs: &HashMap<Uuid, ServicePackView>) -> Vec<OrderView> {
    orders
        .into_iter()
        .map(|order| {
            let service_pack = order.selected_pack_id.and_then(|id| packs.get(&id).cloned());
            OrderView { order, service_pack }
        })
        .collect()
}
