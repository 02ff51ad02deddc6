// src/services/notification_service.rs

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    mail::{templates, Mailer, OutgoingMail},
    models::{
        auth::User,
        order::{OrderStatus, OrderView},
    },
};

/// Best-effort customer mail. Every send runs on its own task; a failure is
/// logged and never reaches the request that triggered it. There is no retry.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn order_placed(&self, order: &OrderView) -> JoinHandle<()> {
        self.dispatch("order_confirmation", order.order.id, templates::order_confirmation(order))
    }

    pub fn order_status_changed(&self, order: &OrderView, old_status: OrderStatus) -> JoinHandle<()> {
        self.dispatch(
            "order_status_updated",
            order.order.id,
            templates::order_status_updated(order, old_status),
        )
    }

    pub fn password_reset(&self, user: &User, url: &str) -> JoinHandle<()> {
        self.dispatch("password_reset", user.id, templates::password_reset(&user.email, &user.name, url))
    }

    // The handle is only awaited by tests
    fn dispatch(&self, kind: &'static str, subject_id: uuid::Uuid, mail: OutgoingMail) -> JoinHandle<()> {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            let to = mail.to.clone();
            match mailer.send(mail).await {
                Ok(()) => tracing::info!(%subject_id, kind, %to, "notification sent"),
                Err(e) => tracing::warn!(%subject_id, kind, %to, error = %e, "failed to send notification"),
            }
        })
    }
}
