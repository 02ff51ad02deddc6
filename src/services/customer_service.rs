// src/services/customer_service.rs

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{ChangePasswordPayload, UpdateProfilePayload, User},
        order::OrderView,
    },
    services::{
        auth::{hash_password, verify_password},
        order_service::OrderService,
    },
};

// Self-service for a signed-in customer. Every call acts on the session's own
// user; there is no way to address another account.
#[derive(Clone)]
pub struct CustomerService {
    user_repo: UserRepository,
    order_service: OrderService,
}

impl CustomerService {
    pub fn new(user_repo: UserRepository, order_service: OrderService) -> Self {
        Self { user_repo, order_service }
    }

    pub async fn orders(&self, customer: &User) -> Result<Vec<OrderView>, AppError> {
        self.order_service.list_for_user(customer.id).await
    }

    /// The new email must not belong to any other account.
    pub async fn update_profile(&self, customer: &User, payload: UpdateProfilePayload) -> Result<User, AppError> {
        if let Some(owner) = self.user_repo.find_by_email(&payload.email).await? {
            if owner.id != customer.id {
                return Err(AppError::EmailAlreadyExists);
            }
        }

        let user = self
            .user_repo
            .update_profile(customer.id, &payload.name, &payload.email)
            .await?;
        tracing::info!(user_id = %user.id, "customer profile updated");
        Ok(user)
    }

    /// A wrong current password leaves the stored hash untouched.
    pub async fn change_password(&self, customer: &User, payload: ChangePasswordPayload) -> Result<(), AppError> {
        if !verify_password(&payload.current_password, &customer.password_hash).await? {
            tracing::warn!(user_id = %customer.id, "password change refused: wrong current password");
            return Err(AppError::IncorrectPassword);
        }

        let password_hash = hash_password(&payload.password).await?;
        self.user_repo.update_password(customer.id, &password_hash).await?;
        tracing::info!(user_id = %customer.id, "customer password updated");
        Ok(())
    }
}
