// src/db/contact_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::contact::ContactMessage};

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<ContactMessage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (name, email, message)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, message, is_read, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .fetch_one(executor)
        .await?;
        Ok(contact)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ContactMessage>, AppError> {
        let contact = sqlx::query_as::<_, ContactMessage>(
            "SELECT id, name, email, message, is_read, created_at, updated_at
             FROM contact_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }
}
