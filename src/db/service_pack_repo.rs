// src/db/service_pack_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::catalog::ServicePack};

const PACK_COLUMNS: &str = "id, name, description, price, features, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ServicePackRepository {
    pool: PgPool,
}

impl ServicePackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<ServicePack>, AppError> {
        let packs = sqlx::query_as::<_, ServicePack>(&format!(
            "SELECT {PACK_COLUMNS} FROM service_packs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(packs)
    }

    // Storefront listing, cheapest first
    pub async fn list_active(&self) -> Result<Vec<ServicePack>, AppError> {
        let packs = sqlx::query_as::<_, ServicePack>(&format!(
            "SELECT {PACK_COLUMNS} FROM service_packs
             WHERE is_active = TRUE
             ORDER BY price ASC, created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(packs)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ServicePack>, AppError> {
        let pack = sqlx::query_as::<_, ServicePack>(&format!(
            "SELECT {PACK_COLUMNS} FROM service_packs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pack)
    }

    // Takes a row lock so the pack can't be deleted before the caller's
    // transaction commits.
    pub async fn find_for_share<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ServicePack>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pack = sqlx::query_as::<_, ServicePack>(&format!(
            "SELECT {PACK_COLUMNS} FROM service_packs WHERE id = $1 FOR SHARE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(pack)
    }

    /// Batch lookup used to expand the pack of several orders at once.
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ServicePack>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let packs = sqlx::query_as::<_, ServicePack>(&format!(
            "SELECT {PACK_COLUMNS} FROM service_packs WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(packs)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        features: &[String],
        is_active: bool,
    ) -> Result<ServicePack, AppError> {
        let pack = sqlx::query_as::<_, ServicePack>(&format!(
            "INSERT INTO service_packs (name, description, price, features, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PACK_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(features)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(pack)
    }

    // Writes back every editable column of an already-patched pack
    pub async fn update(&self, pack: &ServicePack) -> Result<ServicePack, AppError> {
        sqlx::query_as::<_, ServicePack>(&format!(
            "UPDATE service_packs
             SET name = $2, description = $3, price = $4, features = $5, is_active = $6,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {PACK_COLUMNS}"
        ))
        .bind(pack.id)
        .bind(&pack.name)
        .bind(&pack.description)
        .bind(pack.price)
        .bind(&pack.features)
        .bind(pack.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Service pack"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM service_packs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Seeding helper: updates the pack with this name, or inserts it.
    /// Returns `true` when a new row was inserted.
    pub async fn upsert_by_name(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
        features: &[String],
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE service_packs
             SET description = $2, price = $3, features = $4, is_active = TRUE, updated_at = NOW()
             WHERE name = $1",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(features)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            sqlx::query(
                "INSERT INTO service_packs (name, description, price, features, is_active)
                 VALUES ($1, $2, $3, $4, TRUE)",
            )
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(features)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated == 0)
    }
}
