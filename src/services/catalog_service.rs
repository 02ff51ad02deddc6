// src/services/catalog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ServicePackRepository,
    models::catalog::{CreateServicePackPayload, ServicePack, UpdateServicePackPayload},
};

#[derive(Clone)]
pub struct CatalogService {
    pack_repo: ServicePackRepository,
}

impl CatalogService {
    pub fn new(pack_repo: ServicePackRepository) -> Self {
        Self { pack_repo }
    }

    /// Storefront listing. Inactive packs are never returned.
    pub async fn list_active(&self) -> Result<Vec<ServicePack>, AppError> {
        self.pack_repo.list_active().await
    }

    pub async fn list_all(&self) -> Result<Vec<ServicePack>, AppError> {
        self.pack_repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<ServicePack, AppError> {
        self.pack_repo
            .find(id)
            .await?
            .ok_or(AppError::NotFound("Service pack"))
    }

    pub async fn create(&self, payload: CreateServicePackPayload) -> Result<ServicePack, AppError> {
        let pack = self
            .pack_repo
            .create(
                &payload.name,
                payload.description.as_deref(),
                payload.price,
                &payload.features,
                payload.is_active.unwrap_or(true),
            )
            .await?;

        tracing::info!(pack_id = %pack.id, name = %pack.name, "service pack created");
        Ok(pack)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateServicePackPayload) -> Result<ServicePack, AppError> {
        let mut pack = self.get(id).await?;
        payload.apply(&mut pack);
        let pack = self.pack_repo.update(&pack).await?;

        tracing::info!(pack_id = %pack.id, "service pack updated");
        Ok(pack)
    }

    // Orders pointing at the pack keep their row; the reference is nulled
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.pack_repo.delete(id).await? {
            return Err(AppError::NotFound("Service pack"));
        }
        tracing::info!(pack_id = %id, "service pack deleted");
        Ok(())
    }
}
