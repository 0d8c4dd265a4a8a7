//! Equipment catalog service

use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEquipment, created_by: i32) -> AppResult<Equipment> {
        if data.total_quantity < 0 {
            return Err(AppError::Validation(
                "Total quantity cannot be negative".to_string(),
            ));
        }
        self.repository.users.get_by_id(created_by).await?;
        let equipment = self.repository.equipment.create(data, created_by).await?;
        tracing::info!(equipment_id = equipment.id, name = %equipment.name, "equipment created");
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        if matches!(data.total_quantity, Some(q) if q < 0) {
            return Err(AppError::Validation(
                "Total quantity cannot be negative".to_string(),
            ));
        }
        self.repository.equipment.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await?;
        tracing::info!(equipment_id = id, "equipment deleted");
        Ok(())
    }
}
