//! Equipment repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment with optional filters
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let search = query.search.as_ref().map(|s| format!("%{}%", s));
        let rows = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT * FROM equipment
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NOT TRUE OR available_quantity > 0)
              AND ($3::text IS NULL OR name ILIKE $3 OR description ILIKE $3)
            ORDER BY name
            "#,
        )
        .bind(&query.category)
        .bind(query.available_only)
        .bind(&search)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Equipment, id))
    }

    /// Get equipment by ID inside a transaction, taking a row lock.
    /// Serializes concurrent approvals and returns for the same item.
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Equipment, id))
    }

    /// Create equipment; initially all units are available
    pub async fn create(&self, data: &CreateEquipment, created_by: i32) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment
                (name, category, condition_status, total_quantity, available_quantity,
                 description, created_by)
            VALUES ($1, $2, $3, $4, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.category)
        .bind(data.condition_status.as_deref().unwrap_or("Good"))
        .bind(data.total_quantity)
        .bind(&data.description)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment. A capacity change shifts available_quantity by the
    /// same delta. Single statement: both columns are computed from the old
    /// row atomically, so a decrement committed by a concurrent approval
    /// cannot be overwritten.
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET name = COALESCE($2::text, name),
                category = COALESCE($3::text, category),
                condition_status = COALESCE($4::text, condition_status),
                available_quantity = available_quantity
                    + (COALESCE($5::int, total_quantity) - total_quantity),
                total_quantity = COALESCE($5::int, total_quantity),
                description = COALESCE($6::text, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.category.as_deref())
        .bind(data.condition_status.as_deref())
        .bind(data.total_quantity)
        .bind(data.description.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound(EntityKind::Equipment, id))
    }

    /// Delete equipment. Refused while active bookings reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment_bookings WHERE equipment_id = $1 AND status = 0)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_active {
            return Err(AppError::Conflict(
                "Equipment has active bookings and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(EntityKind::Equipment, id));
        }
        Ok(())
    }

    /// Decrement available units. Ledger-only: called when bookings are
    /// committed for an approved request.
    pub async fn decrement_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        quantity: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET available_quantity = available_quantity - $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Re-increment available units on return, clamped to total_quantity so
    /// a capacity reduction made while the item was on loan cannot push the
    /// counter above capacity.
    pub async fn increment_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        quantity: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET available_quantity = LEAST(total_quantity, available_quantity + $2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
