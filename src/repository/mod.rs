//! Repository layer for database operations

pub mod bookings;
pub mod equipment;
pub mod requests;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub equipment: equipment::EquipmentRepository,
    pub requests: requests::RequestsRepository,
    pub bookings: bookings::BookingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            pool,
        }
    }
}
