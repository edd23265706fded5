use std::sync::Arc;

use anyhow::Result;
use axum::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use uuid::Uuid;

use crate::domain::{entities::users::UserEntity, repositories::users::UserRepository};
use crate::infrastructure::postgres::{postgres_connection::PgPoolHandle, schema::users};

pub struct UserPostgres {
    db_pool: Arc<PgPoolHandle>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolHandle>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .find(user_id)
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
