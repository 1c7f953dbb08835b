//! Generic repository base for SeaORM entities keyed by UUID.
//!
//! Domain repositories wrap a [`BaseRepository`] for the common single-row
//! operations and fall back to [`BaseRepository::db`] for entity-specific
//! queries.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait,
};
use std::marker::PhantomData;
use uuid::Uuid;

/// Entities whose primary key is a `Uuid`.
pub trait UuidEntity: EntityTrait<PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>> {}

impl<E> UuidEntity for E where E: EntityTrait<PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>> {}

/// Shared CRUD plumbing over a pooled connection.
pub struct BaseRepository<E: UuidEntity> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: UuidEntity> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: UuidEntity> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// The underlying connection, for entity-specific queries.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert an active model and return the stored row.
    pub async fn insert<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(&self.db).await
    }

    /// Find a row by its UUID primary key.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    /// Update an active model and return the stored row.
    pub async fn update<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.update(&self.db).await
    }

    /// Delete a row by its UUID primary key, returning the affected row count.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
