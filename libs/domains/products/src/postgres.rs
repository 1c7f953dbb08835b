use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{ListQuery, Product, ProductInput, ProductSort, SortOrder},
    repository::ProductRepository,
};

/// PostgreSQL implementation of the ProductRepository
pub struct PgProductRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn sort_column(sort: ProductSort) -> entity::Column {
        match sort {
            ProductSort::Id => entity::Column::Id,
            ProductSort::Name => entity::Column::Name,
            ProductSort::Value => entity::Column::Value,
            ProductSort::CreatedAt => entity::Column::CreatedAt,
        }
    }

    /// The unique index on name is the authoritative uniqueness signal; a
    /// violation surfacing from a write is a conflict, not a server fault.
    fn map_write_err(err: DbErr, name: &str) -> ProductError {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            ProductError::AlreadyExists(name.to_string())
        } else {
            ProductError::Database(err.to_string())
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let name = input.name.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| Self::map_write_err(e, &name))?;

        tracing::info!(product_id = %model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(|m| m.into()))
    }

    async fn list(&self, query: ListQuery) -> ProductResult<Vec<Product>> {
        let column = Self::sort_column(query.sort);

        let select = match query.order {
            SortOrder::Asc => entity::Entity::find().order_by_asc(column),
            SortOrder::Desc => entity::Entity::find().order_by_desc(column),
        };

        let models = select
            .limit(query.limit)
            .offset(query.offset)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count(&self, _query: ListQuery) -> ProductResult<u64> {
        let count = entity::Entity::find().count(self.base.db()).await?;
        Ok(count)
    }

    async fn update(&self, id: Uuid, input: ProductInput) -> ProductResult<Product> {
        let model = self
            .base
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        // Check for a name collision when the name is being changed
        if input.name != model.name {
            let name_taken = entity::Entity::find()
                .filter(entity::Column::Name.eq(&input.name))
                .filter(entity::Column::Id.ne(id))
                .one(self.base.db())
                .await?
                .is_some();

            if name_taken {
                return Err(ProductError::AlreadyExists(input.name));
            }
        }

        let name = input.name.clone();
        let mut product: Product = model.into();
        product.apply_input(input);

        let active_model: entity::ActiveModel = product.into();
        let updated = self
            .base
            .update(active_model)
            .await
            .map_err(|e| Self::map_write_err(e, &name))?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_name(&self, name: &str) -> ProductResult<bool> {
        let exists = entity::Entity::find()
            .filter(entity::Column::Name.eq(name))
            .one(self.base.db())
            .await?
            .is_some();

        Ok(exists)
    }
}
