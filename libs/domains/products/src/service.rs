//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{ListQuery, Product, ProductInput, ProductPage};
use crate::repository::ProductRepository;

/// Service layer for Product business logic.
///
/// Validates input, enforces name uniqueness ahead of the storage constraint,
/// maps absence to `NotFound`, and otherwise delegates to the repository.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        // Best-effort pre-check; the unique index on name is the
        // authoritative guard under concurrent creates.
        if self.repository.exists_by_name(&input.name).await? {
            return Err(ProductError::AlreadyExists(input.name));
        }

        self.repository.create(input).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// List one page of products with total count metadata
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ListQuery) -> ProductResult<ProductPage> {
        let items = self.repository.list(query.clone()).await?;
        let total = self.repository.count(query.clone()).await?;

        Ok(ProductPage {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Overwrite an existing product's name and value
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: ProductInput) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        // Renaming onto another product's name is a conflict
        if input.name != existing.name && self.repository.exists_by_name(&input.name).await? {
            return Err(ProductError::AlreadyExists(input.name));
        }

        self.repository.update(id, input).await
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if self.repository.get_by_id(id).await?.is_none() {
            return Err(ProductError::NotFound(id));
        }

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(ProductError::NotFound(id));
        }

        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockProductRepository;
    use mockall::predicate::eq;

    fn input(name: &str, value: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            value: value.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_product_returns_stored_product() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_exists_by_name()
            .withf(|name| name == "Smartphone Xiaomi Redmi Note 11")
            .returning(|_| Ok(false));
        mock_repo
            .expect_create()
            .returning(|input| Ok(Product::new(input)));

        let service = ProductService::new(mock_repo);
        let product = service
            .create_product(input("Smartphone Xiaomi Redmi Note 11", "2000.00"))
            .await
            .unwrap();

        assert_eq!(product.name, "Smartphone Xiaomi Redmi Note 11");
        assert_eq!(product.value, "2000.00".parse().unwrap());
    }

    #[tokio::test]
    async fn test_create_product_conflicts_when_name_exists() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_exists_by_name()
            .withf(|name| name == "Smartphone Xiaomi Redmi Note 11")
            .returning(|_| Ok(true));
        // create must not be reached

        let service = ProductService::new(mock_repo);
        let result = service
            .create_product(input("Smartphone Xiaomi Redmi Note 11", "2000.00"))
            .await;

        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_product_rejects_blank_name_before_repository() {
        let mock_repo = MockProductRepository::new();

        let service = ProductService::new(mock_repo);
        let result = service.create_product(input("   ", "10.00")).await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_product_found() {
        let mut mock_repo = MockProductRepository::new();
        let product = Product::new(input("Monitor", "800.00"));
        let id = product.id;

        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(product.clone())));

        let service = ProductService::new(mock_repo);
        let found = service.get_product(id).await.unwrap();

        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockProductRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let result = service.get_product(id).await;

        assert!(matches!(result, Err(ProductError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_list_products_builds_page_metadata() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo.expect_list().returning(|_| {
            Ok(vec![
                Product::new(ProductInput {
                    name: "A".to_string(),
                    value: "1.00".parse().unwrap(),
                }),
                Product::new(ProductInput {
                    name: "B".to_string(),
                    value: "2.00".parse().unwrap(),
                }),
            ])
        });
        mock_repo.expect_count().returning(|_| Ok(7));

        let service = ProductService::new(mock_repo);
        let page = service
            .list_products(ListQuery {
                limit: 2,
                offset: 4,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 7);
        assert_eq!(page.limit, 2);
        assert_eq!(page.offset, 4);
    }

    #[tokio::test]
    async fn test_update_product_not_found() {
        let mut mock_repo = MockProductRepository::new();
        let id = Uuid::now_v7();

        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let result = service.update_product(id, input("New Name", "1500.00")).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_product_rejects_rename_onto_taken_name() {
        let mut mock_repo = MockProductRepository::new();
        let existing = Product::new(input("Old Name", "100.00"));
        let id = existing.id;

        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_exists_by_name()
            .withf(|name| name == "Taken Name")
            .returning(|_| Ok(true));

        let service = ProductService::new(mock_repo);
        let result = service.update_product(id, input("Taken Name", "100.00")).await;

        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_product_same_name_skips_conflict_check() {
        let mut mock_repo = MockProductRepository::new();
        let existing = Product::new(input("Same Name", "100.00"));
        let id = existing.id;

        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        // exists_by_name must not be reached for an unchanged name
        mock_repo.expect_update().returning(|_, update| {
            let mut product = Product::new(update.clone());
            product.apply_input(update);
            Ok(product)
        });

        let service = ProductService::new(mock_repo);
        let updated = service
            .update_product(id, input("Same Name", "150.00"))
            .await
            .unwrap();

        assert_eq!(updated.value, "150.00".parse().unwrap());
    }

    #[tokio::test]
    async fn test_delete_product_removes_existing() {
        let mut mock_repo = MockProductRepository::new();
        let product = Product::new(input("Doomed", "1.00"));
        let id = product.id;

        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(product.clone())));
        mock_repo
            .expect_delete()
            .with(eq(id))
            .returning(|_| Ok(true));

        let service = ProductService::new(mock_repo);
        assert!(service.delete_product(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_product_not_found() {
        let mut mock_repo = MockProductRepository::new();
        let id = Uuid::now_v7();

        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let result = service.delete_product(id).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }
}
