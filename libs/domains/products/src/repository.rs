use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{ListQuery, Product, ProductInput, ProductSort, SortOrder};

/// Repository trait for Product persistence
///
/// Implementations can use different storage backends; the service layer only
/// depends on this interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product; a name collision yields `AlreadyExists`
    async fn create(&self, input: ProductInput) -> ProductResult<Product>;

    /// Get a product by ID; absence is not an error
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// List one window of products, ordered per the query
    async fn list(&self, query: ListQuery) -> ProductResult<Vec<Product>>;

    /// Count all stored products
    async fn count(&self, query: ListQuery) -> ProductResult<u64>;

    /// Overwrite name and value of an existing product
    async fn update(&self, id: Uuid, input: ProductInput) -> ProductResult<Product>;

    /// Delete a product by ID; returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Exact-match existence check on the product name
    async fn exists_by_name(&self, name: &str) -> ProductResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn compare(a: &Product, b: &Product, sort: ProductSort) -> Ordering {
    match sort {
        ProductSort::Id => a.id.cmp(&b.id),
        ProductSort::Name => a.name.cmp(&b.name),
        ProductSort::Value => a.value.cmp(&b.value),
        ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        // Name check and insert happen under the same write lock, so the
        // in-memory backend cannot lose the race the way a pre-check against
        // a remote store can.
        if products.values().any(|p| p.name == input.name) {
            return Err(ProductError::AlreadyExists(input.name));
        }

        let product = Product::new(input);
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, query: ListQuery) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products.values().cloned().collect();
        result.sort_by(|a, b| match query.order {
            SortOrder::Asc => compare(a, b, query.sort),
            SortOrder::Desc => compare(b, a, query.sort),
        });

        let result: Vec<Product> = result
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();

        Ok(result)
    }

    async fn count(&self, _query: ListQuery) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.len() as u64)
    }

    async fn update(&self, id: Uuid, input: ProductInput) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if !products.contains_key(&id) {
            return Err(ProductError::NotFound(id));
        }

        let name_taken = products
            .values()
            .any(|p| p.id != id && p.name == input.name);
        if name_taken {
            return Err(ProductError::AlreadyExists(input.name));
        }

        let product = products
            .get_mut(&id)
            .ok_or(ProductError::NotFound(id))?;
        product.apply_input(input);
        let updated = product.clone();

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_name(&self, name: &str) -> ProductResult<bool> {
        let products = self.products.read().await;
        Ok(products.values().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, value: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            value: value.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = InMemoryProductRepository::new();

        let product = repo
            .create(input("Smartphone Xiaomi Redmi Note 11", "2000.00"))
            .await
            .unwrap();
        assert_eq!(product.name, "Smartphone Xiaomi Redmi Note 11");

        let fetched = repo.get_by_id(product.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, product.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_error() {
        let repo = InMemoryProductRepository::new();

        repo.create(input("Monitor", "800.00")).await.unwrap();

        let result = repo.create(input("Monitor", "900.00")).await;
        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_name() {
        let repo = InMemoryProductRepository::new();

        repo.create(input("Keyboard", "50.00")).await.unwrap();
        let mouse = repo.create(input("Mouse", "25.00")).await.unwrap();

        let result = repo.update(mouse.id, input("Keyboard", "25.00")).await;
        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));

        // Re-submitting its own name is not a collision
        let updated = repo
            .update(mouse.id, input("Mouse", "30.00"))
            .await
            .unwrap();
        assert_eq!(updated.value, "30.00".parse().unwrap());
    }

    #[tokio::test]
    async fn test_list_sorted_by_id_ascending() {
        let repo = InMemoryProductRepository::new();

        for i in 0..5 {
            repo.create(input(&format!("Product {}", i), "1.00"))
                .await
                .unwrap();
        }

        let listed = repo.list(ListQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 5);
        assert!(listed.windows(2).all(|w| w[0].id <= w[1].id));
    }

    #[tokio::test]
    async fn test_pagination_windows_partition_the_set() {
        let repo = InMemoryProductRepository::new();

        for i in 0..5 {
            repo.create(input(&format!("Product {}", i), "1.00"))
                .await
                .unwrap();
        }

        let page1 = repo
            .list(ListQuery {
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        let page2 = repo
            .list(ListQuery {
                limit: 3,
                offset: 3,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page1.len(), 3);
        assert_eq!(page2.len(), 2);

        let mut ids: Vec<Uuid> = page1.iter().chain(&page2).map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5, "windows must not overlap");
    }
}
