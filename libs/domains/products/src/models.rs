use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Reject names that are empty after trimming; `length` alone lets
/// whitespace-only names through.
fn validate_name_not_blank(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_name"));
    }
    Ok(())
}

/// Product entity - a purchasable item in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,
    /// Product name, unique across the catalog
    pub name: String,
    /// Fixed-point monetary value
    pub value: Decimal,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO carrying validated client input, used by both create and update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "validate_name_not_blank")
    )]
    pub name: String,
    /// Fixed-point monetary value; a missing field is rejected at
    /// deserialization time
    pub value: Decimal,
}

/// Sort key for product listings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Id,
    Name,
    Value,
    CreatedAt,
}

/// Sort direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Pagination and ordering parameters for listing products
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
    /// Sort key (default: id)
    #[serde(default)]
    pub sort: ProductSort,
    /// Sort direction (default: ascending)
    #[serde(default)]
    pub order: SortOrder,
}

fn default_limit() -> u64 {
    50
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            sort: ProductSort::default(),
            order: SortOrder::default(),
        }
    }
}

/// One window of products plus total count metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<Product>,
    /// Total number of stored products, independent of the window
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Navigation link pointing at a related resource or operation.
///
/// Links are produced by formatting the known route template with the entity
/// id; clients can follow them without hardcoding URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    /// Relation of the target to the current resource (e.g. "self")
    pub rel: String,
    /// Target URL
    pub href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }

    /// Link to a single product.
    pub fn self_link(base: &str, id: Uuid) -> Self {
        Self::new("self", format!("{}/{}", base, id))
    }

    /// Link to the product collection.
    pub fn collection(base: &str) -> Self {
        Self::new("products", base)
    }
}

/// A product enriched with navigation links for responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub links: Vec<Link>,
}

impl LinkedProduct {
    /// Item inside a collection response: carries only its own link.
    pub fn in_collection(base: &str, product: Product) -> Self {
        let links = vec![Link::self_link(base, product.id)];
        Self { product, links }
    }

    /// Detail response: own link plus a link back to the collection.
    pub fn detail(base: &str, product: Product) -> Self {
        let links = vec![Link::self_link(base, product.id), Link::collection(base)];
        Self { product, links }
    }
}

/// Collection response: linked items plus page metadata and a link to itself
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PagedProducts {
    pub items: Vec<LinkedProduct>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub links: Vec<Link>,
}

impl PagedProducts {
    pub fn from_page(base: &str, page: ProductPage) -> Self {
        Self {
            items: page
                .items
                .into_iter()
                .map(|p| LinkedProduct::in_collection(base, p))
                .collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            links: vec![Link::collection(base)],
        }
    }
}

impl Product {
    /// Create a new product from validated input
    pub fn new(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            value: input.value,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total mapping from input onto an existing product: overwrites exactly
    /// `name` and `value`, preserves `id` and `created_at`, bumps `updated_at`.
    pub fn apply_input(&mut self, input: ProductInput) {
        self.name = input.name;
        self.value = input.value;
        self.updated_at = Utc::now();
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

    #[test]
    fn test_new_product_copies_input() {
        let product = Product::new(input("Smartphone Xiaomi Redmi Note 11", "2000.00"));

        assert_eq!(product.name, "Smartphone Xiaomi Redmi Note 11");
        assert_eq!(product.value, "2000.00".parse::<Decimal>().unwrap());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_apply_input_overwrites_name_and_value_only() {
        let mut product = Product::new(input("Old Name", "100.00"));
        let id = product.id;
        let created_at = product.created_at;

        product.apply_input(input("New Name", "1500.00"));

        assert_eq!(product.id, id);
        assert_eq!(product.created_at, created_at);
        assert_eq!(product.name, "New Name");
        assert_eq!(product.value, "1500.00".parse::<Decimal>().unwrap());
        assert!(product.updated_at >= created_at);
    }

    #[test]
    fn test_input_validation_rejects_blank_name() {
        assert!(input("", "1.00").validate().is_err());
        assert!(input("   ", "1.00").validate().is_err());
        assert!(input("a".repeat(201).as_str(), "1.00").validate().is_err());
        assert!(input("Smartphone", "1.00").validate().is_ok());
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort, ProductSort::Id);
        assert_eq!(query.order, SortOrder::Asc);
    }

    #[test]
    fn test_links_format_route_templates() {
        let id = Uuid::now_v7();
        let link = Link::self_link("/api/products", id);
        assert_eq!(link.rel, "self");
        assert_eq!(link.href, format!("/api/products/{}", id));

        let link = Link::collection("/api/products");
        assert_eq!(link.rel, "products");
        assert_eq!(link.href, "/api/products");
    }

    #[test]
    fn test_linked_product_serializes_flattened() {
        let product = Product::new(input("Widget", "9.99"));
        let id = product.id;
        let json =
            serde_json::to_value(LinkedProduct::detail("/api/products", product)).unwrap();

        assert_eq!(json["name"], "Widget");
        assert_eq!(json["id"], serde_json::json!(id));
        assert_eq!(json["links"][0]["rel"], "self");
        assert_eq!(json["links"][1]["rel"], "products");
    }
}
