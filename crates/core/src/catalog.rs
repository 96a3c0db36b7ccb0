use rust_decimal::Decimal;

use crate::domain::product::{Product, ProductId};

/// Ordered, read-only product list for one engine call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The six demo products bundled with the retail app.
    pub fn sample() -> Self {
        Self::new(SAMPLE_PRODUCTS.iter().map(ProductSeed::to_product).collect())
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.find(product_id).is_some()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in `category` (case-insensitive) priced at or below `max_price`,
    /// in catalog order.
    pub fn in_category_up_to(&self, category: &str, max_price: Decimal) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.is_in_category(category) && product.price <= max_price)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// Supplies the current catalog snapshot at call time.
pub trait CatalogProvider: Send + Sync {
    fn snapshot(&self) -> Catalog;
}

impl CatalogProvider for Catalog {
    fn snapshot(&self) -> Catalog {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    brand: &'static str,
    price_cents: i64,
    rating: f64,
    review_count: u32,
    tags: &'static [&'static str],
}

impl ProductSeed {
    fn to_product(&self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            category: self.category.to_owned(),
            brand: self.brand.to_owned(),
            price: Decimal::new(self.price_cents, 2),
            rating: self.rating,
            review_count: self.review_count,
            tags: self.tags.iter().map(|tag| (*tag).to_owned()).collect(),
            in_stock: true,
        }
    }
}

const SAMPLE_PRODUCTS: &[ProductSeed] = &[
    ProductSeed {
        id: "1",
        name: "Wireless Bluetooth Headphones",
        description: "Premium wireless headphones with noise cancellation and 30-hour battery life.",
        category: "Electronics",
        brand: "TechPro",
        price_cents: 12_999,
        rating: 4.5,
        review_count: 234,
        tags: &["wireless", "bluetooth", "noise-cancelling"],
    },
    ProductSeed {
        id: "2",
        name: "Smart Fitness Watch",
        description: "Advanced fitness tracking with heart rate monitoring, GPS, and 7-day battery life.",
        category: "Wearables",
        brand: "FitTech",
        price_cents: 29_999,
        rating: 4.7,
        review_count: 189,
        tags: &["fitness", "smart", "gps", "health"],
    },
    ProductSeed {
        id: "3",
        name: "Organic Cotton T-Shirt",
        description: "Soft, sustainable organic cotton t-shirt in premium quality fabric.",
        category: "Clothing",
        brand: "EcoWear",
        price_cents: 3_999,
        rating: 4.3,
        review_count: 156,
        tags: &["organic", "cotton", "sustainable", "casual"],
    },
    ProductSeed {
        id: "4",
        name: "Professional Camera Lens",
        description: "50mm f/1.8 prime lens for professional photography with exceptional image quality.",
        category: "Photography",
        brand: "LensMaster",
        price_cents: 59_999,
        rating: 4.8,
        review_count: 89,
        tags: &["camera", "lens", "photography", "professional"],
    },
    ProductSeed {
        id: "5",
        name: "Ergonomic Office Chair",
        description: "Premium ergonomic office chair with lumbar support and adjustable height.",
        category: "Furniture",
        brand: "ComfortPro",
        price_cents: 44_999,
        rating: 4.6,
        review_count: 203,
        tags: &["office", "ergonomic", "chair", "comfort"],
    },
    ProductSeed {
        id: "6",
        name: "HP Pavilion 15.6\" Laptop",
        description: "Powerful HP Pavilion laptop with Intel Core i7 processor, 16GB RAM, 512GB SSD, and NVIDIA GeForce graphics for work and entertainment.",
        category: "Electronics",
        brand: "HP",
        price_cents: 89_999,
        rating: 4.4,
        review_count: 312,
        tags: &["laptop", "computer", "gaming", "work", "portable"],
    },
];

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Catalog, CatalogProvider};
    use crate::domain::product::ProductId;

    #[test]
    fn sample_catalog_keeps_seed_order() {
        let catalog = Catalog::sample();
        let ids: Vec<_> = catalog.iter().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn category_filter_is_inclusive_on_price() {
        let catalog = Catalog::sample();

        let under_130 = catalog.in_category_up_to("electronics", Decimal::new(12999, 2));
        assert_eq!(under_130.len(), 1);
        assert_eq!(under_130[0].id, ProductId::new("1"));

        let under_1000 = catalog.in_category_up_to("ELECTRONICS", Decimal::from(1000));
        assert_eq!(under_1000.len(), 2);
    }

    #[test]
    fn catalog_is_its_own_provider() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.snapshot(), catalog);
        assert!(catalog.contains(&ProductId::new("6")));
        assert!(!catalog.contains(&ProductId::new("7")));
    }
}
