//! Product catalog: the static list of group-buyable products.
//!
//! Entries are loaded once at startup (from YAML or the built-in list) and
//! are read-only for the lifetime of the process. The catalog assigns each
//! entry its `ProductId` by position, and that id is the identity every
//! membership-uniqueness rule keys on.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core_types::ProductId;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("product '{name}': discount must be within 0-100, got {got}")]
    DiscountOutOfRange { name: String, got: u32 },

    #[error("product '{name}': min_members must be at least 1")]
    ZeroMinMembers { name: String },

    #[error("product '{name}': base price must be positive, got {got}")]
    NonPositivePrice { name: String, got: Decimal },

    #[error("duplicate product name '{0}'")]
    DuplicateName(String),

    #[error("catalog parse error: {0}")]
    Parse(String),
}

/// Immutable catalog entry.
///
/// `product_id` is assigned by the catalog at load time; a value present in
/// the source file is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub product_id: ProductId,
    pub name: String,
    pub base_price: Decimal,
    pub discount_percent: u32,
    pub min_members: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// Validated, position-indexed product list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Validate entries and assign product ids by position.
    pub fn new(mut entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.product_id = idx as ProductId;

            if entry.discount_percent > 100 {
                return Err(CatalogError::DiscountOutOfRange {
                    name: entry.name.clone(),
                    got: entry.discount_percent,
                });
            }
            if entry.min_members < 1 {
                return Err(CatalogError::ZeroMinMembers {
                    name: entry.name.clone(),
                });
            }
            if entry.base_price <= Decimal::ZERO {
                return Err(CatalogError::NonPositivePrice {
                    name: entry.name.clone(),
                    got: entry.base_price,
                });
            }
            if !seen.insert(entry.name.clone()) {
                return Err(CatalogError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a YAML list of entries.
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_yaml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(entries)
    }

    /// The stock product list, used when no catalog file is configured.
    pub fn builtin() -> Self {
        fn entry(
            name: &str,
            price_cents: i64,
            discount_percent: u32,
            min_members: u32,
            description: &str,
            category: &str,
        ) -> CatalogEntry {
            CatalogEntry {
                product_id: 0, // assigned by Catalog::new
                name: name.to_string(),
                base_price: Decimal::new(price_cents, 2),
                discount_percent,
                min_members,
                description: description.to_string(),
                category: category.to_string(),
            }
        }

        let entries = vec![
            entry(
                "Xiaomi Redmi Earbuds Pro",
                159_90,
                30,
                3,
                "Wireless Bluetooth earbuds with active noise cancellation and 28-hour battery life",
                "Electronics",
            ),
            entry(
                "Premium iPhone 15 Case",
                49_90,
                25,
                2,
                "Military-grade drop protection with MagSafe compatibility and crystal clear design",
                "Accessories",
            ),
            entry(
                "Smart Fitness Watch Pro",
                299_90,
                40,
                4,
                "Advanced health monitoring with GPS, heart rate sensor, and 7-day battery life",
                "Wearables",
            ),
            entry(
                "Portable Power Bank 20000mAh",
                89_90,
                20,
                3,
                "Fast charging power bank with dual USB-C ports and digital display",
                "Electronics",
            ),
            entry(
                "Wireless Gaming Mouse",
                129_90,
                35,
                5,
                "Professional gaming mouse with RGB lighting and 25000 DPI sensor",
                "Gaming",
            ),
            entry(
                "Bluetooth Speaker Mini",
                79_90,
                22,
                2,
                "Portable waterproof speaker with 360-degree sound and 12-hour playtime",
                "Audio",
            ),
        ];

        Self::new(entries).expect("builtin catalog is valid")
    }

    #[inline]
    pub fn get(&self, product_id: ProductId) -> Option<&CatalogEntry> {
        self.entries.get(product_id as usize)
    }

    #[inline]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_entry(name: &str, price_cents: i64, discount: u32, min: u32) -> CatalogEntry {
        CatalogEntry {
            product_id: 99, // must be overwritten by Catalog::new
            name: name.to_string(),
            base_price: Decimal::new(price_cents, 2),
            discount_percent: discount,
            min_members: min,
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_ids_assigned_by_position() {
        let catalog =
            Catalog::new(vec![raw_entry("A", 100_00, 10, 2), raw_entry("B", 50_00, 5, 3)]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().name, "A");
        assert_eq!(catalog.get(0).unwrap().product_id, 0);
        assert_eq!(catalog.get(1).unwrap().product_id, 1);
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_validation_rejects_bad_entries() {
        assert_eq!(
            Catalog::new(vec![raw_entry("A", 100_00, 101, 2)]).unwrap_err(),
            CatalogError::DiscountOutOfRange {
                name: "A".to_string(),
                got: 101
            }
        );
        assert_eq!(
            Catalog::new(vec![raw_entry("A", 100_00, 10, 0)]).unwrap_err(),
            CatalogError::ZeroMinMembers {
                name: "A".to_string()
            }
        );
        assert_eq!(
            Catalog::new(vec![raw_entry("A", 0, 10, 2)]).unwrap_err(),
            CatalogError::NonPositivePrice {
                name: "A".to_string(),
                got: Decimal::ZERO
            }
        );
        assert_eq!(
            Catalog::new(vec![raw_entry("A", 100_00, 10, 2), raw_entry("A", 50_00, 5, 3)])
                .unwrap_err(),
            CatalogError::DuplicateName("A".to_string())
        );
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
- name: "Xiaomi Earbuds"
  base_price: "150"
  discount_percent: 30
  min_members: 3
  category: "Electronics"
- name: "iPhone Case"
  base_price: "20"
  discount_percent: 25
  min_members: 2
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        let earbuds = catalog.get(0).unwrap();
        assert_eq!(earbuds.base_price, Decimal::from(150));
        assert_eq!(earbuds.min_members, 3);
        assert_eq!(earbuds.description, "");

        assert!(matches!(
            Catalog::from_yaml("not a list").unwrap_err(),
            CatalogError::Parse(_)
        ));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 6);
        // Every stock entry satisfies the same rules as file-loaded ones
        for (idx, entry) in catalog.entries().iter().enumerate() {
            assert_eq!(entry.product_id as usize, idx);
            assert!(entry.discount_percent <= 100);
            assert!(entry.min_members >= 1);
            assert!(entry.base_price > Decimal::ZERO);
        }
    }
}
