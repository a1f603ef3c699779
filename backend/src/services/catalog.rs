//! Simulated product catalog
//!
//! Stands in for an external food database: a fixed barcode table and a
//! fixed search result list, served after a configurable delay.

use crate::config::CatalogConfig;
use fitforge_shared::{CatalogProduct, FoodSearchResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

fn product(
    name: &str,
    calories: i32,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving_size: &str,
) -> CatalogProduct {
    CatalogProduct {
        name: name.to_string(),
        calories,
        protein,
        carbs,
        fat,
        serving_size: serving_size.to_string(),
    }
}

static BARCODES: Lazy<HashMap<&'static str, CatalogProduct>> = Lazy::new(|| {
    HashMap::from([
        ("1234567890", product("Protein Bar", 220, 20.0, 22.0, 8.0, "1 bar (68g)")),
        ("9876543210", product("Greek Yogurt", 130, 12.0, 5.0, 8.0, "1 container (150g)")),
        ("5432167890", product("Energy Drink", 160, 0.0, 40.0, 0.0, "1 can (355ml)")),
    ])
});

static SEARCH_RESULTS: Lazy<Vec<FoodSearchResult>> = Lazy::new(|| {
    vec![
        FoodSearchResult {
            id: "food_1".to_string(),
            product: product("Protein Bar", 220, 20.0, 22.0, 8.0, "1 bar (68g)"),
        },
        FoodSearchResult {
            id: "food_2".to_string(),
            product: product("Greek Yogurt", 130, 12.0, 5.0, 8.0, "1 container (150g)"),
        },
        FoodSearchResult {
            id: "food_3".to_string(),
            product: product("Chicken Breast", 165, 31.0, 0.0, 3.6, "100g"),
        },
    ]
});

/// Barcode lookup and food search with artificial latency
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    config: CatalogConfig,
}

impl ProductCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Fixed result list; the query text does not narrow it
    pub async fn search(&self, query: &str) -> Vec<FoodSearchResult> {
        debug!(query, "Simulated food search");
        tokio::time::sleep(self.config.search_delay()).await;
        SEARCH_RESULTS.clone()
    }

    pub async fn lookup_barcode(&self, code: &str) -> Option<CatalogProduct> {
        tokio::time::sleep(self.config.barcode_delay()).await;
        let hit = BARCODES.get(code).cloned();
        debug!(code, found = hit.is_some(), "Simulated barcode lookup");
        hit
    }
}
