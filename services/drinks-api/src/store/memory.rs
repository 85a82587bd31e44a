//! In-memory drink store.
//!
//! # Purpose
//! Implements [`DrinkStore`] with a `BTreeMap` guarded by
//! `tokio::sync::RwLock`. State is lost on restart.
//!
//! # Consistency
//! Every mutation holds the write lock for its whole check-then-write
//! sequence, so title uniqueness cannot race. Ids come from a counter that
//! only moves forward; deleted ids are never reused.
//!
//! # Metrics
//! `drinks_changes_total{op}` counts successful mutations and the
//! `drinks_total` gauge tracks the current row count.
use super::{DrinkStore, StoreError, StoreResult};
use crate::model::{Drink, DrinkPatch, Ingredient, NewDrink};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Drinks {
    next_id: u64,
    rows: BTreeMap<u64, Drink>,
}

impl Drinks {
    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.rows
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    drinks: RwLock<Drinks>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the single `water` drink the service starts with.
    pub async fn with_sample() -> StoreResult<Self> {
        let store = Self::new();
        store.create(sample_drink()).await?;
        Ok(store)
    }
}

pub fn sample_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

#[async_trait]
impl DrinkStore for InMemoryStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        Ok(self.drinks.read().await.rows.values().cloned().collect())
    }

    async fn create(&self, drink: NewDrink) -> StoreResult<Drink> {
        let mut drinks = self.drinks.write().await;
        if drinks.title_taken(&drink.title, None) {
            return Err(StoreError::Conflict(format!("title {}", drink.title)));
        }
        drinks.next_id += 1;
        let created = Drink {
            id: drinks.next_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        drinks.rows.insert(created.id, created.clone());
        metrics::counter!("drinks_changes_total", "op" => "created").increment(1);
        metrics::gauge!("drinks_total").set(drinks.rows.len() as f64);
        Ok(created)
    }

    async fn update(&self, id: u64, patch: DrinkPatch) -> StoreResult<Drink> {
        let mut drinks = self.drinks.write().await;
        if !drinks.rows.contains_key(&id) {
            return Err(StoreError::NotFound(format!("drink {id}")));
        }
        if let Some(title) = &patch.title
            && drinks.title_taken(title, Some(id))
        {
            return Err(StoreError::Conflict(format!("title {title}")));
        }
        let drink = drinks
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("drink {id}")))?;
        if let Some(title) = patch.title {
            drink.title = title;
        }
        if let Some(recipe) = patch.recipe {
            drink.recipe = recipe;
        }
        let updated = drink.clone();
        metrics::counter!("drinks_changes_total", "op" => "updated").increment(1);
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let mut drinks = self.drinks.write().await;
        if drinks.rows.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("drink {id}")));
        }
        metrics::counter!("drinks_changes_total", "op" => "deleted").increment(1);
        metrics::gauge!("drinks_total").set(drinks.rows.len() as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
