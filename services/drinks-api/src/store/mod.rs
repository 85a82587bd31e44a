use crate::model::{Drink, DrinkPatch, NewDrink};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by id.
    async fn list(&self) -> StoreResult<Vec<Drink>>;
    /// Titles are unique; a duplicate is a `Conflict`.
    async fn create(&self, drink: NewDrink) -> StoreResult<Drink>;
    async fn update(&self, id: u64, patch: DrinkPatch) -> StoreResult<Drink>;
    async fn delete(&self, id: u64) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
