//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the JSON payload shapes of the drinks API and their OpenAPI
//! schemas.
use crate::model::{Drink, DrinkSummary, Ingredient};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

/// Error envelope returned by every failing request.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    /// HTTP status code, repeated for clients that only read the body.
    pub error: u16,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinkListResponse {
    pub success: bool,
    pub drinks: Vec<DrinkSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinkDetailListResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    pub delete: u64,
}

/// A recipe may be posted as one ingredient or as a list.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::One(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DrinkCreateRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DrinkPatchRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}
