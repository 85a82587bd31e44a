//! Drinks data model.
//!
//! # Purpose
//! Re-exports the drink entity, its recipe parts and the short
//! representation served on the public listing.
mod drink;

pub use drink::{Drink, DrinkPatch, DrinkSummary, Ingredient, IngredientSummary, NewDrink};
