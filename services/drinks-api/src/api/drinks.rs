//! Drink API handlers.
//!
//! # Purpose
//! Implements the public listing and the permission-gated detail, create,
//! patch and delete endpoints. Gated handlers receive the verified
//! [`ClaimSet`] from the permission middleware as a request extension.
use crate::api::error::{ApiError, api_internal, api_not_found, api_unprocessable};
use crate::api::types::{
    DeleteDrinkResponse, DrinkCreateRequest, DrinkDetailListResponse, DrinkListResponse,
    DrinkPatchRequest, RecipeInput,
};
use crate::app::AppState;
use crate::model::{DrinkPatch, Ingredient, NewDrink};
use crate::store::StoreError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use drinks_authz::ClaimSet;

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "drinks",
    responses(
        (status = 200, description = "Drinks in short form", body = DrinkListResponse)
    )
)]
pub(crate) async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinkListResponse>, ApiError> {
    let drinks = state
        .store
        .list()
        .await
        .map_err(|err| api_internal("failed to list drinks", &err))?;
    Ok(Json(DrinkListResponse {
        success: true,
        drinks: drinks.iter().map(|drink| drink.short()).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "drinks",
    security(("bearer" = ["get:drinks-detail"])),
    responses(
        (status = 200, description = "Drinks in long form", body = DrinkDetailListResponse),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission not granted", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_drink_details(
    State(state): State<AppState>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<DrinkDetailListResponse>, ApiError> {
    tracing::debug!(sub = claims.subject(), "listing drink details");
    let drinks = state
        .store
        .list()
        .await
        .map_err(|err| api_internal("failed to list drinks", &err))?;
    Ok(Json(DrinkDetailListResponse {
        success: true,
        drinks,
    }))
}

#[utoipa::path(
    post,
    path = "/drinks",
    tag = "drinks",
    security(("bearer" = ["post:drinks"])),
    request_body = DrinkCreateRequest,
    responses(
        (status = 200, description = "Drink created", body = DrinkDetailListResponse),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Permission not granted", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Invalid drink or duplicate title", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<ClaimSet>,
    body: Result<Json<DrinkCreateRequest>, JsonRejection>,
) -> Result<Json<DrinkDetailListResponse>, ApiError> {
    let Json(body) = body?;
    let drink = NewDrink {
        title: required_title(body.title)?,
        recipe: recipe(body.recipe.ok_or_else(api_unprocessable)?)?,
    };
    match state.store.create(drink).await {
        Ok(created) => {
            tracing::info!(sub = claims.subject(), id = created.id, "drink created");
            Ok(Json(DrinkDetailListResponse {
                success: true,
                drinks: vec![created],
            }))
        }
        Err(StoreError::Conflict(_)) => Err(api_unprocessable()),
        Err(err) => Err(api_internal("failed to create drink", &err)),
    }
}

#[utoipa::path(
    patch,
    path = "/drinks/{drink_id}",
    tag = "drinks",
    security(("bearer" = ["patch:drinks"])),
    params(("drink_id" = u64, Path, description = "Drink identifier")),
    request_body = DrinkPatchRequest,
    responses(
        (status = 200, description = "Drink updated", body = DrinkDetailListResponse),
        (status = 404, description = "Drink not found", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Invalid update or duplicate title", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<ClaimSet>,
    drink_id: Result<Path<u64>, PathRejection>,
    body: Result<Json<DrinkPatchRequest>, JsonRejection>,
) -> Result<Json<DrinkDetailListResponse>, ApiError> {
    let Path(drink_id) = drink_id.map_err(|_| api_not_found())?;
    let Json(body) = body?;
    let patch = DrinkPatch {
        title: body.title.map(|title| required_title(Some(title))).transpose()?,
        recipe: body.recipe.map(recipe).transpose()?,
    };
    match state.store.update(drink_id, patch).await {
        Ok(updated) => {
            tracing::info!(sub = claims.subject(), id = drink_id, "drink updated");
            Ok(Json(DrinkDetailListResponse {
                success: true,
                drinks: vec![updated],
            }))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found()),
        Err(StoreError::Conflict(_)) => Err(api_unprocessable()),
        Err(err) => Err(api_internal("failed to update drink", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/drinks/{drink_id}",
    tag = "drinks",
    security(("bearer" = ["delete:drinks"])),
    params(("drink_id" = u64, Path, description = "Drink identifier")),
    responses(
        (status = 200, description = "Drink deleted", body = DeleteDrinkResponse),
        (status = 404, description = "Drink not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<ClaimSet>,
    drink_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    let Path(drink_id) = drink_id.map_err(|_| api_not_found())?;
    match state.store.delete(drink_id).await {
        Ok(()) => {
            tracing::info!(sub = claims.subject(), id = drink_id, "drink deleted");
            Ok(Json(DeleteDrinkResponse {
                success: true,
                delete: drink_id,
            }))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found()),
        Err(err) => Err(api_internal("failed to delete drink", &err)),
    }
}

fn required_title(title: Option<String>) -> Result<String, ApiError> {
    title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(api_unprocessable)
}

fn recipe(input: RecipeInput) -> Result<Vec<Ingredient>, ApiError> {
    let ingredients = input.into_ingredients();
    let valid = !ingredients.is_empty()
        && ingredients.iter().all(|ingredient| {
            !ingredient.name.trim().is_empty()
                && !ingredient.color.trim().is_empty()
                && ingredient.parts > 0
        });
    if !valid {
        return Err(api_unprocessable());
    }
    Ok(ingredients)
}
