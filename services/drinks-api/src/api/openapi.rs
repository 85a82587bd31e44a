//! OpenAPI document for the drinks API.
use crate::api::{
    drinks, system,
    types::{
        DeleteDrinkResponse, DrinkCreateRequest, DrinkDetailListResponse, DrinkListResponse,
        DrinkPatchRequest, ErrorResponse, HealthStatus, RecipeInput,
    },
};
use crate::model::{Drink, DrinkSummary, Ingredient, IngredientSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "drinks-api",
        version = "v1",
        description = "Drinks menu API with permission-gated bearer tokens"
    ),
    paths(
        system::health,
        drinks::list_drinks,
        drinks::list_drink_details,
        drinks::create_drink,
        drinks::patch_drink,
        drinks::delete_drink
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        Drink,
        DrinkSummary,
        Ingredient,
        IngredientSummary,
        RecipeInput,
        DrinkListResponse,
        DrinkDetailListResponse,
        DeleteDrinkResponse,
        DrinkCreateRequest,
        DrinkPatchRequest
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "system", description = "Health and API description"),
        (name = "drinks", description = "Drinks menu")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
