//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lending Tracker API",
        version = "0.1.0",
        description = "API for managing board games, books, user authentication, and loans."
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Board games
        catalog::list_boardgames,
        catalog::get_boardgame,
        catalog::create_boardgame,
        catalog::update_boardgame,
        catalog::delete_boardgame,
        // Books
        catalog::list_books,
        catalog::get_book,
        catalog::create_book,
        catalog::update_book,
        catalog::delete_book,
        // Loans
        loans::borrow,
        loans::return_loan,
        loans::list_loans,
        loans::active_loans,
    ),
    components(
        schemas(
            // Auth
            auth::RegisterResponse,
            auth::LoginResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::User,
            crate::models::user::Role,
            // Catalog
            crate::models::catalog::BoardGame,
            crate::models::catalog::Book,
            crate::models::catalog::CreateBoardGame,
            crate::models::catalog::UpdateBoardGame,
            crate::models::catalog::CreateBook,
            crate::models::catalog::UpdateBook,
            crate::models::catalog::ItemType,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanItem,
            crate::models::loan::BorrowRequest,
            crate::models::loan::ReturnRequest,
            // Errors
            crate::error::ErrorResponse,
            // Health
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "User authentication and registration"),
        (name = "boardgames", description = "Board game management"),
        (name = "books", description = "Book management"),
        (name = "loans", description = "Loan management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
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

/// Create the router serving the OpenAPI document and Swagger UI
pub fn create_openapi_router() -> Router {
    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}
