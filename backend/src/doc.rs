//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the domain schemas they return
//! and the bearer security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Comment, Error, ErrorCode, FeedItem, Post, Role, User};
use crate::inbound::http::posts::{CreateCommentBody, CreatePostBody, UpdatePostBody};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token issued by POST /api/v1/auth/token."))
            .build();
        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Social backend API",
        description = "Users, posts, comments, follows and personalised feeds."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::activate,
        crate::inbound::http::users::feed,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::follow,
        crate::inbound::http::users::unfollow,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::create_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Post,
        Comment,
        FeedItem,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        TokenResponse,
        CreatePostBody,
        UpdatePostBody,
        CreateCommentBody,
    )),
    tags(
        (name = "auth", description = "Registration and token issuance"),
        (name = "users", description = "Profiles, follows and feeds"),
        (name = "posts", description = "Posts and comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
