//! Users API handlers: registration, activation, login, profiles, follows
//! and the personal feed.
//!
//! ```text
//! POST /api/v1/auth/user {"username":"ada","email":"ada@example.com","password":"s3cret"}
//! POST /api/v1/auth/token {"email":"ada@example.com","password":"s3cret"}
//! PUT /api/v1/users/activate/{token}
//! GET /api/v1/users/feed?limit=10&sort=asc&tags=rust,go&search=async
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AccessToken, ActivationToken, Error, FeedItem, FeedQuery, LoginCredentials,
    RegisterUserRequest, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid};

const USER_ID: FieldName = FieldName::new("userId");

/// Registration request body for `POST /api/v1/auth/user`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Pending user plus the activation token that was delivered to them.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

/// Login request body for `POST /api/v1/auth/token`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signed bearer token.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: AccessToken,
}

/// Raw feed query-string parameters, validated into a [`FeedQuery`].
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedParams {
    /// Page size, 1 to 20 (default 20).
    pub limit: Option<String>,
    /// Rows to skip (default 0).
    pub offset: Option<String>,
    /// `asc` or `desc` by creation time (default `desc`).
    pub sort: Option<String>,
    /// Comma-separated tags; matches posts carrying any of them.
    pub tags: Option<String>,
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
}

/// Register a pending account and send its activation invitation.
#[utoipa::path(
    post,
    path = "/api/v1/auth/user",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username taken", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerUser",
    security([])
)]
#[post("/auth/user")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let request = RegisterUserRequest::try_from_parts(&username, &email, &password)
        .map_err(|err| invalid_field(&err))?;
    let registered = state.registration.register(&request).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        user: registered.user,
        token: registered.token.expose().to_owned(),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "createToken",
    security([])
)]
#[post("/auth/token")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(|err| invalid_field(&err))?;
    let token = state.login.issue_token(&credentials).await?;
    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

/// Redeem an activation token.
#[utoipa::path(
    put,
    path = "/api/v1/users/activate/{token}",
    params(("token" = String, Path, description = "Activation token from the invitation")),
    responses(
        (status = 204, description = "User activated"),
        (status = 404, description = "Unknown or expired token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "activateUser",
    security([])
)]
#[put("/users/activate/{token}")]
pub async fn activate(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let token = ActivationToken::from_plain(path.into_inner());
    state.registration.activate(&token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Posts by the users the caller follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/feed",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed page", body = [FeedItem]),
        (status = 400, description = "Invalid query", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "userFeed"
)]
#[get("/users/feed")]
pub async fn feed(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    params: web::Query<FeedParams>,
) -> ApiResult<web::Json<Vec<FeedItem>>> {
    let FeedParams {
        limit,
        offset,
        sort,
        tags,
        search,
    } = params.into_inner();
    let query = FeedQuery::try_from_parts(
        limit.as_deref(),
        offset.as_deref(),
        sort.as_deref(),
        tags.as_deref(),
        search.as_deref(),
    )
    .map_err(|err| invalid_field(&err))?;
    let items = state.feed.user_feed(caller.user().id(), &query).await?;
    Ok(web::Json(items))
}

/// Fetch an active user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::from_uuid(parse_uuid(&path, USER_ID)?);
    let user = state.users.get_user(&id).await?;
    Ok(web::Json(user))
}

/// Follow a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/follow",
    params(("user_id" = String, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Now following"),
        (status = 400, description = "Invalid user id or self-follow", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Already following", body = Error)
    ),
    tags = ["users"],
    operation_id = "followUser"
)]
#[put("/users/{user_id}/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let followed = UserId::from_uuid(parse_uuid(&path, USER_ID)?);
    state.follows.follow(&followed, caller.user().id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stop following a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/unfollow",
    params(("user_id" = String, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not following", body = Error)
    ),
    tags = ["users"],
    operation_id = "unfollowUser"
)]
#[put("/users/{user_id}/unfollow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let followed = UserId::from_uuid(parse_uuid(&path, USER_ID)?);
    state.follows.unfollow(&followed, caller.user().id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the users routes. `feed` precedes `get_user` so the literal
/// segment wins over the path parameter.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(activate)
        .service(feed)
        .service(get_user)
        .service(follow)
        .service(unfollow);
}
