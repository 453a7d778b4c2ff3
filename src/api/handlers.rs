use crate::{
    api::models::*,
    auth::identity::CurrentUser,
    core::{
        models::{balance::Balance, user::User},
        service::{BalancerService, PeerBalance},
    },
    infrastructure::{kv::in_memory::InMemoryKv, logging::in_memory::InMemoryLogging},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use http::{StatusCode, header::HeaderMap};
use std::sync::Arc;

/// Middleware installing the caller's identity from the headers set by the
/// upstream authenticator. Credentials are never validated here.
async fn identity_middleware(mut req: Request, next: Next) -> Response {
    let username = header_value(req.headers(), "x-username");
    let nickname = header_value(req.headers(), "x-nickname");
    match (username, nickname) {
        (Some(username), Some(nickname)) => {
            req.extensions_mut()
                .insert(CurrentUser::new(username, nickname));
            next.run(req).await
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "x-username and x-nickname headers are required".to_string(),
            }),
        )
            .into_response(),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

// Define API routes
pub fn api_routes(service: Arc<BalancerService<InMemoryLogging, InMemoryKv>>) -> Router {
    let protected_routes = Router::new()
        .route("/user", axum::routing::post(register_user))
        .route("/user", axum::routing::get(get_user))
        .route("/balance", axum::routing::post(create_balance))
        .route("/balance/{balance_id}", axum::routing::get(get_balance))
        .route("/balance/{balance_id}", axum::routing::post(join_balance))
        .route(
            "/balance/{balance_id}/purchase",
            axum::routing::post(create_purchase),
        )
        .route(
            "/balance/{balance_id}/purchase/{purchase_id}",
            axum::routing::delete(delete_purchase),
        )
        .route(
            "/balance/{balance_id}/peers",
            axum::routing::get(get_peer_balances),
        )
        .route_layer(middleware::from_fn(identity_middleware));

    Router::new()
        .route("/", axum::routing::get(|| async { "OK" }))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/user",
    responses(
        (status = 200, description = "User registered (or already present)", body = User),
        (status = 401, description = "Identity headers missing", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn register_user(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<User>, ApiError> {
    let registered = service.register_user(&user).await?;
    Ok(Json(registered))
}

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "The caller's document, including the balance index", body = User),
        (status = 404, description = "User not registered", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<User>, ApiError> {
    let document = service.get_user(&user).await?;
    Ok(Json(document))
}

#[utoipa::path(
    post,
    path = "/balance",
    request_body = CreateBalanceRequest,
    responses(
        (status = 200, description = "Balance created", body = Balance),
        (status = 400, description = "Name missing", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn create_balance(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateBalanceRequest>,
) -> Result<Json<Balance>, ApiError> {
    let balance = service.create_balance(&user, req.name).await?;
    Ok(Json(balance))
}

#[utoipa::path(
    get,
    path = "/balance/{balance_id}",
    params(("balance_id" = String, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "The balance document", body = Balance),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Balance not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_balance(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Path(balance_id): Path<String>,
) -> Result<Json<Balance>, ApiError> {
    let balance = service.get_balance(&user, &balance_id).await?;
    Ok(Json(balance))
}

#[utoipa::path(
    post,
    path = "/balance/{balance_id}",
    params(("balance_id" = String, Path, description = "ID of the balance to join")),
    responses(
        (status = 200, description = "Joined; the updated balance document", body = Balance),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn join_balance(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Path(balance_id): Path<String>,
) -> Result<Json<Balance>, ApiError> {
    let balance = service.join_balance(&user, &balance_id).await?;
    Ok(Json(balance))
}

#[utoipa::path(
    post,
    path = "/balance/{balance_id}/purchase",
    request_body = CreatePurchaseRequest,
    params(("balance_id" = String, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "Purchase applied; the updated balance document", body = Balance),
        (status = 400, description = "Malformed amount, consumers or description", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn create_purchase(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Path(balance_id): Path<String>,
    Json(req): Json<CreatePurchaseRequest>,
) -> Result<Json<Balance>, ApiError> {
    let balance = service
        .add_purchase(&user, &balance_id, req.amount, &req.description, &req.consumers)
        .await?;
    Ok(Json(balance))
}

#[utoipa::path(
    delete,
    path = "/balance/{balance_id}/purchase/{purchase_id}",
    params(
        ("balance_id" = String, Path, description = "ID of the balance"),
        ("purchase_id" = String, Path, description = "ID of the purchase to delete")
    ),
    responses(
        (status = 200, description = "Purchase deleted and reversed; the updated balance document", body = Balance),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Balance or purchase not found", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_purchase(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Path((balance_id, purchase_id)): Path<(String, String)>,
) -> Result<Json<Balance>, ApiError> {
    let balance = service
        .delete_purchase(&user, &balance_id, &purchase_id)
        .await?;
    Ok(Json(balance))
}

#[utoipa::path(
    get,
    path = "/balance/{balance_id}/peers",
    params(("balance_id" = String, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "Viewer-relative balances against every other member", body = [PeerBalance]),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Balance not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_peer_balances(
    State(service): State<Arc<BalancerService<InMemoryLogging, InMemoryKv>>>,
    Extension(user): Extension<CurrentUser>,
    Path(balance_id): Path<String>,
) -> Result<Json<Vec<PeerBalance>>, ApiError> {
    let peers = service.peer_balances(&user, &balance_id).await?;
    Ok(Json(peers))
}
