use utoipa::OpenApi;

use crate::{
    api::models::{CreateBalanceRequest, CreatePurchaseRequest, ErrorResponse},
    core::{
        models::{
            balance::{Balance, Purchase},
            user::{BalanceRef, PublicUser, User},
        },
        service::PeerBalance,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register_user,
        super::handlers::get_user,
        super::handlers::create_balance,
        super::handlers::get_balance,
        super::handlers::join_balance,
        super::handlers::create_purchase,
        super::handlers::delete_purchase,
        super::handlers::get_peer_balances
    ),
    components(schemas(
        CreateBalanceRequest,
        CreatePurchaseRequest,
        ErrorResponse,
        User,
        PublicUser,
        BalanceRef,
        Balance,
        Purchase,
        PeerBalance
    )),
    info(
        title = "Money Balancer API",
        description = "API for recording shared purchases and tracking who owes whom",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
