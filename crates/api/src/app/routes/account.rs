use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new()
        .route("/update", post(update))
        .route("/history", get(history))
        .route("/balances", get(balances))
        .route("/balance/:account", get(balance))
}

/// Record one transaction and return the affected account's new balance.
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Json(body): Json<dto::RecordTransactionRequest>,
) -> axum::response::Response {
    let draft = match dto::to_draft(owner.owner_id(), body, Utc::now()) {
        Ok(d) => d,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.record_transaction(draft).await {
        Ok(rec) => {
            let mut data = dto::transaction_to_json(&rec.transaction);
            data["newBalance"] = serde_json::Value::String(rec.new_balance.to_string());
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "data": data,
                })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Transaction history (newest occurred_at first) plus derived balances.
pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    let limit = query
        .limit
        .unwrap_or(dto::DEFAULT_HISTORY_LIMIT)
        .clamp(1, dto::MAX_HISTORY_LIMIT);

    match services
        .history(owner.owner_id(), query.account.as_deref(), limit)
        .await
    {
        Ok(view) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": {
                    "transactions": view.transactions.iter().map(dto::transaction_to_json).collect::<Vec<_>>(),
                    "accountBalances": dto::balances_to_json(&view.account_balances),
                    "totalBalance": view.total_balance.to_string(),
                },
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Per-account balances plus the total across all accounts, derived from a
/// single history snapshot.
pub async fn balances(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    let (by_account, total) = match services.balance_summary(owner.owner_id()).await {
        Ok(summary) => summary,
        Err(e) => return errors::service_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "accountBalances": dto::balances_to_json(&by_account),
            "totalBalance": total.to_string(),
        })),
    )
        .into_response()
}

/// Balance of a single account. Accounts are implicit (created on first
/// transaction), so an unknown name reports 0.00 rather than 404.
pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(account): Path<String>,
) -> axum::response::Response {
    match services.balance_for(owner.owner_id(), &account).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "accountName": account,
                "balance": balance.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
