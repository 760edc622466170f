use axum::{Json, extract::State, response::IntoResponse};
use payflow_sdk::objects::AssetRate;

use crate::state::AppState;

/// `GET /assets`: list the USD price of every asset with a rate.
pub(super) async fn list_assets(state: State<AppState>) -> impl IntoResponse {
    let rates = state.config.rates.read().await;
    let assets: Vec<AssetRate> = rates
        .entries()
        .into_iter()
        .map(|entry| AssetRate {
            symbol: entry.asset,
            usd_price: entry.usd_price,
        })
        .collect();
    drop(rates);
    Json(assets)
}
