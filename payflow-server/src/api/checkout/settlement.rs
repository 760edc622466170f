use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use payflow_sdk::objects::{CheckoutParams, SettlementResponse};

use super::CheckoutApiError;
use crate::state::AppState;

/// `GET /checkout/settlement`: resolve the receiving address for the
/// intent's asset on its `chain`.
///
/// A pair that is not offered resolves to the asset's default network
/// and is flagged with `isDefault`.
pub(super) async fn settlement(
    state: State<AppState>,
    Query(params): Query<CheckoutParams>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let flow = state.flow().await;
    let settlement = flow.settlement(flow.restore(&params))?;

    Ok(Json(SettlementResponse {
        chain: settlement.address.chain,
        wallet_address: settlement.address.address,
        is_default: settlement.address.is_default,
        intent: settlement.intent,
    }))
}
