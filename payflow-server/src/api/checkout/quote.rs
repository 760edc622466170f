use axum::{Json, extract::State, response::IntoResponse};
use payflow_core::checkout::ValidationError;
use payflow_core::utils::amount_input::parse_fiat_amount;
use payflow_sdk::objects::{QuoteRequest, QuoteResponse};

use super::CheckoutApiError;
use crate::state::AppState;

/// `POST /quote`: convert a fiat amount into the chosen asset.
///
/// An amount that does not parse is rejected; an asset without a usable
/// rate yields `tokenAmount: null`.
pub(super) async fn quote(
    state: State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let fiat = parse_fiat_amount(&request.amount)
        .ok_or_else(|| ValidationError::InvalidAmount(request.amount.clone()))?;

    let flow = state.flow().await;
    let engine = flow.engine();
    let token_amount = match engine.convert_decimal(fiat, request.token) {
        Ok(quote) => Some(quote.display),
        Err(e) => {
            tracing::debug!(asset = %request.token, error = %e, "No token amount available");
            None
        }
    };

    Ok(Json(QuoteResponse {
        amount: fiat.to_string(),
        currency: engine.rates().fiat_code().into(),
        token: request.token,
        token_amount,
    }))
}
