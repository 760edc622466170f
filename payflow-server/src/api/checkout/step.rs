use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use payflow_core::checkout::CheckoutFlow;
use payflow_sdk::objects::{CheckoutParams, PaymentIntent, SelectMethodRequest, StepResponse};

use super::CheckoutApiError;
use crate::state::AppState;

/// `GET /checkout`: restore a step from its query parameters.
///
/// Missing keys take their defaults and the token amount is recomputed,
/// so a bare `GET /checkout` renders the demo checkout.
pub(super) async fn restore(
    state: State<AppState>,
    Query(params): Query<CheckoutParams>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let flow = state.flow().await;
    let intent = flow.restore(&params);
    Ok(Json(step_response(&flow, intent)?))
}

/// `POST /checkout/method`: apply the payer's method choice.
pub(super) async fn select_method(
    state: State<AppState>,
    Json(request): Json<SelectMethodRequest>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let flow = state.flow().await;
    let intent = flow.revalidate(&request.params)?;
    let intent = flow.select_method(intent, request.method)?;
    tracing::debug!(method = %request.method, asset = %intent.target_asset, "Payment method selected");
    Ok(Json(step_response(&flow, intent)?))
}

fn step_response(
    flow: &CheckoutFlow,
    intent: PaymentIntent,
) -> Result<StepResponse, CheckoutApiError> {
    let params = flow.params(&intent);
    let query = params.to_query_string()?;
    Ok(StepResponse {
        intent,
        params,
        query,
    })
}
