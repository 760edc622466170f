//! Checkout API handlers.
//!
//! These endpoints back the server-rendered checkout. Every step is
//! stateless: the payment intent arrives as the flat step parameter set
//! and derived fields are recomputed on each request.
//!
//! # Endpoints
//!
//! - `GET  /assets`              – list the rate table
//! - `POST /quote`               – convert a fiat amount into a token amount
//! - `GET  /chains?token=`       – settlement networks offered for an asset
//! - `GET  /checkout`            – restore a step from its parameter set
//! - `POST /checkout/method`     – apply the payer's method selection
//! - `GET  /checkout/settlement` – resolve the receiving address

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use payflow_core::catalog::CatalogError;
use payflow_core::checkout::ValidationError;

use crate::state::AppState;

mod assets;
mod chains;
mod quote;
mod settlement;
mod step;

/// Build the Checkout API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assets", get(assets::list_assets))
        .route("/quote", post(quote::quote))
        .route("/chains", get(chains::list_chains))
        .route("/checkout", get(step::restore))
        .route("/checkout/method", post(step::select_method))
        .route("/checkout/settlement", get(settlement::settlement))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Checkout API handlers.
#[derive(Debug)]
enum CheckoutApiError {
    /// The payer's input failed validation.
    Validation(ValidationError),
    /// The next-step parameters could not be rendered as a query string.
    QueryEncoding(serde_urlencoded::ser::Error),
}

impl From<ValidationError> for CheckoutApiError {
    fn from(e: ValidationError) -> Self {
        CheckoutApiError::Validation(e)
    }
}

impl From<serde_urlencoded::ser::Error> for CheckoutApiError {
    fn from(e: serde_urlencoded::ser::Error) -> Self {
        CheckoutApiError::QueryEncoding(e)
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            CheckoutApiError::Validation(ValidationError::Catalog(
                e @ CatalogError::AssetNotOffered(_),
            )) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
            CheckoutApiError::Validation(ValidationError::Catalog(e)) => {
                tracing::error!(error = %e, "Chain catalog error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            CheckoutApiError::Validation(e) => {
                tracing::debug!(error = %e, "Rejected checkout input");
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
            }
            CheckoutApiError::QueryEncoding(e) => {
                tracing::error!(error = %e, "Failed to encode step parameters");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use payflow_core::config::SharedConfig;
    use payflow_sdk::objects::{
        AssetRate, AssetSymbol, ChainId, ChainOption, QuoteResponse, SettlementResponse,
        StepResponse,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(SharedConfig::demo()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(uri: &str) -> (StatusCode, Option<T>) {
        let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).ok())
    }

    async fn post_json<T: DeserializeOwned>(
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, Option<T>) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(request).await;
        (status, serde_json::from_slice(&body).ok())
    }

    #[tokio::test]
    async fn test_list_assets() {
        let (status, assets) = get_json::<Vec<AssetRate>>("/api/v1/assets").await;
        assert_eq!(status, StatusCode::OK);
        let assets = assets.unwrap();
        assert_eq!(assets.len(), AssetSymbol::ALL.len());
        assert!(assets.iter().any(|a| a.symbol == AssetSymbol::Btc));
    }

    #[tokio::test]
    async fn test_quote() {
        let (status, quote) = post_json::<QuoteResponse>(
            "/api/v1/quote",
            serde_json::json!({"amount": "250,000", "token": "USDT"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let quote = quote.unwrap();
        assert_eq!(quote.amount, "250000");
        assert_eq!(quote.currency, "NGN");
        assert_eq!(quote.token_amount.as_deref(), Some("333.33"));
    }

    #[tokio::test]
    async fn test_quote_rejects_invalid_amount() {
        let (status, _) = post_json::<serde_json::Value>(
            "/api/v1/quote",
            serde_json::json!({"amount": "12abc", "token": "USDT"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_chains() {
        let (status, chains) = get_json::<Vec<ChainOption>>("/api/v1/chains?token=USDT").await;
        assert_eq!(status, StatusCode::OK);
        let chains = chains.unwrap();
        let ids: Vec<ChainId> = chains.iter().map(|c| c.chain).collect();
        assert_eq!(
            ids,
            vec![
                ChainId::ETHEREUM,
                ChainId::BNB_SMART_CHAIN,
                ChainId::POLYGON,
                ChainId::Tron
            ]
        );
        assert_eq!(chains[3].display_name, "Tron");

        let (status, _) = get_json::<serde_json::Value>("/api/v1/chains?token=DOGE").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_restore_applies_defaults() {
        let (status, step) = get_json::<StepResponse>("/api/v1/checkout").await;
        assert_eq!(status, StatusCode::OK);
        let step = step.unwrap();
        assert_eq!(step.intent.fiat_amount, "250000");
        assert_eq!(step.intent.token_amount.as_deref(), Some("333.33"));
        assert_eq!(step.intent.recipient, "Demo Merchant");
        assert!(step.query.starts_with("amount=250000&token=USDT&tokenAmount=333.33"));
    }

    #[tokio::test]
    async fn test_restore_recomputes_token_amount() {
        let (_, step) =
            get_json::<StepResponse>("/api/v1/checkout?amount=750&token=USDT&tokenAmount=5")
                .await;
        assert_eq!(step.unwrap().intent.token_amount.as_deref(), Some("1.00"));
    }

    #[tokio::test]
    async fn test_restore_decodes_reserved_characters() {
        let (status, step) = get_json::<StepResponse>(
            "/api/v1/checkout?amount=1%2C500&recipient=Ada+%26+Co&wallet=",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let step = step.unwrap();
        assert_eq!(step.intent.fiat_amount, "1500");
        assert_eq!(step.intent.recipient, "Ada & Co");
        assert_eq!(step.intent.connected_address, None);
        assert!(step.query.contains("recipient=Ada+%26+Co"));

        let (status, _) =
            get_json::<serde_json::Value>("/api/v1/checkout?amount=1&amount=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_select_method() {
        let (status, step) = post_json::<StepResponse>(
            "/api/v1/checkout/method",
            serde_json::json!({"params": {"amount": "7500", "token": "USDC"}, "method": "connect-wallet"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let step = step.unwrap();
        assert_eq!(step.params.method.as_deref(), Some("connect-wallet"));
        assert!(step.query.contains("method=connect-wallet"));
        assert_eq!(step.intent.token_amount.as_deref(), Some("10.00"));

        let (status, _) = post_json::<serde_json::Value>(
            "/api/v1/checkout/method",
            serde_json::json!({"method": "disabled"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_settlement_address() {
        let (status, settlement) = get_json::<SettlementResponse>(
            "/api/v1/checkout/settlement?amount=250000&token=USDT&chain=tron",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let settlement = settlement.unwrap();
        assert_eq!(settlement.chain, ChainId::Tron);
        assert_eq!(
            settlement.wallet_address.as_str(),
            payflow_core::catalog::demo::TRON_ADDRESS
        );
        assert!(!settlement.is_default);
    }

    #[tokio::test]
    async fn test_settlement_falls_back_to_default() {
        let (_, settlement) =
            get_json::<SettlementResponse>("/api/v1/checkout/settlement?token=BTC&chain=137")
                .await;
        let settlement = settlement.unwrap();
        assert!(settlement.is_default);
        assert_eq!(settlement.chain, ChainId::Bitcoin);
        assert_eq!(settlement.intent.selected_chain, Some(ChainId::Bitcoin));
    }
}
