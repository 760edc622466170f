//! Checkout API client (checkout frontend → Payflow server).

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::{
    AssetRate, AssetSymbol, ChainId, ChainOption, CheckoutParams, PaymentMethod, QuoteRequest,
    QuoteResponse, SelectMethodRequest, SettlementResponse, StepResponse,
};

/// Typed HTTP client for the Payflow **checkout API**.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: Client,
    base_url: Url,
}

impl CheckoutClient {
    /// Create a new `CheckoutClient` for the server at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/assets` – list the rate table.
    pub async fn list_assets(&self) -> Result<Vec<AssetRate>, ClientError> {
        let url = self.base_url.join("/api/v1/assets")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/quote` – convert a fiat amount into a token amount.
    pub async fn quote(
        &self,
        amount: impl Into<String>,
        token: AssetSymbol,
    ) -> Result<QuoteResponse, ClientError> {
        let url = self.base_url.join("/api/v1/quote")?;
        let body = QuoteRequest {
            amount: amount.into(),
            token,
        };
        let resp = self.http.post(url).json(&body).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/chains?token=` – list settlement networks for an asset.
    pub async fn list_chains(&self, token: AssetSymbol) -> Result<Vec<ChainOption>, ClientError> {
        let mut url = self.base_url.join("/api/v1/chains")?;
        url.query_pairs_mut().append_pair("token", token.as_str());
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/checkout` – restore a step from its parameter set.
    pub async fn restore(&self, params: &CheckoutParams) -> Result<StepResponse, ClientError> {
        let url = self.base_url.join("/api/v1/checkout")?;
        let resp = self.http.get(url).query(params).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/checkout/method` – apply the payer's method selection.
    pub async fn select_method(
        &self,
        params: CheckoutParams,
        method: PaymentMethod,
    ) -> Result<StepResponse, ClientError> {
        let url = self.base_url.join("/api/v1/checkout/method")?;
        let body = SelectMethodRequest { params, method };
        let resp = self.http.post(url).json(&body).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/checkout/settlement` – resolve the receiving address
    /// for the intent's asset on `chain`.
    pub async fn settlement(
        &self,
        params: &CheckoutParams,
        chain: ChainId,
    ) -> Result<SettlementResponse, ClientError> {
        let params = CheckoutParams {
            chain: Some(chain.to_string()),
            ..params.clone()
        };
        let url = self.base_url.join("/api/v1/checkout/settlement")?;
        let resp = self.http.get(url).query(&params).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
