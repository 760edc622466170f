use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use payflow_sdk::objects::{ChainOption, ChainsQuery};

use crate::state::AppState;

/// `GET /chains?token=`: settlement networks offered for an asset.
///
/// Returns one entry per network with the address that receives the asset
/// there. An asset no network accepts yields an empty list.
pub(super) async fn list_chains(
    state: State<AppState>,
    Query(query): Query<ChainsQuery>,
) -> impl IntoResponse {
    let catalog = state.config.catalog.read().await;
    let options: Vec<ChainOption> = catalog
        .chains_for(query.token)
        .filter_map(|chain| {
            let address = catalog.address(query.token, chain.chain_id)?;
            Some(ChainOption {
                chain: chain.chain_id,
                display_name: chain.display_name.clone(),
                family: chain.family(),
                wallet_address: address.clone(),
            })
        })
        .collect();
    drop(catalog);
    Json(options)
}
