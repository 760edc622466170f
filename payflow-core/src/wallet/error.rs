use payflow_sdk::objects::{ChainId, NetworkFamily};
use thiserror::Error;

use super::orchestrator::ConnectionState;
use super::provider::ProviderError;
use crate::catalog::display_name;

/// Why a connection attempt did not produce a connected wallet.
///
/// None of these are fatal to the checkout session; the payer can always
/// go back to method selection and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The user declined the request in the wallet (code 4001).
    #[error("connection request rejected by the user")]
    Rejected,

    /// The wallet does not know the requested network (code 4902).
    #[error("chain {0} has not been added to the wallet")]
    ChainNotAdded(ChainId),

    /// The target network cannot be reached through an injected provider.
    #[error("{0} networks cannot be connected through a browser wallet")]
    UnsupportedNetwork(NetworkFamily),

    #[error("no wallet provider detected")]
    NoProvider,

    /// Another attempt is still awaiting the modal or the direct request.
    #[error("a connection attempt is already in progress")]
    AttemptInProgress,

    #[error("connection attempt cancelled")]
    Cancelled,

    #[error("wallet connection failed (code {code:?}): {message}")]
    Unknown { code: Option<i64>, message: String },
}

impl ConnectionError {
    /// Classify a provider rejection by its error code.
    pub fn classify(error: ProviderError, requested: ChainId) -> Self {
        match error.code {
            Some(ProviderError::USER_REJECTED) => ConnectionError::Rejected,
            Some(ProviderError::UNRECOGNIZED_CHAIN) => ConnectionError::ChainNotAdded(requested),
            code => ConnectionError::Unknown {
                code,
                message: error.message,
            },
        }
    }

    /// The state an attempt ends in when it fails with this error.
    ///
    /// `None` for [`ConnectionError::AttemptInProgress`], which never
    /// touches the running attempt.
    pub fn state(&self) -> Option<ConnectionState> {
        match self {
            ConnectionError::Rejected => Some(ConnectionState::Rejected),
            ConnectionError::ChainNotAdded(_) | ConnectionError::UnsupportedNetwork(_) => {
                Some(ConnectionState::UnsupportedChainType)
            }
            ConnectionError::NoProvider => Some(ConnectionState::NoProvider),
            ConnectionError::AttemptInProgress => None,
            ConnectionError::Cancelled => Some(ConnectionState::Idle),
            ConnectionError::Unknown { .. } => Some(ConnectionState::Failed),
        }
    }

    /// Plain-language text shown to the payer.
    pub fn user_message(&self) -> String {
        match self {
            ConnectionError::Rejected => {
                "The connection request was rejected in your wallet. Please try again.".to_owned()
            }
            ConnectionError::ChainNotAdded(chain) => format!(
                "{} must be added to your wallet before you can connect. Add the network and try again.",
                display_name(*chain)
            ),
            ConnectionError::UnsupportedNetwork(family) => unsupported_network_message(*family),
            ConnectionError::NoProvider => "No browser wallet was detected. Install a wallet extension such as MetaMask, or choose another payment method.".to_owned(),
            ConnectionError::AttemptInProgress => "A wallet connection is already in progress. Finish it in your wallet or wait a moment.".to_owned(),
            ConnectionError::Cancelled => "The connection attempt was cancelled.".to_owned(),
            ConnectionError::Unknown { .. } => "The wallet could not be connected. Check the browser console for details and try again.".to_owned(),
        }
    }
}

fn unsupported_network_message(family: NetworkFamily) -> String {
    let wallets = match family {
        NetworkFamily::Tron => "TronLink or an exchange account",
        NetworkFamily::Solana => "Phantom, Solflare or an exchange account",
        NetworkFamily::Bitcoin => "any Bitcoin wallet or an exchange account",
        NetworkFamily::Evm => "your wallet",
    };
    let network = match family {
        NetworkFamily::Tron => "Tron",
        NetworkFamily::Solana => "Solana",
        NetworkFamily::Bitcoin => "Bitcoin",
        NetworkFamily::Evm => "This network",
    };
    format!(
        "{network} payments cannot be made through a browser wallet connection. \
         Send the amount from {wallets} to the address shown instead."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_code() {
        assert_eq!(
            ConnectionError::classify(ProviderError::new(4001, "User rejected"), ChainId::ETHEREUM),
            ConnectionError::Rejected
        );
        assert_eq!(
            ConnectionError::classify(ProviderError::new(4902, "Unrecognized"), ChainId::BASE),
            ConnectionError::ChainNotAdded(ChainId::BASE)
        );
        assert_eq!(
            ConnectionError::classify(ProviderError::new(-32603, "Internal"), ChainId::ETHEREUM),
            ConnectionError::Unknown {
                code: Some(-32603),
                message: "Internal".to_owned()
            }
        );
    }

    #[test]
    fn test_shapeless_rejection_is_unknown() {
        let error = ProviderError::from_value(&serde_json::json!({"reason": "nope"}));
        assert!(matches!(
            ConnectionError::classify(error, ChainId::ETHEREUM),
            ConnectionError::Unknown { code: None, .. }
        ));
    }

    #[test]
    fn test_failure_states() {
        assert_eq!(
            ConnectionError::ChainNotAdded(ChainId::POLYGON).state(),
            Some(ConnectionState::UnsupportedChainType)
        );
        assert_eq!(
            ConnectionError::Cancelled.state(),
            Some(ConnectionState::Idle)
        );
        assert_eq!(ConnectionError::AttemptInProgress.state(), None);
    }

    #[test]
    fn test_user_messages() {
        assert!(ConnectionError::Rejected.user_message().contains("try again"));
        assert!(
            ConnectionError::ChainNotAdded(ChainId::POLYGON)
                .user_message()
                .starts_with("Polygon")
        );
        let tron = ConnectionError::UnsupportedNetwork(NetworkFamily::Tron).user_message();
        assert!(tron.starts_with("Tron payments"));
        assert!(tron.contains("TronLink"));
        assert!(
            ConnectionError::Unknown {
                code: None,
                message: String::new()
            }
            .user_message()
            .contains("console")
        );
    }
}
