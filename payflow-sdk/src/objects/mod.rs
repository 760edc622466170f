pub mod assets;
pub mod blockchains;
pub mod checkout;
pub mod intent;

pub use assets::AssetSymbol;
pub use blockchains::{Address, ChainId, NetworkFamily};
pub use checkout::*;
pub use intent::{CheckoutParams, PaymentIntent, PaymentMethod};
