pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::ShopifyAdminClient;
pub use error::ShopifyError;
pub use types::{AppSubscription, CreatedFile, StagedParameter, StagedTarget, UserError};
