pub mod client;
pub mod driver;
pub mod error;
pub mod page;
pub mod render;
pub mod resolver;
pub mod session;
pub mod types;

pub use client::ConfigClient;
pub use error::WidgetError;
pub use page::{ControlKind, ControlSnapshot, FormSnapshot, PageSnapshot};
pub use render::{InsertPoint, RenderedWidget, Viewport};
pub use resolver::resolve_variant_key;
pub use session::{
    CartProperty, Effect, SessionState, SubmitDecision, TickOutcome, WidgetSession,
};
pub use types::{ConfigResponse, DesignConfig, FieldConfig, SizeSetConfig};
