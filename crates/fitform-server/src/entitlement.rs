//! Plan-tier entitlement lookups backed by the Shopify billing API.
//!
//! When no admin access token is configured the server runs with
//! [`EntitlementPolicy::AllowAll`], which reports unlimited allowances.

use std::sync::Arc;

use fitform_core::{PlanLimits, PlanTier};
use fitform_shopify::{ShopifyAdminClient, ShopifyError};

/// Decides how many size sets and fields a shop may create.
#[derive(Clone)]
pub enum EntitlementPolicy {
    /// No billing integration; every shop gets unlimited allowances.
    AllowAll,
    /// Resolve the shop's active subscription and map it to a plan tier.
    PerPlan(Arc<ShopifyAdminClient>),
}

impl EntitlementPolicy {
    /// Looks up the plan limits for `shop`.
    ///
    /// # Errors
    ///
    /// Propagates [`ShopifyError`] when the subscription lookup fails.
    /// Callers decide whether to fail open or reject the request.
    pub async fn limits_for(&self, shop: &str) -> Result<PlanLimits, ShopifyError> {
        match self {
            EntitlementPolicy::AllowAll => Ok(PlanLimits {
                max_sets: None,
                max_fields_per_set: None,
            }),
            EntitlementPolicy::PerPlan(client) => {
                let plan = client.active_subscription_plan(shop).await?;
                Ok(PlanTier::from_subscription_name(plan.as_deref()).limits())
            }
        }
    }
}
