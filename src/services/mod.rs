pub mod aggregator;
pub mod posthog;

pub use aggregator::{aggregate_basic, aggregate_insights, BasicMetrics, PropertyInsights};
pub use posthog::{FetchError, PostHogClient};
