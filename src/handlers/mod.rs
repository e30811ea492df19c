pub mod analytics;

pub use analytics::{
    get_property_analytics,
    get_property_insights,
    AnalyticsQuery,
    MetricsResponse,
    Period,
};
