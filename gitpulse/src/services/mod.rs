mod analytics;

pub use analytics::{AnalyticsOutcome, AnalyticsService};
