//! Analytics module
//!
//! Read-only rollups derived from registration and feedback state.

mod service;

pub use service::{AnalyticsService, DashboardAnalytics, EventAnalytics};
