pub mod api_utils;
pub mod http;
pub mod icons;
pub mod incident_counts;
pub mod notifications;
