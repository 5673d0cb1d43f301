// Application layer - history, filtering, pagination and feed reconciliation
pub mod dashboard_view;
pub mod feed_reconciler;
pub mod filter;
pub mod history_store;
pub mod paginator;
pub mod reading_source;
pub mod session;
