// Environmental sensor dashboard - classification, filtering and live feed reconciliation
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
