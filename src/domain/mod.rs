// Domain layer - readings and their classification
pub mod classification;
pub mod error;
pub mod reading;
