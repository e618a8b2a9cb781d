pub mod extractors;
pub mod payments;
