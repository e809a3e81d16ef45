pub mod geodesic;
pub mod handler;
pub mod processor;
