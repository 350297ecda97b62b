pub mod catalog;
pub mod evaluation;
pub mod store;
