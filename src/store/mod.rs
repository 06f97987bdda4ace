pub mod error;
pub mod extract;
pub mod loader;
pub mod schema;
pub mod writer;
