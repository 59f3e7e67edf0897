mod client;
mod models;
mod store;

pub use client::Database;
pub use models::TableData;
pub use store::Store;
