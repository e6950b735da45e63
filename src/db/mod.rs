mod connection;
mod schema;

pub use connection::*;
pub use schema::*;
