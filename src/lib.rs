pub mod db;
pub mod filter;
