pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod record;
pub mod transform;
pub mod validate;
