//! Database module
//!
//! Statement building, the pooled Postgres gateway and the entities it maps.

pub mod gateway;
pub mod models;
pub mod query;

pub use gateway::{Gateway, RowMapper, UserStore};
pub use models::{Session, Sex, User};
