//! Account handling: registration, credential checks, session issuance
//! and profile lookup.

pub mod handlers;
pub mod password;
pub mod service;
pub mod validation;

pub use service::AuthService;
