pub mod auth;
pub mod json;
pub mod path;
pub mod query;
