pub mod auth;
pub mod category;
pub mod hackathon;
pub mod me;
pub mod participant;
pub mod participation_request;
pub mod user;
