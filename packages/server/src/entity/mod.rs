pub mod category;
pub mod hackathon;
pub mod participant;
pub mod participation_request;
pub mod user;
