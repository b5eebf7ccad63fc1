pub mod hackathon;
pub mod hash;
pub mod jwt;
pub mod participation;
pub mod slug;
