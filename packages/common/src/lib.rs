pub mod participation_status;
pub mod user_role;

pub use participation_status::{ParseStatusError, ParticipationStatus};
pub use user_role::UserRole;
