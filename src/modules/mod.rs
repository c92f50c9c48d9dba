pub mod feedback;
pub mod formations;
pub mod presences;
pub mod sessions;
pub mod users;
