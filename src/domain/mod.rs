pub mod authorizer;
pub mod feedback;
pub mod lifecycle;
pub mod presence;
pub mod role;
