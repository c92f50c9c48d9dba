pub mod feedback;
pub mod formation;
pub mod presence;
pub mod session;
pub mod user;

pub use feedback::{Feedback, FeedbackQuery, NewFeedback};
pub use formation::{Formation, NewFormation, UpdateFormation};
pub use presence::{Presence, PresenceEntry, RecordPresences};
pub use session::{NewSession, Session, UpdateSession};
pub use user::{NewUser, UpdateUser, User, UserStatus};
