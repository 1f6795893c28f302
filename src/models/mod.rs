pub mod event;
pub mod incoming;
pub mod poll;
pub mod profile;
pub mod session;
pub mod user;

pub use event::Event;
pub use incoming::{Actor, Incoming};
pub use poll::PollRecord;
pub use profile::{NewProfile, Profile, ProfileField};
pub use session::{PreviousMessage, UserSession};
pub use user::{NewUser, User};
