pub mod sequence;
pub mod street;
pub mod user;

pub use sequence::{Sequence, STREETS_SEQUENCE_ID};
pub use street::{Street, StreetStatus};
pub use user::User;
