pub mod contact;
pub mod user;

pub use contact::{Contact, ContactPatch, NewContact};
pub use user::{NewUser, PublicUser, User};
