pub mod auth_service;
pub mod contact_service;
pub mod validation;

pub use auth_service::{AuthError, AuthService, AuthSession, Credentials};
pub use contact_service::{ContactError, ContactService};
pub use validation::ValidationError;
