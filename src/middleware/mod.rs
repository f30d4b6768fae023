pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use extract::{ValidJson, ValidQuery};
pub use response::{ApiResponse, ApiResult};
