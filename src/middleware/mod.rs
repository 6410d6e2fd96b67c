pub mod auth;
pub mod response;
pub mod validate;

pub use auth::{require_auth, AuthUser};
pub use response::{ApiResponse, ApiResult, ListBody};
pub use validate::ValidatedJson;
