mod admin_auth;
mod request_logger;

pub use admin_auth::{authorize, passwords_match, AdminGuard};
pub use request_logger::{RequestLogger, REQUEST_ID_HEADER};
