//! User accounts and bearer token authentication.

mod forgot_password;
mod log_in;
mod middleware;
mod password;
mod profile;
mod sign_up;
mod token;
mod user;
mod verify;

pub use forgot_password::{forgot_password, reset_password};
pub use log_in::log_in;
pub use middleware::{AuthState, auth_guard};
pub use password::PasswordHash;
pub(crate) use profile::non_blank;
pub use profile::{MAX_PROFILE_PICTURE_LENGTH, change_password, update_profile_endpoint};
pub use sign_up::{AuthResponse, sign_up};
pub use token::{Claims, decode_token, encode_token};
pub use user::{User, UserID, create_user_table};
pub use verify::verify;
