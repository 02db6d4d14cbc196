mod log_in;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

#[cfg(test)]
pub use log_in::TokenResponse;
pub use log_in::post_log_in;
pub use middleware::auth_guard;
pub use password::PasswordHash;
pub use register_user::register_user;
pub use token::JwtKeys;
pub use user::{User, UserID, count_users, create_user, create_user_table};
