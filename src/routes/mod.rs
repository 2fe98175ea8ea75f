mod auth;
mod health_check;
mod token;

pub use auth::{get_current_user, login, register, CurrentUserResponse, LoginRequest};
pub use health_check::health_check;
pub use token::refresh;
