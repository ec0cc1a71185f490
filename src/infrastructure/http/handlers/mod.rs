//! HTTP Handlers

mod index;
mod phone;
mod ping;
mod qr;

pub use index::index;
pub use phone::{check_password, resend_code, send_code, sign_in};
pub use ping::ping;
pub use qr::{qr_check, qr_login};
