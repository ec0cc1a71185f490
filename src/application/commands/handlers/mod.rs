//! Login Command Handlers

mod phone_handlers;
mod qr_handlers;

pub use phone_handlers::{
    CheckPasswordHandler, CompleteSignInHandler, ResendCodeHandler, StartPhoneLoginHandler,
};
pub use qr_handlers::{PollQrLoginHandler, StartQrLoginHandler};
