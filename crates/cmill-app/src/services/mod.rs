//! Business logic services.

pub mod account;
pub mod videos;

pub use account::AccountService;
pub use videos::VideoService;
