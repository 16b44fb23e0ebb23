//! Social post composing and scheduling.
//!
//! The rudimentary half of ClipMill: validate a post draft against
//! per-platform content caps, and keep an in-memory queue of posts with
//! future publish times. No network calls are made from this crate;
//! actual publishing never left the drawing board.

pub mod composer;
pub mod error;
pub mod scheduler;

pub use composer::PostComposer;
pub use error::{SocialError, SocialResult};
pub use scheduler::PostScheduler;
