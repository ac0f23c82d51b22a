//! Request handlers.

pub mod credential;
pub mod health;
pub mod jobs;
pub mod themes;

pub use credential::*;
pub use health::*;
pub use jobs::*;
pub use themes::*;
