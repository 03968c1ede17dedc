//! Conversation dispatcher
//!
//! Elm-style core: events go in, effects come out, and nothing in here does
//! I/O. The runtime executes the effects and feeds completions back as
//! events.

mod effect;
mod event;
mod transition;


pub use effect::Effect;
pub use event::Event;
pub use transition::{Banner, BannerLevel, ChatSnapshot, DispatchError, Dispatcher};

/// Answer attached to an exchange whose remote call failed
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't get a response. Please check if the backend server is running.";

/// Banner raised alongside a failed exchange
pub const ERROR_BANNER: &str =
    "Could not get a response from the assistant. Please check your backend server.";

pub const UPLOAD_SUCCESS_BANNER: &str =
    "File uploaded successfully. You can now ask questions about it.";

pub const UPLOAD_FAILURE_BANNER: &str = "An error occurred while uploading the file.";
