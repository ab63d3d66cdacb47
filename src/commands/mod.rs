//! Commands Layer
//!
//! Request handlers that sit between a client and the repositories.
//! Every handler returns `Result<T, String>` where the error is the message
//! to show the end user.

mod board_cmd;
mod section_cmd;
mod task_cmd;
mod status_cmd;

pub use board_cmd::*;
pub use section_cmd::*;
pub use task_cmd::*;
pub use status_cmd::*;

use crate::domain::DomainError;

/// Log a failed action and turn it into a user-facing message
fn user_error(action: &str, err: DomainError) -> String {
    if err.is_retryable() {
        log::warn!("{} failed, user asked to retry: {}", action, err);
    } else {
        log::error!("{} failed: {}", action, err);
    }
    err.user_message()
}

#[cfg(test)]
mod tests;
