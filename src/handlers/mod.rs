//! Command Handlers module
//!
//! Command handlers that orchestrate the mutating operations of the
//! registration lifecycle. Each handler owns exactly one atomic step.

mod checkin_handler;
mod commands;
mod feedback_handler;
mod register_handler;


pub use checkin_handler::CheckInHandler;
pub use commands::*;
pub use feedback_handler::FeedbackHandler;
pub use register_handler::RegisterHandler;
