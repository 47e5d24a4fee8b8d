//! Route handlers for the staff directory and recovery API.

pub mod health;
pub mod recovery;
pub mod root;
pub mod staff;
pub mod welcome;
