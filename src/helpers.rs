/// Sets up panic handling, `.env`, logging and the Tokio runtime for a binary.
pub mod bootstrap;
pub mod join;
pub mod logging;
