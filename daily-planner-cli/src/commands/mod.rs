//! CLI command implementations

pub mod fields;
pub mod quote;
pub mod send;
pub mod serve;

pub use fields::{EditCommand, ResetCommand, SetCommand, ShowCommand};
pub use quote::QuoteCommand;
pub use send::SendCommand;
pub use serve::ServeCommand;
