pub mod check;
mod command_result;
pub mod fix;
pub mod init;
pub mod list;
pub mod locate;
pub mod watch;

pub use command_result::*;
