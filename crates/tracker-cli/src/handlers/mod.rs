pub mod board;
pub mod init;
pub mod issue;
pub mod sync;
