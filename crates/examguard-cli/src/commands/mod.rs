pub mod init;
pub mod preview;
pub mod replay;
pub mod validate;
