pub mod init;
pub mod play;
pub mod question;
pub mod serve;
pub mod theories;
