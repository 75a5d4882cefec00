pub mod auth;
pub mod fixture;
pub mod init;
pub mod password;
