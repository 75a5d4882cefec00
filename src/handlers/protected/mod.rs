pub mod actions;
pub mod cases;
pub mod user;
pub mod utils;
