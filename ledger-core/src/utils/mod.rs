pub mod logger;
pub mod poll;
