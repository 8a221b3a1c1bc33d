pub mod ingredient;
pub mod pizza;
pub mod user;
