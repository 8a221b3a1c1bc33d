pub mod auth;
pub mod ingredients;
pub mod pizzas;
