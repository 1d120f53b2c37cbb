pub mod models;
pub mod prices;
pub mod purchase;
pub mod rules;
pub mod settlement;
pub mod users;
pub mod window;
pub mod winners;
