pub mod health;
pub mod index;
pub mod setup;
pub mod status;
