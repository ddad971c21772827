pub mod integration;
pub mod unit;
