pub mod account;
pub mod common;
pub mod funding;
pub mod score;
pub mod sms;
