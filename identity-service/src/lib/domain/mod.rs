pub mod access;
pub mod account;
