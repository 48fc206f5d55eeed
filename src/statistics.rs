pub mod basic;
pub mod detailed;
pub mod filter;
pub mod roller;
