pub mod admin;
pub mod auth;
pub mod election;
pub mod mongodb;
pub mod otp;
pub mod student;
pub mod vote;
