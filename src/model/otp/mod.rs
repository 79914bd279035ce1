mod challenge;
mod code;

pub use challenge::{Challenge, CHALLENGE_COOKIE};
pub use code::Code;
