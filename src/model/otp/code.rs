use std::fmt::{self, Display, Formatter};

use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Number of digits in a one-time code.
pub const LENGTH: usize = 6;

/// A one-time login code, compared digit-for-digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Generate a random code.
    pub fn random() -> Self {
        let digit_dist = Uniform::from(0..=9u8);
        let mut rng = rand::thread_rng();
        let code = (0..LENGTH)
            .map(|_| char::from(b'0' + digit_dist.sample(&mut rng)))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = Code::random();
            assert_eq!(code.as_str().len(), LENGTH);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }
}
