use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of trailing characters left readable when a value is masked.
const VISIBLE_TAIL: usize = 3;

/// A wrapper for customer contact details (phone numbers, names) that keeps
/// them out of log output. Debug and Display only reveal the last few
/// characters; serialization passes the real value through so API responses
/// and gateway payloads still carry it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> Masked<T> {
    fn redacted(&self) -> String {
        let raw = self.0.to_string();
        let count = raw.chars().count();
        if count <= VISIBLE_TAIL {
            return "*".repeat(count);
        }
        let tail: String = raw.chars().skip(count - VISIBLE_TAIL).collect();
        format!("{}{}", "*".repeat(count - VISIBLE_TAIL), tail)
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn inner(&self) -> &T {
        &self.0
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Masked(value.to_string())
    }
}
