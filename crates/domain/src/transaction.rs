use serde::{Deserialize, Serialize};
use std::fmt;

/// Random identifier drawn once per request, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u16);

impl TransactionId {
    pub fn random() -> Self {
        Self(fastrand::u16(..))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
