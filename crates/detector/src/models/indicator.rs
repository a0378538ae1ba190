//! Tri-state health/context indicator

use std::fmt;

/// The visible indicator derived from backend health and the active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Red,
    Yellow,
    Green,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Red => "red",
            Indicator::Yellow => "yellow",
            Indicator::Green => "green",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
