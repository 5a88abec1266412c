//! Significance verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional significance threshold
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Outcome of comparing a p-value with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    RejectNull,
    FailToRejectNull,
}

impl Conclusion {
    pub fn text(&self) -> &'static str {
        match self {
            Conclusion::RejectNull => "Reject H0",
            Conclusion::FailToRejectNull => "Fail to reject H0",
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Conclusion::RejectNull)
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Reject H0 iff `p_value < alpha` (strictly)
pub fn interpret(p_value: f64, alpha: f64) -> Conclusion {
    if p_value < alpha {
        Conclusion::RejectNull
    } else {
        Conclusion::FailToRejectNull
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(interpret(0.0499, DEFAULT_ALPHA), Conclusion::RejectNull);
        assert_eq!(interpret(0.05, DEFAULT_ALPHA), Conclusion::FailToRejectNull);
        assert_eq!(interpret(0.9, DEFAULT_ALPHA), Conclusion::FailToRejectNull);
    }

    #[test]
    fn test_conclusion_text() {
        assert_eq!(Conclusion::RejectNull.to_string(), "Reject H0");
        assert_eq!(Conclusion::FailToRejectNull.to_string(), "Fail to reject H0");
        assert!(interpret(0.001, 0.01).is_significant());
    }
}
