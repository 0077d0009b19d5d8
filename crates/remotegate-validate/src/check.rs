use std::fmt;

use remotegate_value::Value;

/// One positional argument rule: a validator name plus extra parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSpec {
    pub validator: String,
    pub params: Vec<Value>,
}

impl CheckSpec {
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            validator: validator.into(),
            params: Vec::new(),
        }
    }

    /// Append one parameter.
    pub fn param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Append several parameters.
    pub fn params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }
}

impl From<&str> for CheckSpec {
    fn from(validator: &str) -> Self {
        Self::new(validator)
    }
}

/// Outcome of a single validator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Passed,
    Rejected,
    /// No validator is registered under the requested name.
    Unregistered,
}

impl Verdict {
    pub fn passed(self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "passed"),
            Verdict::Rejected => write!(f, "rejected"),
            Verdict::Unregistered => write!(f, "unregistered"),
        }
    }
}

/// First failing position of a positional check run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("argument {index} failed {validator}: {verdict}")]
pub struct ArgumentRejected {
    /// 1-based argument position.
    pub index: usize,
    pub validator: String,
    pub verdict: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_params_in_order() {
        let check = CheckSpec::new("isInRange").param(1).param(10);
        assert_eq!(check.params, vec![Value::from(1), Value::from(10)]);

        let same = CheckSpec::new("isInRange").params([1, 10]);
        assert_eq!(check, same);
    }

    #[test]
    fn only_passed_counts_as_passing() {
        assert!(Verdict::Passed.passed());
        assert!(!Verdict::Rejected.passed());
        assert!(!Verdict::Unregistered.passed());
    }

    #[test]
    fn rejection_message_names_position() {
        let rejected = ArgumentRejected {
            index: 2,
            validator: "isPositive".to_string(),
            verdict: Verdict::Rejected,
        };
        assert_eq!(rejected.to_string(), "argument 2 failed isPositive: rejected");
    }
}
