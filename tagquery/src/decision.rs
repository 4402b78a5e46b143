use std::fmt;

/// Outcome of testing one expression, or a whole query, against a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDecision {
    Pass,
    Fail,
    /// Undecided: the metric's own tags are not enough to answer.
    None,
}

impl FilterDecision {
    pub fn from_bool(passes: bool) -> Self {
        if passes {
            FilterDecision::Pass
        } else {
            FilterDecision::Fail
        }
    }

    pub fn invert(self) -> Self {
        match self {
            FilterDecision::Pass => FilterDecision::Fail,
            FilterDecision::Fail => FilterDecision::Pass,
            FilterDecision::None => FilterDecision::None,
        }
    }

    /// AND-combines two decisions. `Fail` dominates, then `None`.
    pub fn and(self, other: FilterDecision) -> Self {
        match (self, other) {
            (FilterDecision::Fail, _) | (_, FilterDecision::Fail) => FilterDecision::Fail,
            (FilterDecision::None, _) | (_, FilterDecision::None) => FilterDecision::None,
            _ => FilterDecision::Pass,
        }
    }
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDecision::Pass => write!(f, "pass"),
            FilterDecision::Fail => write!(f, "fail"),
            FilterDecision::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterDecision::{self, Fail, None, Pass};

    #[test]
    fn test_and_table() {
        let cases = [
            (Pass, Pass, Pass),
            (Pass, None, None),
            (None, Pass, None),
            (None, None, None),
            (Pass, Fail, Fail),
            (Fail, None, Fail),
            (None, Fail, Fail),
            (Fail, Fail, Fail),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.and(b), expected, "{} AND {}", a, b);
        }
    }

    #[test]
    fn test_invert_keeps_none() {
        assert_eq!(Pass.invert(), Fail);
        assert_eq!(Fail.invert(), Pass);
        assert_eq!(None.invert(), None);
        assert_eq!(FilterDecision::from_bool(true), Pass);
    }
}
