/// Errors raised while building expressions, metric keys or queries.
/// Evaluating a compiled query never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum TagQueryError {
    EmptyKey,
    InvalidKey(String),
    InvalidValue(String, String),
    InvalidPattern(String, String),
    UnknownOperator(String),
    EmptyQuery,
    InvalidMetricKey(String),
    Config(String),
}

impl From<TagQueryError> for String {
    fn from(error: TagQueryError) -> Self {
        error.to_string()
    }
}

impl std::fmt::Display for TagQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagQueryError::EmptyKey => write!(f, "Tag key must not be empty"),
            TagQueryError::InvalidKey(key) => write!(f, "Invalid tag key: {}", key),
            TagQueryError::InvalidValue(key, value) => {
                write!(f, "Invalid value for tag {}: {}", key, value)
            }
            TagQueryError::InvalidPattern(pattern, err) => {
                write!(f, "Invalid pattern {}: {}", pattern, err)
            }
            TagQueryError::UnknownOperator(op) => write!(f, "Unknown operator: {}", op),
            TagQueryError::EmptyQuery => write!(f, "Query has no expressions"),
            TagQueryError::InvalidMetricKey(key) => write!(f, "Invalid metric key: {}", key),
            TagQueryError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TagQueryError {}
