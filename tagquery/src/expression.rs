use crate::filter::ValueTest;
use crate::{FilterDecision, TagQueryError};
use regex::Regex;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Pseudo key used by the expressions that test tag keys rather than values.
pub const TAG_KEY: &str = "__tag";
/// Reserved key addressing the metric name instead of a tag.
pub const NAME_KEY: &str = "name";

const INVALID_KEY_CHARS: &[char] = &[';', '!', '^', '=', '~'];

/// Identifies an expression variant. The declaration order is the tie
/// breaker of the canonical ordering, so never reorder existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Operator {
    Equal,
    NotEqual,
    Prefix,
    NotPrefix,
    Match,
    NotMatch,
    HasTag,
    NotHasTag,
    PrefixTag,
    MatchTag,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal | Operator::HasTag => "=",
            Operator::NotEqual | Operator::NotHasTag => "!=",
            Operator::Prefix | Operator::PrefixTag => "^=",
            Operator::NotPrefix => "!^=",
            Operator::Match | Operator::MatchTag => "=~",
            Operator::NotMatch => "!=~",
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::NotEqual | Operator::NotPrefix | Operator::NotMatch | Operator::NotHasTag
        )
    }

    /// True when the operator tests tag keys rather than a key's value.
    pub fn operates_on_tag(&self) -> bool {
        matches!(
            self,
            Operator::HasTag | Operator::NotHasTag | Operator::PrefixTag | Operator::MatchTag
        )
    }

    /// Relative evaluation cost. Only used to order a query's expressions.
    pub fn cost_multiplier(&self) -> u32 {
        match self {
            Operator::Equal => 1,
            Operator::NotEqual | Operator::HasTag | Operator::NotHasTag | Operator::Prefix => 2,
            Operator::NotPrefix | Operator::PrefixTag => 3,
            Operator::Match | Operator::NotMatch | Operator::MatchTag => 10,
        }
    }
}

impl FromStr for Operator {
    type Err = TagQueryError;

    /// Maps an operator token to the value operator it stands for. The tag
    /// key operators share these tokens and are selected by `Expression::new`
    /// when the key is `__tag`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "==" {
            return Ok(Operator::Equal);
        }
        Operator::iter()
            .filter(|op| !op.operates_on_tag())
            .find(|op| op.symbol() == s)
            .ok_or_else(|| TagQueryError::UnknownOperator(s.to_string()))
    }
}

/// State shared by every expression variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionCommon {
    pub(crate) key: String,
    pub(crate) value: String,
}

impl ExpressionCommon {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An expression whose value is a regular expression, compiled once when
/// the expression is built.
#[derive(Debug, Clone)]
pub struct PatternExpression {
    pub(crate) common: ExpressionCommon,
    pub(crate) pattern: Regex,
}

impl PatternExpression {
    fn new(key: String, value: &str) -> Result<Self, TagQueryError> {
        if value.contains(';') {
            return Err(TagQueryError::InvalidValue(key, value.to_string()));
        }
        // Patterns are anchored at the start of the value.
        let anchored = if value.starts_with('^') {
            value.to_string()
        } else {
            format!("^(?:{})", value)
        };
        let pattern = Regex::new(&anchored)
            .map_err(|e| TagQueryError::InvalidPattern(value.to_string(), e.to_string()))?;
        Ok(Self {
            common: ExpressionCommon {
                key,
                value: value.to_string(),
            },
            pattern,
        })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// One condition of an AND tag query.
#[derive(Debug, Clone)]
pub enum Expression {
    /// `key=value`
    Equal(ExpressionCommon),
    /// `key!=value`
    NotEqual(ExpressionCommon),
    /// `key^=value`
    Prefix(ExpressionCommon),
    /// `key!^=value`
    NotPrefix(ExpressionCommon),
    /// `key=~pattern`
    Match(PatternExpression),
    /// `key!=~pattern`
    NotMatch(PatternExpression),
    /// The metric has a tag named `key`.
    HasTag(ExpressionCommon),
    /// The metric has no tag named `key`.
    NotHasTag(ExpressionCommon),
    /// Some tag key starts with `value`.
    PrefixTag(ExpressionCommon),
    /// Some tag key matches `value`.
    MatchTag(PatternExpression),
}

impl Expression {
    /// Builds an expression from an already split `key op value` triple.
    /// With the `__tag` key, `=`, `!=`, `^=` and `=~` select the tag key
    /// operators and `value` names the tag, prefix or pattern.
    pub fn new(key: &str, op: &str, value: &str) -> Result<Self, TagQueryError> {
        let op = Operator::from_str(op)?;
        if key == TAG_KEY {
            return match op {
                Operator::Equal => Self::has_tag(value),
                Operator::NotEqual => Self::not_has_tag(value),
                Operator::Prefix => Self::prefix_tag(value),
                Operator::Match => Self::match_tag(value),
                other => Err(TagQueryError::UnknownOperator(format!(
                    "{}{}",
                    TAG_KEY,
                    other.symbol()
                ))),
            };
        }
        match op {
            Operator::Equal => Self::equal(key, value),
            Operator::NotEqual => Self::not_equal(key, value),
            Operator::Prefix => Self::prefix(key, value),
            Operator::NotPrefix => Self::not_prefix(key, value),
            Operator::Match => Self::matches(key, value),
            Operator::NotMatch => Self::not_matches(key, value),
            // from_str never yields the tag key operators
            other => Err(TagQueryError::UnknownOperator(other.symbol().to_string())),
        }
    }

    pub fn equal(key: &str, value: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::Equal(literal(key, value)?))
    }

    pub fn not_equal(key: &str, value: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::NotEqual(literal(key, value)?))
    }

    pub fn prefix(key: &str, value: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::Prefix(literal(key, value)?))
    }

    pub fn not_prefix(key: &str, value: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::NotPrefix(literal(key, value)?))
    }

    pub fn matches(key: &str, pattern: &str) -> Result<Self, TagQueryError> {
        let key = validate_key(key)?;
        Ok(Expression::Match(PatternExpression::new(key, pattern)?))
    }

    pub fn not_matches(key: &str, pattern: &str) -> Result<Self, TagQueryError> {
        let key = validate_key(key)?;
        Ok(Expression::NotMatch(PatternExpression::new(key, pattern)?))
    }

    pub fn has_tag(key: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::HasTag(ExpressionCommon {
            key: validate_key(key)?,
            value: String::new(),
        }))
    }

    pub fn not_has_tag(key: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::NotHasTag(ExpressionCommon {
            key: validate_key(key)?,
            value: String::new(),
        }))
    }

    pub fn prefix_tag(prefix: &str) -> Result<Self, TagQueryError> {
        if prefix.contains(INVALID_KEY_CHARS) {
            return Err(TagQueryError::InvalidValue(
                TAG_KEY.to_string(),
                prefix.to_string(),
            ));
        }
        Ok(Expression::PrefixTag(ExpressionCommon {
            key: TAG_KEY.to_string(),
            value: prefix.to_string(),
        }))
    }

    pub fn match_tag(pattern: &str) -> Result<Self, TagQueryError> {
        Ok(Expression::MatchTag(PatternExpression::new(
            TAG_KEY.to_string(),
            pattern,
        )?))
    }

    pub fn common(&self) -> &ExpressionCommon {
        match self {
            Expression::Equal(c)
            | Expression::NotEqual(c)
            | Expression::Prefix(c)
            | Expression::NotPrefix(c)
            | Expression::HasTag(c)
            | Expression::NotHasTag(c)
            | Expression::PrefixTag(c) => c,
            Expression::Match(p) | Expression::NotMatch(p) | Expression::MatchTag(p) => &p.common,
        }
    }

    pub fn key(&self) -> &str {
        &self.common().key
    }

    pub fn value(&self) -> &str {
        &self.common().value
    }

    pub fn operator(&self) -> Operator {
        match self {
            Expression::Equal(_) => Operator::Equal,
            Expression::NotEqual(_) => Operator::NotEqual,
            Expression::Prefix(_) => Operator::Prefix,
            Expression::NotPrefix(_) => Operator::NotPrefix,
            Expression::Match(_) => Operator::Match,
            Expression::NotMatch(_) => Operator::NotMatch,
            Expression::HasTag(_) => Operator::HasTag,
            Expression::NotHasTag(_) => Operator::NotHasTag,
            Expression::PrefixTag(_) => Operator::PrefixTag,
            Expression::MatchTag(_) => Operator::MatchTag,
        }
    }

    /// Decision for a metric without any tag under this expression's key,
    /// when meta tags are not taken into account.
    pub fn default_decision(&self) -> FilterDecision {
        if self.operator().is_negated() {
            FilterDecision::Pass
        } else {
            FilterDecision::Fail
        }
    }

    pub fn cost_multiplier(&self) -> u32 {
        self.operator().cost_multiplier()
    }

    pub fn operates_on_tag(&self) -> bool {
        self.operator().operates_on_tag()
    }

    /// Tests a single candidate without a metric, e.g. to enumerate the
    /// values (or, for tag key expressions, the tag keys) a query accepts.
    pub fn value_passes(&self, value: &str) -> bool {
        match self {
            Expression::Equal(c) => value == c.value,
            Expression::NotEqual(c) => value != c.value,
            Expression::Prefix(c) | Expression::PrefixTag(c) => value.starts_with(&c.value),
            Expression::NotPrefix(c) => !value.starts_with(&c.value),
            Expression::Match(p) | Expression::MatchTag(p) => p.pattern.is_match(value),
            Expression::NotMatch(p) => !p.pattern.is_match(value),
            Expression::HasTag(c) => value == c.key,
            Expression::NotHasTag(c) => value != c.key,
        }
    }

    /// The test applied to a tag value (or tag key), without negation.
    pub(crate) fn value_test(&self) -> ValueTest {
        match self {
            Expression::Equal(c) | Expression::NotEqual(c) => ValueTest::Exact(c.value.clone()),
            Expression::Prefix(c) | Expression::NotPrefix(c) | Expression::PrefixTag(c) => {
                ValueTest::Prefix(c.value.clone())
            }
            Expression::Match(p) | Expression::NotMatch(p) | Expression::MatchTag(p) => {
                ValueTest::Pattern(p.pattern.clone())
            }
            Expression::HasTag(_) | Expression::NotHasTag(_) => ValueTest::Any,
        }
    }

    /// Ordering used for compilation and serialization: cost, then operator,
    /// key and value.
    pub fn canonical_cmp(&self, other: &Expression) -> Ordering {
        self.cost_multiplier()
            .cmp(&other.cost_multiplier())
            .then_with(|| self.operator().cmp(&other.operator()))
            .then_with(|| self.key().cmp(other.key()))
            .then_with(|| self.value().cmp(other.value()))
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.operator() == other.operator() && self.common() == other.common()
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator().hash(state);
        self.common().hash(state);
    }
}

fn validate_key(key: &str) -> Result<String, TagQueryError> {
    if key.is_empty() {
        return Err(TagQueryError::EmptyKey);
    }
    if key == TAG_KEY || key.contains(INVALID_KEY_CHARS) {
        return Err(TagQueryError::InvalidKey(key.to_string()));
    }
    Ok(key.to_string())
}

fn literal(key: &str, value: &str) -> Result<ExpressionCommon, TagQueryError> {
    let key = validate_key(key)?;
    // A leading `~` would render like the pattern operators.
    if value.contains(';') || value.starts_with('~') {
        return Err(TagQueryError::InvalidValue(key, value.to_string()));
    }
    Ok(ExpressionCommon {
        key,
        value: value.to_string(),
    })
}
