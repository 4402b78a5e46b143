use crate::compiler::canonicalize;
use crate::expression::TAG_KEY;
use crate::Expression;
use std::fmt;

pub const EXPRESSION_SEPARATOR: char = ';';

impl Expression {
    /// Appends the canonical text of this expression, e.g. `env!=staging`.
    pub fn string_into_builder(&self, builder: &mut String) {
        match self {
            Expression::HasTag(c) | Expression::NotHasTag(c) => {
                builder.push_str(TAG_KEY);
                builder.push_str(self.operator().symbol());
                builder.push_str(&c.key);
            }
            _ => {
                builder.push_str(self.key());
                builder.push_str(self.operator().symbol());
                builder.push_str(self.value());
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.string_into_builder(&mut s);
        f.write_str(&s)
    }
}

/// Canonical query string of an expression set, independent of input order.
pub fn canonical_string(expressions: &[Expression]) -> String {
    render(&canonicalize(expressions.to_vec()))
}

/// Renders expressions already in canonical order.
pub(crate) fn render(expressions: &[Expression]) -> String {
    let mut builder = String::new();
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            builder.push(EXPRESSION_SEPARATOR);
        }
        expression.string_into_builder(&mut builder);
    }
    builder
}
