use crate::expression::NAME_KEY;
use crate::metric::{split_tag, tag_value};
use crate::{EngineConfig, Expression, FilterDecision, IdTagLookup, MetricDefinition, MetricKey};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Value test of an expression, with every string and pattern resolved.
#[derive(Debug, Clone)]
pub(crate) enum ValueTest {
    Exact(String),
    Prefix(String),
    Pattern(Regex),
    Any,
}

impl ValueTest {
    fn passes(&self, value: &str) -> bool {
        match self {
            ValueTest::Exact(expected) => value == expected,
            ValueTest::Prefix(prefix) => value.starts_with(prefix.as_str()),
            ValueTest::Pattern(pattern) => pattern.is_match(value),
            ValueTest::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
enum Scan {
    /// Decided at compile time.
    Constant(FilterDecision),
    /// Tests the metric name.
    Name(ValueTest),
    /// The first tag filed under `key` decides.
    Tag { key: String, test: ValueTest },
    /// Any tag key passing the test decides.
    TagKey(ValueTest),
}

#[derive(Clone)]
enum Absent {
    Decided(FilterDecision),
    /// Ask the meta tag lookup; `fallback` applies when it has nothing under the key.
    Resolve {
        lookup: Arc<dyn IdTagLookup>,
        fallback: FilterDecision,
    },
}

/// One expression compiled against a metric definition.
///
/// Immutable and safe to share between threads evaluating different metrics.
#[derive(Clone)]
pub struct MetricDefinitionFilter {
    scan: Scan,
    negated: bool,
    absent: Absent,
}

impl MetricDefinitionFilter {
    pub fn decide(&self, id: &MetricKey, name: &str, tags: &[String]) -> FilterDecision {
        match &self.scan {
            Scan::Constant(decision) => *decision,
            Scan::Name(test) => self.orient(test.passes(name)),
            Scan::Tag { .. } | Scan::TagKey(_) => self
                .scan_tags(tags.iter().map(String::as_str))
                .unwrap_or_else(|| self.when_absent(id)),
        }
    }

    pub fn decide_definition(&self, def: &MetricDefinition) -> FilterDecision {
        self.decide(&def.id, &def.name, &def.tags)
    }

    fn orient(&self, passes: bool) -> FilterDecision {
        FilterDecision::from_bool(passes != self.negated)
    }

    fn scan_tags<'a>(&self, mut tags: impl Iterator<Item = &'a str>) -> Option<FilterDecision> {
        match &self.scan {
            Scan::Tag { key, test } => tags
                .find_map(|tag| tag_value(tag, key))
                .map(|value| self.orient(test.passes(value))),
            Scan::TagKey(test) => tags
                .any(|tag| test.passes(split_tag(tag).0))
                .then(|| self.orient(true)),
            Scan::Constant(_) | Scan::Name(_) => None,
        }
    }

    fn when_absent(&self, id: &MetricKey) -> FilterDecision {
        match &self.absent {
            Absent::Decided(decision) => *decision,
            Absent::Resolve { lookup, fallback } => {
                let meta_tags = lookup.meta_tags(id);
                self.scan_tags(meta_tags.iter().map(String::as_str))
                    .unwrap_or(*fallback)
            }
        }
    }
}

impl fmt::Debug for MetricDefinitionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let absent = match &self.absent {
            Absent::Decided(decision) => decision.to_string(),
            Absent::Resolve { fallback, .. } => format!("lookup or {}", fallback),
        };
        f.debug_struct("MetricDefinitionFilter")
            .field("scan", &self.scan)
            .field("negated", &self.negated)
            .field("absent", &absent)
            .finish()
    }
}

impl Expression {
    /// Compiles the per-metric filter for this expression.
    ///
    /// `config` is read here and only here. The lookup is kept only by
    /// negated expressions, and only with meta tag support enabled.
    pub fn metric_definition_filter(
        &self,
        config: &EngineConfig,
        lookup: Option<&Arc<dyn IdTagLookup>>,
    ) -> MetricDefinitionFilter {
        let negated = self.operator().is_negated();
        let test = self.value_test();
        let constant = |decision| MetricDefinitionFilter {
            scan: Scan::Constant(decision),
            negated: false,
            absent: Absent::Decided(decision),
        };

        match self {
            // Every metric has a name; filtering by it happens elsewhere.
            Expression::HasTag(c) if c.key == NAME_KEY => return constant(FilterDecision::Pass),
            Expression::NotHasTag(c) if c.key == NAME_KEY => {
                return constant(FilterDecision::Fail)
            }
            Expression::PrefixTag(_) | Expression::MatchTag(_) if test.passes(NAME_KEY) => {
                return constant(FilterDecision::Pass)
            }
            _ => {}
        }

        let scan = if self.operates_on_tag() {
            match self {
                Expression::HasTag(c) | Expression::NotHasTag(c) => Scan::Tag {
                    key: c.key.clone(),
                    test,
                },
                _ => Scan::TagKey(test),
            }
        } else if self.key() == NAME_KEY {
            Scan::Name(test)
        } else {
            Scan::Tag {
                key: self.key().to_string(),
                test,
            }
        };

        let absent = match (config.meta_tag_support, lookup) {
            (false, _) => Absent::Decided(self.default_decision()),
            (true, Some(lookup)) if negated => Absent::Resolve {
                lookup: Arc::clone(lookup),
                fallback: self.default_decision(),
            },
            (true, _) => Absent::Decided(FilterDecision::None),
        };

        MetricDefinitionFilter {
            scan,
            negated,
            absent,
        }
    }
}
