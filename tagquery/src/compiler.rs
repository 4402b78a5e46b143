use crate::{
    EngineConfig, Expression, FilterDecision, IdTagLookup, MetricDefinition,
    MetricDefinitionFilter, MetricKey, TagQueryError,
};
use log::{debug, trace, warn};
use std::sync::Arc;

/// Sorts expressions into canonical order and drops exact duplicates.
pub fn canonicalize(mut expressions: Vec<Expression>) -> Vec<Expression> {
    expressions.sort_by(|a, b| a.canonical_cmp(b));
    expressions.dedup_by(|a, b| {
        let duplicate = a == b;
        if duplicate {
            trace!("Dropping duplicate expression {}", a);
        }
        duplicate
    });
    expressions
}

/// Turns the expressions of an AND query into one combined filter.
#[derive(Clone, Default)]
pub struct QueryCompiler {
    config: EngineConfig,
    lookup: Option<Arc<dyn IdTagLookup>>,
}

impl QueryCompiler {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            lookup: None,
        }
    }

    /// Meta tag lookup handed to the expressions that can use it.
    pub fn with_lookup(mut self, lookup: Arc<dyn IdTagLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compile(&self, expressions: Vec<Expression>) -> Result<CompiledQuery, TagQueryError> {
        if expressions.is_empty() {
            return Err(TagQueryError::EmptyQuery);
        }
        if self.config.meta_tag_support && self.lookup.is_none() {
            warn!("Meta tag support is enabled but no tag lookup is configured");
        }

        let expressions = canonicalize(expressions);
        let filters = expressions
            .iter()
            .map(|e| e.metric_definition_filter(&self.config, self.lookup.as_ref()))
            .collect::<Vec<_>>();
        let canonical = crate::serialize::render(&expressions);
        debug!(
            "Compiled query {} into {} filters (meta tags: {})",
            canonical,
            filters.len(),
            self.config.meta_tag_support
        );

        Ok(CompiledQuery {
            expressions,
            filters,
            canonical,
        })
    }
}

/// A compiled AND query. Filters run cheapest first.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    expressions: Vec<Expression>,
    filters: Vec<MetricDefinitionFilter>,
    canonical: String,
}

impl CompiledQuery {
    /// Combined decision: the first `Fail` wins, otherwise any `None` makes
    /// the result `None`, otherwise `Pass`.
    pub fn decide(&self, id: &MetricKey, name: &str, tags: &[String]) -> FilterDecision {
        let mut result = FilterDecision::Pass;
        for filter in &self.filters {
            match filter.decide(id, name, tags) {
                FilterDecision::Fail => return FilterDecision::Fail,
                FilterDecision::None => result = FilterDecision::None,
                FilterDecision::Pass => {}
            }
        }
        result
    }

    pub fn decide_definition(&self, def: &MetricDefinition) -> FilterDecision {
        self.decide(&def.id, &def.name, &def.tags)
    }

    /// Final yes/no for callers without a meta tag resolver of their own.
    /// `None` only counts as a match failure; it is never treated as a pass.
    pub fn matches(&self, def: &MetricDefinition) -> bool {
        self.decide_definition(def) == FilterDecision::Pass
    }

    /// Definitions whose combined decision is `Pass`.
    pub fn filter<'a, I>(&'a self, defs: I) -> impl Iterator<Item = &'a MetricDefinition> + 'a
    where
        I: IntoIterator<Item = &'a MetricDefinition>,
        I::IntoIter: 'a,
    {
        defs.into_iter().filter(move |def| self.matches(def))
    }

    /// Expressions in evaluation order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Canonical query string, usable as a cache key.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operator;

    fn def(tags: &[&str]) -> MetricDefinition {
        MetricDefinition::new(MetricKey::new(1, [3; 16]), "cpu", tags)
    }

    fn query(meta: bool) -> CompiledQuery {
        QueryCompiler::new(EngineConfig::new(meta))
            .compile(vec![
                Expression::matches("dc", "eu-.*").unwrap(),
                Expression::not_equal("env", "staging").unwrap(),
                Expression::equal("host", "web01").unwrap(),
            ])
            .unwrap()
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let err = QueryCompiler::default().compile(vec![]).unwrap_err();
        assert_eq!(err, TagQueryError::EmptyQuery);
    }

    #[test]
    fn test_expressions_are_ordered_by_cost() {
        let ops: Vec<Operator> = query(false)
            .expressions()
            .iter()
            .map(|e| e.operator())
            .collect();
        assert_eq!(ops, vec![Operator::Equal, Operator::NotEqual, Operator::Match]);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let compiled = QueryCompiler::default()
            .compile(vec![
                Expression::equal("host", "web01").unwrap(),
                Expression::equal("host", "web01").unwrap(),
                Expression::not_equal("host", "web01").unwrap(),
            ])
            .unwrap();
        assert_eq!(compiled.expressions().len(), 2);
        assert_eq!(compiled.canonical(), "host=web01;host!=web01");
    }

    #[test]
    fn test_combined_decision() {
        let q = query(false);
        assert_eq!(
            q.decide_definition(&def(&["host=web01", "env=prod", "dc=eu-west"])),
            FilterDecision::Pass
        );
        assert_eq!(
            q.decide_definition(&def(&["host=web01", "env=staging", "dc=eu-west"])),
            FilterDecision::Fail
        );
        assert_eq!(
            q.decide_definition(&def(&["host=web01", "dc=us-east"])),
            FilterDecision::Fail
        );
    }

    #[test]
    fn test_none_propagates_without_fail() {
        let q = query(true);
        // dc and env absent: Match defers, NotEqual defers without a lookup.
        assert_eq!(q.decide_definition(&def(&["host=web01"])), FilterDecision::None);
        assert!(!q.matches(&def(&["host=web01"])));
        // Fail still wins over None.
        assert_eq!(q.decide_definition(&def(&["host=web02"])), FilterDecision::Fail);
    }

    #[test]
    fn test_filter_keeps_passing_definitions() {
        let defs = vec![
            def(&["host=web01", "env=prod", "dc=eu-west"]),
            def(&["host=web02", "env=prod", "dc=eu-west"]),
            def(&["host=web01", "env=prod", "dc=eu-north"]),
        ];
        let q = query(false);
        let kept: Vec<&MetricDefinition> = q.filter(&defs).collect();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|d| d.tags[0] == "host=web01"));
    }
}
