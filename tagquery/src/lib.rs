//! Tag query engine for metric definitions.
//!
//! A query is an AND of [`Expression`]s over `key=value` tags. The
//! [`QueryCompiler`] orders the expressions by cost, compiles each into a
//! [`MetricDefinitionFilter`] and fuses them into a [`CompiledQuery`] that
//! answers [`FilterDecision::Pass`], [`FilterDecision::Fail`] or
//! [`FilterDecision::None`] for every candidate metric.
pub mod compiler;
pub mod config;
pub mod decision;
pub mod errors;
pub mod expression;
pub mod filter;
pub mod lookup;
pub mod metric;
pub mod serialize;

pub use compiler::{canonicalize, CompiledQuery, QueryCompiler};
pub use config::EngineConfig;
pub use decision::FilterDecision;
pub use errors::TagQueryError;
pub use expression::{Expression, ExpressionCommon, Operator, PatternExpression};
pub use filter::MetricDefinitionFilter;
pub use lookup::{IdTagLookup, StaticTagLookup};
pub use metric::{split_tag, MetricDefinition, MetricKey};
pub use serialize::canonical_string;
