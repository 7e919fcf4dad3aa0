//! Typed OData query construction.
//!
//! Field names are compile-time constants; only literals carry runtime
//! data, and they are always quoted and escaped on serialization.

use crate::window::backend_date;
use chrono::NaiveDate;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Guid(Uuid),
    Text(String),
    Bool(bool),
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    pub fn date(date: NaiveDate) -> Self {
        Literal::Text(backend_date(date))
    }

    pub fn empty() -> Self {
        Literal::Text(String::new())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Guid(id) => write!(f, "guid'{id}'"),
            Literal::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Literal::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Ge,
    Le,
}

impl Comparison {
    fn as_str(self) -> &'static str {
        match self {
            Comparison::Eq => "eq",
            Comparison::Ne => "ne",
            Comparison::Ge => "ge",
            Comparison::Le => "le",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Compare {
        field: &'static str,
        op: Comparison,
        value: Literal,
    },
    AnyOf(Vec<Clause>),
    All(Vec<Clause>),
}

impl Clause {
    fn compare(field: &'static str, op: Comparison, value: Literal) -> Self {
        Clause::Compare { field, op, value }
    }

    pub fn eq(field: &'static str, value: Literal) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    pub fn ne(field: &'static str, value: Literal) -> Self {
        Self::compare(field, Comparison::Ne, value)
    }

    pub fn ge(field: &'static str, value: Literal) -> Self {
        Self::compare(field, Comparison::Ge, value)
    }

    pub fn le(field: &'static str, value: Literal) -> Self {
        Self::compare(field, Comparison::Le, value)
    }

    pub fn any_of(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Clause::AnyOf(clauses.into_iter().collect())
    }

    pub fn all(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Clause::All(clauses.into_iter().collect())
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, clauses: &[Clause], joiner: &str) -> fmt::Result {
        if let [single] = clauses {
            return write!(f, "{single}");
        }
        f.write_str("(")?;
        for (index, clause) in clauses.iter().enumerate() {
            if index > 0 {
                write!(f, " {joiner} ")?;
            }
            write!(f, "{clause}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Compare { field, op, value } => write!(f, "{field} {} {value}", op.as_str()),
            Clause::AnyOf(clauses) => Self::write_joined(f, clauses, "or"),
            Clause::All(clauses) => Self::write_joined(f, clauses, "and"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// `$filter` clauses are and-joined at the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    filter: Vec<Clause>,
    select: Vec<&'static str>,
    expand: Vec<&'static str>,
    order_by: Option<(&'static str, SortOrder)>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        match clause {
            Clause::All(clauses) => self.filter.extend(clauses),
            Clause::AnyOf(ref clauses) if clauses.is_empty() => {}
            other => self.filter.push(other),
        }
        self
    }

    pub fn select(mut self, fields: &[&'static str]) -> Self {
        self.select.extend_from_slice(fields);
        self
    }

    pub fn expand(mut self, paths: &[&'static str]) -> Self {
        self.expand.extend_from_slice(paths);
        self
    }

    pub fn order_by_desc(mut self, field: &'static str) -> Self {
        self.order_by = Some((field, SortOrder::Desc));
        self
    }

    pub fn order_by_asc(mut self, field: &'static str) -> Self {
        self.order_by = Some((field, SortOrder::Asc));
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.filter
    }

    pub fn filter_expression(&self) -> Option<String> {
        if self.filter.is_empty() {
            return None;
        }
        Some(
            self.filter
                .iter()
                .map(Clause::to_string)
                .collect::<Vec<_>>()
                .join(" and "),
        )
    }

    /// Query-string pairs, leaving out empty options.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if !self.expand.is_empty() {
            params.push(("$expand", self.expand.join(",")));
        }
        if let Some(filter) = self.filter_expression() {
            params.push(("$filter", filter));
        }
        if !self.select.is_empty() {
            params.push(("$select", self.select.join(",")));
        }
        if let Some((field, order)) = self.order_by {
            let direction = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            params.push(("$orderby", format!("{field} {direction}")));
        }
        params
    }
}
