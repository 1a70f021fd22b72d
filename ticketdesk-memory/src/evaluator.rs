//! Query expression evaluation for in-memory document filtering.
//!
//! Documents are matched by walking the expression tree with a [`QueryVisitor`].
//! Values are compared through [`Comparable`], which folds every numeric BSON type
//! into `f64` so that an `Int32` literal in a filter compares against an `Int64`
//! or `Double` field the way MongoDB would.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime};

use ticketdesk_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// Comparable view of a BSON value.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// All integers and floats normalized to f64
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    /// Anything without a meaningful ordering (binary, nested documents, ...)
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            _ => Comparable::Opaque,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Orders two documents by a single field for sorting.
///
/// Missing fields sort as null, and null sorts before any present value, matching
/// MongoDB's ascending order for the types the catalog stores.
pub(crate) fn compare_field(left: &Document, right: &Document, field: &str) -> Ordering {
    let left = left.get(field).map(Comparable::from).unwrap_or(Comparable::Null);
    let right = right.get(field).map(Comparable::from).unwrap_or(Comparable::Null);

    match (&left, &right) {
        (Comparable::Null, Comparable::Null) => Ordering::Equal,
        (Comparable::Null, _) => Ordering::Less,
        (_, Comparable::Null) => Ordering::Greater,
        _ => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Whether `document` satisfies `filter`. A missing filter matches everything.
    pub fn matches(document: &Bson, filter: Option<&Expr>) -> DocumentStoreResult<bool> {
        let Some(expr) = filter else {
            return Ok(true);
        };

        match document.as_document() {
            Some(doc) => DocumentEvaluator::new(doc).evaluate(expr),
            None => Err(DocumentStoreError::InvalidDocument(
                "stored value is not a document".to_string(),
            )),
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            return Ok(matches!(op, FieldOp::Ne));
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        match op {
            FieldOp::Eq => Ok(left == right),
            FieldOp::Ne => Ok(left != right),
            FieldOp::EqIgnoreCase => match (left, right) {
                (Comparable::String(left), Comparable::String(right)) => {
                    Ok(left.to_lowercase() == right.to_lowercase())
                },
                (_, Comparable::String(_)) => Ok(false),
                _ => Err(DocumentStoreError::InvalidQuery(
                    format!("case-insensitive match on '{field}' requires a string value"),
                )),
            },
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                Ok(match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    },
                    None => false,
                })
            },
            FieldOp::Contains => match (left, right) {
                (Comparable::Array(array), single_value) => Ok(
                    array
                        .iter()
                        .any(|item| item == &single_value)
                ),
                (Comparable::String(left), Comparable::String(right)) => Ok(left.contains(right)),
                _ => Ok(false),
            },
            FieldOp::AnyOf => match right {
                Comparable::Array(values) => Ok(values.iter().any(|val| val == &left)),
                _ => Err(DocumentStoreError::InvalidQuery(
                    format!("any-of match on '{field}' requires an array value"),
                )),
            },
        }
    }
}
