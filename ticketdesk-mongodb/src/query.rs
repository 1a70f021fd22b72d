//! Query translation from the ticketdesk query AST to MongoDB filter documents.

use bson::{Document, Bson, doc};

use ticketdesk_core::{
    query::{QueryVisitor, Expr, FieldOp, Sort, SortDirection},
    error::DocumentStoreError,
};


/// Translates query expressions into MongoDB filter documents.
///
/// String operators are compiled to `$regex` with the user text escaped, so a category
/// such as `C++` or `.*` only ever matches itself.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Filter document for an optional expression; `None` selects every document.
    pub(crate) fn filter(expr: Option<&Expr>) -> Result<Document, DocumentStoreError> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }

    /// Sort specification preserving key order, or `None` when unsorted.
    pub(crate) fn sort(keys: &[Sort]) -> Option<Document> {
        if keys.is_empty() {
            return None;
        }

        Some(
            keys.iter()
                .map(|key| {
                    (
                        key.field.clone(),
                        Bson::Int32(match key.direction {
                            SortDirection::Asc => 1,
                            SortDirection::Desc => -1,
                        }),
                    )
                })
                .collect()
        )
    }
}

fn string_operand<'a>(field: &str, op: &str, value: &'a Bson) -> Result<&'a str, DocumentStoreError> {
    match value {
        Bson::String(s) => Ok(s),
        _ => Err(DocumentStoreError::InvalidQuery(
            format!("{op} on '{field}' requires a string value"),
        )),
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        let negated = self.visit_expr(expr)?;

        // $not is only valid on a field, $nor negates a whole expression
        Ok(doc! {
            "$nor": [negated],
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value.clone() },
                FieldOp::Ne => doc! { "$ne": value.clone() },
                FieldOp::Gt => doc! { "$gt": value.clone() },
                FieldOp::Gte => doc! { "$gte": value.clone() },
                FieldOp::Lt => doc! { "$lt": value.clone() },
                FieldOp::Lte => doc! { "$lte": value.clone() },
                FieldOp::EqIgnoreCase => doc! {
                    "$regex": format!("^{}$", regex::escape(string_operand(field, "case-insensitive match", value)?)),
                    "$options": "i",
                },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": regex::escape(s) },
                    // matches arrays holding the element
                    other => doc! { "$eq": other.clone() },
                },
                FieldOp::AnyOf => match value {
                    Bson::Array(values) => doc! { "$in": values.clone() },
                    _ => return Err(DocumentStoreError::InvalidQuery(
                        format!("any-of match on '{field}' requires an array value"),
                    )),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_core::query::Filter;

    #[test]
    fn test_eq_ignore_case_is_anchored_and_escaped() {
        let filter = MongoQueryTranslator::filter(Some(&Filter::eq_ignore_case("eventCategory", "C++ (live)"))).unwrap();

        assert_eq!(
            filter,
            doc! { "eventCategory": { "$regex": r"^C\+\+ \(live\)$", "$options": "i" } },
        );
    }

    #[test]
    fn test_eq_ignore_case_rejects_non_string() {
        let result = MongoQueryTranslator::filter(Some(&Expr::field(
            "eventCategory".to_string(),
            FieldOp::EqIgnoreCase,
            Bson::Int32(3),
        )));
        assert!(matches!(result, Err(DocumentStoreError::InvalidQuery(_))));
    }

    #[test]
    fn test_missing_filter_selects_everything() {
        assert_eq!(MongoQueryTranslator::filter(None).unwrap(), doc! {});
    }

    #[test]
    fn test_not_uses_nor() {
        let filter = MongoQueryTranslator::filter(Some(&Filter::eq("isTrending", true).not())).unwrap();
        assert_eq!(filter, doc! { "$nor": [{ "isTrending": { "$eq": true } }] });
    }

    #[test]
    fn test_or_and_any_of() {
        let filter = MongoQueryTranslator::filter(Some(&Filter::or([
            Filter::any_of("eventStatus", vec!["upcoming", "ongoing"]),
            Filter::gte("soldTickets", 100),
        ])))
        .unwrap();

        assert_eq!(
            filter,
            doc! { "$or": [
                { "eventStatus": { "$in": ["upcoming", "ongoing"] } },
                { "soldTickets": { "$gte": 100 } },
            ] },
        );
    }

    #[test]
    fn test_sort_keeps_key_order() {
        let sort = MongoQueryTranslator::sort(&[
            Sort { field: "soldTickets".into(), direction: SortDirection::Desc },
            Sort { field: "eventDate".into(), direction: SortDirection::Asc },
        ])
        .unwrap();

        assert_eq!(
            sort.keys().collect::<Vec<_>>(),
            vec!["soldTickets", "eventDate"],
        );
        assert_eq!(sort.get_i32("soldTickets").unwrap(), -1);
        assert_eq!(sort.get_i32("eventDate").unwrap(), 1);
        assert!(MongoQueryTranslator::sort(&[]).is_none());
    }
}
