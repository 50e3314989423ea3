use std::cmp::Ordering;

use serde_json::Value;

use crate::{errors::StoreError, keys::CollectionPath, store::Document};

/// Maximum number of values a single `in` filter may carry.
pub const IN_FILTER_LIMIT: usize = 10;

/// What a filter compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    /// The document's own id.
    DocumentId,
    /// A top-level field.
    Field(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ge,
    Le,
    Lt,
    In,
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: FieldRef,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Read over a single collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    fn filter(mut self, field: FieldRef, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter { field, op, value });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(FieldRef::Field(field.to_string()), FilterOp::Eq, value.into())
    }

    pub fn where_ge(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(FieldRef::Field(field.to_string()), FilterOp::Ge, value.into())
    }

    pub fn where_le(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(FieldRef::Field(field.to_string()), FilterOp::Le, value.into())
    }

    pub fn where_lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(FieldRef::Field(field.to_string()), FilterOp::Lt, value.into())
    }

    pub fn where_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(FieldRef::Field(field.to_string()), FilterOp::In, Value::Array(values))
    }

    pub fn where_id_in<I, V>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = ids.into_iter().map(|id| Value::String(id.into())).collect();
        self.filter(FieldRef::DocumentId, FilterOp::In, Value::Array(values))
    }

    pub fn where_array_contains(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(FieldRef::Field(field.to_string()), FilterOp::ArrayContains, value.into())
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rejects queries the hosted backend would refuse.
    pub fn validate(&self) -> Result<(), StoreError> {
        for filter in &self.filters {
            if filter.op == FilterOp::In {
                let len = filter.value.as_array().map(Vec::len).unwrap_or(0);
                if len == 0 || len > IN_FILTER_LIMIT {
                    return Err(StoreError::InvalidArgument {
                        message: format!(
                            "'in' filter on {} needs between 1 and {IN_FILTER_LIMIT} values, got {len}",
                            self.collection
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Ids named by a document-id `in` filter, when the query has one.
    pub fn id_lookup(&self) -> Option<Vec<String>> {
        self.filters
            .iter()
            .find(|f| f.field == FieldRef::DocumentId && f.op == FilterOp::In)
            .and_then(|f| f.value.as_array())
            .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(doc))
    }

    /// Filters, orders and limits `docs`, which must all belong to the
    /// queried collection.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs.into_iter().filter(|doc| self.matches(doc)).collect();

        if let Some((field, direction)) = &self.order_by {
            // Documents without the ordering field are not part of an ordered result.
            matched.retain(|doc| doc.get(field).is_some_and(|v| !v.is_null()));
            matched.sort_by(|a, b| {
                let ordering = match (a.get(field), b.get(field)) {
                    (Some(left), Some(right)) => compare_values(left, right).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        let id_value;
        let actual = match &self.field {
            FieldRef::DocumentId => {
                id_value = Value::String(doc.id.clone());
                Some(&id_value)
            }
            FieldRef::Field(name) => doc.get(name),
        };
        let Some(actual) = actual else {
            return false;
        };

        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Ge => matches!(compare_values(actual, &self.value), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Le => matches!(compare_values(actual, &self.value), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::Lt => matches!(compare_values(actual, &self.value), Some(Ordering::Less)),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|candidates| candidates.iter().any(|c| values_equal(actual, c))),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(item, &self.value))),
        }
    }
}

/// Splits ids into distinct chunks of at most `size`, keeping first-seen order.
pub fn id_chunks<I, V>(ids: I, size: usize) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    let distinct: Vec<String> = ids
        .into_iter()
        .map(Into::into)
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();
    distinct.chunks(size.clamp(1, IN_FILTER_LIMIT)).map(<[String]>::to_vec).collect()
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare_values(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Orders two values of the same kind; mixed kinds are incomparable.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
