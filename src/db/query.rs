use super::models::Record;
use crate::error::HubError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).unwrap_or(&Value::Null);
        let ord = || compare_json(actual, &self.value);
        match self.op {
            FilterOp::Eq => json_eq(actual, &self.value),
            FilterOp::Neq => !json_eq(actual, &self.value),
            FilterOp::Gt => ord() == Some(Ordering::Greater),
            FilterOp::Gte => matches!(ord(), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => ord() == Some(Ordering::Less),
            FilterOp::Lte => matches!(ord(), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Chainable table query, modelled on the hosted client's builder.
///
/// ```
/// use point_art_hub::db::Query;
/// let q = Query::table("sales").eq("category", "gift_store").order_desc("created_at").limit(10);
/// assert_eq!(q.table, "sales");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn neq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Neq, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lte, value)
    }

    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn order_asc(self, field: impl Into<String>) -> Self {
        self.order(field, Direction::Asc)
    }

    pub fn order_desc(self, field: impl Into<String>) -> Self {
        self.order(field, Direction::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject queries naming fields outside `[A-Za-z0-9_]`.
    pub fn check(&self) -> Result<(), HubError> {
        check_field(&self.table)?;
        for f in &self.filters {
            check_field(&f.field)?;
        }
        for o in &self.order {
            check_field(&o.field)?;
        }
        Ok(())
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Evaluate filters, ordering and limit over an in-memory slice.
    pub fn apply<'a, I>(&self, records: I) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut out: Vec<Record> = records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        if !self.order.is_empty() {
            out.sort_by(|a, b| self.compare_records(a, b));
        }
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    fn compare_records(&self, a: &Record, b: &Record) -> Ordering {
        for key in &self.order {
            let av = a.get(&key.field).filter(|v| !v.is_null());
            let bv = b.get(&key.field).filter(|v| !v.is_null());
            // nulls sort last in both directions
            let ord = match (av, bv) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ord = compare_json(x, y).unwrap_or(Ordering::Equal);
                    match key.direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Order two scalars of the same kind; `None` for mixed or non-scalar values.
pub fn compare_json(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Column names that are safe to splice into a JSON path or a REST query.
pub fn check_field(field: &str) -> Result<&str, HubError> {
    let ok = !field.is_empty()
        && field.len() <= 64
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(field)
    } else {
        Err(HubError::Validation(format!("invalid field name `{field}`")))
    }
}
