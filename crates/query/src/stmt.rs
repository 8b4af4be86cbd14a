use std::error::Error;
use std::fmt::{Display, Formatter};

use chq_primitives::{EpochRange, Name, Pagination};
use chq_storage::SqlValue;


/// A complete statement: trusted SQL text plus positionally bound values.
///
/// Every runtime value travels through `params`. The single exception is
/// the configuration-supplied contract address list, which is rendered
/// inline by [`quoted_list`] because an IN-clause cannot be bound as one
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>
}


/// A required clause argument was missing while rendering a statement.
/// Indicates a programming error, not a data problem.
#[derive(Debug)]
pub struct CompositionError {
    pub message: String
}


impl CompositionError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self {
            message: message.to_string()
        }
    }
}


impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompositionError: {}", self.message)
    }
}


impl Error for CompositionError {}


macro_rules! composition_error {
    ($($arg:tt)*) => {
        CompositionError::new(format!($($arg)*))
    };
}
pub(crate) use composition_error;


/// Renders trusted literals into a comma-separated IN-clause body.
/// Each value is individually quoted and embedded quotes are doubled,
/// so the value can never terminate the literal early.
pub fn quoted_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter()
        .map(|value| format!("'{}'", value.replace('\'', "''")))
        .collect();
    quoted.join(",")
}


/// The self-contained two-subset join used by reward-distribution
/// queries: a transfer-history subset (restricted to the trusted source
/// addresses) inner-joined to a contract-action subset on the shared
/// action hash. The epoch-range bounds apply to each subset
/// independently and are bound as parameters.
pub struct JoinedTables<'a> {
    pub transfers: Name,
    pub actions: Name,
    pub sources: &'a [String],
    pub range: EpochRange
}


impl JoinedTables<'_> {
    fn render(&self, params: &mut Vec<SqlValue>) -> Result<String, CompositionError> {
        if self.sources.is_empty() {
            return Err(composition_error!(
                "joined query over `{}` requires at least one source address",
                self.transfers
            ))
        }
        params.push(self.range.start_epoch.into());
        params.push(self.range.end_epoch().into());
        params.push(self.range.start_epoch.into());
        params.push(self.range.end_epoch().into());
        Ok(format!(
            "FROM (SELECT * FROM {} WHERE epoch_number >= ? AND epoch_number <= ? AND `from` IN ({})) AS t1 \
             INNER JOIN (SELECT * FROM {} WHERE epoch_number >= ? AND epoch_number <= ?) AS t2 \
             ON t1.action_hash = t2.action_hash",
            self.transfers,
            quoted_list(self.sources),
            self.actions
        ))
    }
}


/// Composes a SELECT statement from named clause fragments. Structural
/// pieces (projections, table names, column names) are compile-time
/// constants supplied by the caller; every value becomes a bound
/// parameter in clause order.
pub struct SelectBuilder {
    select: &'static str,
    from: Option<String>,
    from_params: Vec<SqlValue>,
    conditions: Vec<String>,
    condition_params: Vec<SqlValue>,
    order: Option<String>,
    page: Option<Pagination>,
    error: Option<CompositionError>
}


impl SelectBuilder {
    pub fn select(projection: &'static str) -> Self {
        Self {
            select: projection,
            from: None,
            from_params: Vec::new(),
            conditions: Vec::new(),
            condition_params: Vec::new(),
            order: None,
            page: None,
            error: None
        }
    }

    pub fn from_table(mut self, table: Name) -> Self {
        self.from = Some(format!("FROM {}", table));
        self
    }

    pub fn from_joined(mut self, join: JoinedTables<'_>) -> Self {
        match join.render(&mut self.from_params) {
            Ok(clause) => self.from = Some(clause),
            Err(err) => self.fail(err)
        }
        self
    }

    /// Equality filter on an identity column. An empty value means the
    /// caller forgot a required argument.
    pub fn filter_eq(mut self, column: Name, value: &str) -> Self {
        if value.is_empty() {
            self.fail(composition_error!("filter on {} requires a value", column));
            return self
        }
        self.conditions.push(format!("{} = ?", column));
        self.condition_params.push(value.into());
        self
    }

    pub fn filter_epoch_range(mut self, range: EpochRange) -> Self {
        self.conditions.push("epoch_number >= ? AND epoch_number <= ?".to_string());
        self.condition_params.push(range.start_epoch.into());
        self.condition_params.push(range.end_epoch().into());
        self
    }

    pub fn filter_height_range(mut self, start: u64, end: u64) -> Self {
        self.conditions.push("block_height >= ? AND block_height <= ?".to_string());
        self.condition_params.push(start.into());
        self.condition_params.push(end.into());
        self
    }

    pub fn order_by_desc(mut self, column: Name) -> Self {
        self.order = Some(format!("ORDER BY {} DESC", column));
        self
    }

    pub fn paginate(mut self, page: Pagination) -> Self {
        self.page = Some(page);
        self
    }

    pub fn build(self) -> Result<Statement, CompositionError> {
        if let Some(err) = self.error {
            return Err(err)
        }

        let from = self.from.ok_or_else(|| {
            composition_error!("statement has no FROM clause")
        })?;

        let mut sql = format!("{} {}", self.select, from);
        let mut params = self.from_params;

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
            params.extend(self.condition_params);
        }

        if let Some(order) = self.order.as_ref() {
            sql.push(' ');
            sql.push_str(order);
        }

        if let Some(page) = self.page {
            if self.order.is_none() {
                return Err(composition_error!("pagination requires an ordering clause"))
            }
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(page.size.into());
            params.push(page.offset.into());
        }

        Ok(Statement {
            sql,
            params
        })
    }

    fn fail(&mut self, err: CompositionError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
