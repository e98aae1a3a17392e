//! Query string encoding for the REST gateway.

use crate::domain::entities::ItemId;
use crate::domain::ports::{Direction, Query};

/// Column holding the row owner.
pub const OWNER_COLUMN: &str = "user_id";

/// Encodes a list query as `select`, filter and `order` parameters.
///
/// Values are left raw; the HTTP client percent-encodes them.
#[must_use]
pub fn list_params(query: &Query, owner: Option<&str>) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some(owner) = owner {
        params.push((OWNER_COLUMN.to_string(), format!("eq.{owner}")));
    }
    params.extend(
        query
            .filters
            .iter()
            .map(|filter| (filter.column.clone(), format!("{}.{}", filter.op.as_str(), filter.value))),
    );
    if let Some(order) = &query.order {
        let direction = match order.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    params
}

/// Filter addressing a single row.
#[must_use]
pub fn id_param(id: &ItemId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}
