//! List query parsing: one substring filter plus an allow-listed sort
//!
//! Sort columns come from a static allow-list so they can be interpolated
//! into SQL; anything else falls back to `id asc`.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Sort direction (`ordem`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Lenient parse; unknown values are ascending
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "desc" => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    /// SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Comparable value of one column, for in-memory sorting
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Time(NaiveDateTime),
}

/// An entity that can be listed with a filter and sort
pub trait Listable {
    /// Query parameter (and column) the substring filter applies to
    const FILTER_PARAM: &'static str;

    /// Columns accepted by `ordenar_por`; the first must be `id`
    const SORT_COLUMNS: &'static [&'static str];

    /// Text the filter is matched against
    fn filter_text(&self) -> String;

    /// Value of `column` for sorting; `column` is always one of `SORT_COLUMNS`
    fn sort_key(&self, column: &str) -> SortKey;
}

/// Parsed list parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Substring to match, already trimmed, never empty
    pub filter: Option<String>,
    /// Always an entry of the resource's allow-list
    pub sort_by: &'static str,
    pub order: SortOrder,
}

impl ListQuery {
    /// Parse `ordenar_por`, `ordem` and the resource's filter parameter
    pub fn parse<T: Listable>(params: &HashMap<String, String>) -> Self {
        let filter = params
            .get(T::FILTER_PARAM)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let requested = params.get("ordenar_por").map(|v| v.trim());
        let sort_by = T::SORT_COLUMNS
            .iter()
            .copied()
            .find(|column| Some(*column) == requested)
            .unwrap_or("id");

        Self {
            filter,
            sort_by,
            order: SortOrder::parse(params.get("ordem").map(String::as_str)),
        }
    }

    /// Default listing: no filter, `id asc`
    pub fn by_id() -> Self {
        Self {
            filter: None,
            sort_by: "id",
            order: SortOrder::Asc,
        }
    }

    /// Case-insensitive substring match, as `LIKE %x%` under MySQL's default collation
    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        match &self.filter {
            Some(needle) => item
                .filter_text()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// Filter and sort in place, ties broken by id
    pub fn apply<T: Listable>(&self, mut items: Vec<T>) -> Vec<T> {
        items.retain(|item| self.matches(item));
        items.sort_by(|a, b| {
            let ordering = a
                .sort_key(self.sort_by)
                .cmp(&b.sort_key(self.sort_by))
                .then_with(|| a.sort_key("id").cmp(&b.sort_key("id")));
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cart;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cart(id: i64, product_id: i64, quantity: i64) -> Cart {
        Cart {
            id,
            product_id,
            quantity,
            customer_id: 1,
        }
    }

    #[test]
    fn test_defaults_to_id_asc() {
        let query = ListQuery::parse::<Cart>(&params(&[]));
        assert_eq!(query, ListQuery::by_id());
    }

    #[test]
    fn test_unknown_column_and_direction_fall_back() {
        let query = ListQuery::parse::<Cart>(&params(&[
            ("ordenar_por", "id; DROP TABLE tbl_carrinhos"),
            ("ordem", "sideways"),
        ]));
        assert_eq!(query.sort_by, "id");
        assert_eq!(query.order, SortOrder::Asc);
    }

    #[test]
    fn test_allowed_column_and_desc() {
        let query = ListQuery::parse::<Cart>(&params(&[
            ("ordenar_por", "quantidade"),
            ("ordem", "DESC"),
            ("produto_id", " 4 "),
        ]));
        assert_eq!(query.sort_by, "quantidade");
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.filter.as_deref(), Some("4"));
    }

    #[test]
    fn test_blank_filter_ignored() {
        let query = ListQuery::parse::<Cart>(&params(&[("produto_id", "   ")]));
        assert!(query.filter.is_none());
    }

    #[test]
    fn test_apply_filters_and_sorts() {
        let items = vec![cart(1, 14, 3), cart(2, 7, 9), cart(3, 41, 1), cart(4, 14, 5)];
        let query = ListQuery::parse::<Cart>(&params(&[
            ("produto_id", "4"),
            ("ordenar_por", "quantidade"),
            ("ordem", "desc"),
        ]));

        let ids: Vec<i64> = query.apply(items).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 1, 3]);
    }
}
