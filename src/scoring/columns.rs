//! Column resolution: bind logical fields and rubric items to sheet headers.
//!
//! Resolution happens in two phases. First every logical field is bound to a
//! header by matching normalized candidate tokens, falling back to a default
//! label. Then every bound column that the table lacks is materialized with a
//! default value, so later code can index any resolved column safely.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::{normalize_header, Rubric, ScoreTable};

/// Non-rubric columns of the score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Class,
    Week,
    Time,
    User,
    Total,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Class,
        Field::Week,
        Field::Time,
        Field::User,
        Field::Total,
    ];

    /// Normalized header tokens accepted for this field, in priority order.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Field::Class => &["lop"],
            Field::Week => &["tuan"],
            Field::Time => &["ngay nhap", "time"],
            Field::User => &["username", "tai khoan", "ten tai khoan"],
            Field::Total => &["tong diem", "tongdiem"],
        }
    }

    /// Header used when no candidate matches.
    pub fn default_label(&self) -> &'static str {
        match self {
            Field::Class => "Lớp",
            Field::Week => "Tuần",
            Field::Time => "Ngày nhập",
            Field::User => "Tên Tài Khoản",
            Field::Total => "Tổng điểm",
        }
    }

    /// Cell value for a freshly materialized column.
    pub fn default_value(&self) -> &'static str {
        match self {
            Field::Total => "0",
            _ => "",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Class => "CLASS",
            Field::Week => "WEEK",
            Field::Time => "TIME",
            Field::User => "USER",
            Field::Total => "TOTAL",
        };
        write!(f, "{}", s)
    }
}

/// Resolved binding from logical fields and rubric keys to header strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub class: String,
    pub week: String,
    pub time: String,
    pub user: String,
    pub total: String,
    items: BTreeMap<String, String>,
}

impl ColumnMap {
    /// The layout written to an empty sheet: default labels throughout.
    pub fn default_layout(rubric: &Rubric) -> Self {
        Self {
            class: Field::Class.default_label().to_string(),
            week: Field::Week.default_label().to_string(),
            time: Field::Time.default_label().to_string(),
            user: Field::User.default_label().to_string(),
            total: Field::Total.default_label().to_string(),
            items: rubric
                .items()
                .iter()
                .map(|item| (item.key.clone(), item.label.clone()))
                .collect(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Class => &self.class,
            Field::Week => &self.week,
            Field::Time => &self.time,
            Field::User => &self.user,
            Field::Total => &self.total,
        }
    }

    /// Column bound to a rubric key.
    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Header lookup by normalized token.
struct HeaderIndex<'a> {
    headers: &'a [String],
    normalized: Vec<String>,
}

impl<'a> HeaderIndex<'a> {
    fn new(headers: &'a [String]) -> Self {
        let normalized = headers.iter().map(|h| normalize_header(h)).collect();
        Self {
            headers,
            normalized,
        }
    }

    /// First header whose normalized form equals the first matching candidate.
    fn find<'c>(&self, candidates: impl IntoIterator<Item = &'c str>) -> Option<&'a str> {
        candidates.into_iter().find_map(|candidate| {
            self.normalized
                .iter()
                .position(|n| n == candidate)
                .map(|idx| self.headers[idx].as_str())
        })
    }
}

/// Resolve a [`ColumnMap`] against the table's header and materialize every
/// resolved column the table lacks.
///
/// Rubric items match their aliases first, then their normalized label; an
/// unmatched item falls back to its label with `0` in every row. An unloaded
/// table (no header row) is left untouched and gets the default layout.
pub fn resolve_columns(table: &mut ScoreTable, rubric: &Rubric) -> ColumnMap {
    if !table.is_loaded() {
        return ColumnMap::default_layout(rubric);
    }

    let headers = table.columns().to_vec();
    let index = HeaderIndex::new(&headers);

    let bind = |field: Field| -> String {
        index
            .find(field.candidates().iter().copied())
            .unwrap_or(field.default_label())
            .to_string()
    };

    let mut items = BTreeMap::new();
    for item in rubric.items() {
        let label_token = normalize_header(&item.label);
        let column = index
            .find(
                item.aliases
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(label_token.as_str())),
            )
            .unwrap_or(item.label.as_str())
            .to_string();
        items.insert(item.key.clone(), column);
    }

    let map = ColumnMap {
        class: bind(Field::Class),
        week: bind(Field::Week),
        time: bind(Field::Time),
        user: bind(Field::User),
        total: bind(Field::Total),
        items,
    };

    for item in rubric.items() {
        if let Some(column) = map.item(&item.key) {
            table.ensure_column(column, "0");
        }
    }
    for field in Field::ALL {
        table.ensure_column(map.field(field), field.default_value());
    }

    map
}
