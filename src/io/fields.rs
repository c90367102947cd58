//! Tolerant field lookup across renamed columns.
//!
//! The upstream daily reports renamed several headers over their lifetime
//! (`Province/State` became `Province_State`, `Last Update` became
//! `Last_Update`, ...). Rather than versioning the schema, every field is read
//! through an ordered alias list: the first alias that is present wins, and a
//! field with no present alias resolves to an empty string or zero.

use std::collections::HashMap;

use csv::StringRecord;

/// Header alias tables, tried in order.
pub mod aliases {
    pub const COUNTRY: &[&str] = &["Country/Region", "Country_Region"];
    pub const REGION: &[&str] = &["Province/State", "Province_State"];
    pub const LAST_UPDATE: &[&str] = &["Last Update", "Last_Update"];
    pub const CONFIRMED: &[&str] = &["Confirmed"];
    pub const DEATHS: &[&str] = &["Deaths"];
    pub const RECOVERED: &[&str] = &["Recovered"];
}

/// Case-insensitive header name to column index.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn from_record(headers: &StringRecord) -> Self {
        Self::from_names(headers.iter())
    }

    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = HashMap::new();
        for (idx, name) in names.into_iter().enumerate() {
            // Keep the first column if a header is repeated.
            index.entry(normalize_header_name(name)).or_insert(idx);
        }
        Self { index }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_header_name(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }
}

fn normalize_header_name(name: &str) -> String {
    // Some of the older reports were saved with a BOM in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

/// Reads named fields out of one record.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    headers: &'a HeaderMap,
    record: &'a StringRecord,
}

impl<'a> FieldResolver<'a> {
    pub fn new(headers: &'a HeaderMap, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Walk `aliases` in order and return the first value `parse` accepts.
    ///
    /// An alias counts as present when its column exists in the header, the
    /// record is long enough to hold it, and `parse` yields a value.
    pub fn resolve<T>(&self, aliases: &[&str], parse: impl Fn(&str) -> Option<T>, default: T) -> T {
        aliases
            .iter()
            .filter_map(|alias| self.raw(alias))
            .find_map(parse)
            .unwrap_or(default)
    }

    /// Text field; empty string when no alias is present.
    pub fn text(&self, aliases: &[&str]) -> String {
        self.resolve(aliases, |v| Some(v.to_string()), String::new())
    }

    /// Count field; zero when no alias is present or parses.
    ///
    /// Counts are cumulative totals, so negative cells are treated as unparseable.
    pub fn count(&self, aliases: &[&str]) -> i64 {
        self.resolve(aliases, parse_count, 0)
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        let idx = self.headers.index_of(name)?;
        self.record.get(idx).map(str::trim)
    }
}

fn parse_count(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(v) = raw.parse::<i64>() {
        return (v >= 0).then_some(v);
    }
    // A handful of reports were exported with float-formatted counts ("12.0").
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v.trunc() as i64) } else { None }
}
