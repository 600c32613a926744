//! String-keyed attribute storage with typed accessors.
//!
//! Every typed value has exactly one canonical textual form. Setters always write that
//! form; getters accept it (plus surrounding whitespace) and return `None` for anything
//! else. Numbers are written with `.` as the decimal separator regardless of locale since
//! the text is persisted and re-read elsewhere.

use std::collections::HashMap;
use std::collections::hash_map;

use crate::geometry::{Point, Rect};

/// Unordered map of attribute name to raw string value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: HashMap<String, String>,
}

impl AttributeMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(name, value)` pairs; later duplicates overwrite earlier ones.
    #[inline]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.set(key, value);
        }
        map
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Insert or overwrite a value.
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a value, returning it if it was present.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Drop every attribute except `keep`.
    #[inline]
    pub fn retain_only(&mut self, keep: &str) {
        self.values.retain(|name, _| name == keep);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in unspecified order.
    #[inline]
    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.values.iter()
    }

    /// Entries sorted by key, the order used when writing.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        pairs.sort_unstable_by(|left, right| left.0.cmp(right.0));
        pairs
    }

    /// Copy every entry of `other` over this map.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    #[inline]
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set(name, if value { "true" } else { "false" });
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name)?.trim().parse::<i32>().ok()
    }

    #[inline]
    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.set(name, value.to_string());
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        parse_double(self.get(name)?)
    }

    #[inline]
    pub fn set_double(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, format_double(value));
    }

    pub fn get_point(&self, name: &str) -> Option<Point> {
        let parts = parse_doubles::<2>(self.get(name)?)?;
        Some(Point::new(parts[0], parts[1]))
    }

    #[inline]
    pub fn set_point(&mut self, name: impl Into<String>, point: Point) {
        self.set(name, format_point(point));
    }

    pub fn get_rect(&self, name: &str) -> Option<Rect> {
        let parts = parse_doubles::<4>(self.get(name)?)?;
        Some(Rect::new(parts[0], parts[1], parts[2], parts[3]))
    }

    #[inline]
    pub fn set_rect(&mut self, name: impl Into<String>, rect: Rect) {
        self.set(name, format_rect(rect));
    }

    /// Split a comma-joined list. The parts are returned verbatim, whitespace included;
    /// an empty value is an empty list.
    pub fn get_string_array(&self, name: &str) -> Option<Vec<String>> {
        let raw = self.get(name)?;
        if raw.is_empty() {
            return Some(Vec::new());
        }
        Some(raw.split(',').map(str::to_owned).collect())
    }

    #[inline]
    pub fn set_string_array<S: AsRef<str>>(&mut self, name: impl Into<String>, values: &[S]) {
        let joined: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        self.set(name, joined.join(","));
    }
}

impl<'map> IntoIterator for &'map AttributeMap {
    type Item = (&'map String, &'map String);
    type IntoIter = hash_map::Iter<'map, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Canonical double text: shortest form that reads back to the same value.
#[inline]
pub fn format_double(value: f64) -> String {
    format!("{value}")
}

/// Canonical point text, `"x, y"`.
#[inline]
pub fn format_point(point: Point) -> String {
    format!("{}, {}", format_double(point.x), format_double(point.y))
}

/// Canonical rect text, `"left, top, right, bottom"`.
#[inline]
pub fn format_rect(rect: Rect) -> String {
    format!(
        "{}, {}, {}, {}",
        format_double(rect.left),
        format_double(rect.top),
        format_double(rect.right),
        format_double(rect.bottom)
    )
}

/// Parse a double, tolerating surrounding whitespace.
#[inline]
pub fn parse_double(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn parse_doubles<const COUNT: usize>(text: &str) -> Option<[f64; COUNT]> {
    let mut out = [0.0; COUNT];
    let mut parts = text.split(',');
    for slot in &mut out {
        *slot = parse_double(parts.next()?)?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::AttributeMap;
    use crate::geometry::{Point, Rect};

    #[test]
    fn typed_values_read_back() {
        let mut map = AttributeMap::new();
        map.set_bool("flag", true);
        map.set_int("count", -42);
        map.set_double("ratio", 20.5);
        map.set_point("origin", Point::new(4.0, 10.5));
        map.set_rect("frame", Rect::new(0.0, -1.25, 400.0, 235.0));
        map.set_string_array("names", &["Arial", "Courier"]);

        assert_eq!(map.get_bool("flag"), Some(true));
        assert_eq!(map.get_int("count"), Some(-42));
        assert_eq!(map.get("ratio"), Some("20.5"));
        assert_eq!(map.get_double("ratio").map(f64::to_bits), Some(20.5f64.to_bits()));
        assert_eq!(map.get_point("origin"), Some(Point::new(4.0, 10.5)));
        assert_eq!(map.get("origin"), Some("4, 10.5"));
        assert_eq!(map.get_rect("frame"), Some(Rect::new(0.0, -1.25, 400.0, 235.0)));
        assert_eq!(map.get("frame"), Some("0, -1.25, 400, 235"));
        assert_eq!(
            map.get_string_array("names"),
            Some(vec!["Arial".to_owned(), "Courier".to_owned()])
        );
    }

    #[test]
    fn malformed_values_are_absent() {
        let map = AttributeMap::from_pairs([
            ("flag", "yes"),
            ("count", "12abc"),
            ("ratio", "1,5"),
            ("origin", "1, 2, 3"),
            ("frame", "1, 2, 3"),
        ]);
        assert_eq!(map.get_bool("flag"), None);
        assert_eq!(map.get_int("count"), None);
        assert_eq!(map.get_double("ratio"), None);
        assert_eq!(map.get_point("origin"), None);
        assert_eq!(map.get_rect("frame"), None);
        assert_eq!(map.get_bool("missing"), None);
    }

    #[test]
    fn points_tolerate_missing_spaces() {
        let map = AttributeMap::from_pairs([("margin", "0,0,0,0"), ("offset", " 3 ,4 ")]);
        assert_eq!(map.get_rect("margin"), Some(Rect::default()));
        assert_eq!(map.get_point("offset"), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn string_array_keeps_part_whitespace() {
        let map = AttributeMap::from_pairs([("alt", "Arial, Courier"), ("empty", "")]);
        assert_eq!(
            map.get_string_array("alt"),
            Some(vec!["Arial".to_owned(), " Courier".to_owned()])
        );
        assert_eq!(map.get_string_array("empty"), Some(Vec::new()));
    }

    #[test]
    fn sorted_orders_by_key() {
        let map = AttributeMap::from_pairs([("red", "255"), ("alpha", "100"), ("name", "c3")]);
        let keys: Vec<&str> = map.sorted().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["alpha", "name", "red"]);
    }
}
