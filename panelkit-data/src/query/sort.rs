//! Sorter types.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;
use serde::ser::SerializeMap;

use crate::model::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order (lower first).
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    /// Descending order (higher first).
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl Direction {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Ordered mapping of field to direction.
///
/// Earlier fields take priority; later fields only break ties.
///
/// # Example
///
/// ```
/// use panelkit_data::query::Sorters;
///
/// let sorters = Sorters::desc("revenue").then_asc("name");
/// assert_eq!(sorters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorters {
    pub(crate) fields: Vec<(String, Direction)>,
}

impl Sorters {
    /// Creates an empty sorter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ascending sorter on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            fields: vec![(field.into(), Direction::Asc)],
        }
    }

    /// Creates a descending sorter on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            fields: vec![(field.into(), Direction::Desc)],
        }
    }

    /// Adds a secondary ascending sorter.
    pub fn then_asc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Asc)
    }

    /// Adds a secondary descending sorter.
    pub fn then_desc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Desc)
    }

    /// Adds a sorter, replacing the direction in place if the field exists.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.set(field, direction);
        self
    }

    /// Sets the direction for a field, keeping its priority if present.
    pub fn set(&mut self, field: impl Into<String>, direction: Direction) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = direction,
            None => self.fields.push((field, direction)),
        }
    }

    /// Direction of a field, if sorted on it.
    pub fn direction(&self, field: &str) -> Option<Direction> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, direction)| *direction)
    }

    /// Returns the ordered fields with their directions.
    pub fn fields(&self) -> &[(String, Direction)] {
        &self.fields
    }

    /// Returns `true` if no sorter is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of sorters.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Compares two records by every sorter in priority order.
    ///
    /// Returns `Equal` when all sorters tie, so a stable sort keeps the
    /// original relative order.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for (field, direction) in &self.fields {
            let ordering = a.value(field).compare(b.value(field));
            if ordering != Ordering::Equal {
                return direction.apply(ordering);
            }
        }
        Ordering::Equal
    }
}

impl Serialize for Sorters {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, direction) in &self.fields {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sorters {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SortersVisitor;

        impl<'de> serde::de::Visitor<'de> for SortersVisitor {
            type Value = Sorters;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of field to ASC|DESC")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Sorters, A::Error> {
                let mut sorters = Sorters::new();
                while let Some((field, direction)) = access.next_entry::<String, Direction>()? {
                    sorters.set(field, direction);
                }
                Ok(sorters)
            }
        }

        deserializer.deserialize_map(SortersVisitor)
    }
}
