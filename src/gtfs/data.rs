use std::sync::Arc;

/// One record of a table: column name to raw value, in column order.
///
/// A column that is not in the row is "absent"; a column present with an
/// empty string is kept as such and left to the schema to interpret.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(Arc<str>, String)>,
}

impl Row {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, column: impl Into<Arc<str>>, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<Arc<str>>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Raw value of a column, `None` if the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_ref() == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<Arc<str>>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Builds a table from a header and comma separated lines.
    /// Values are trimmed and never quoted, which is enough for hand written feeds.
    pub fn from_lines(name: impl Into<String>, header: &str, lines: &[&str]) -> Self {
        let columns: Vec<Arc<str>> = header.split(',').map(|c| c.trim().into()).collect();
        let rows = lines
            .iter()
            .map(|line| {
                columns
                    .iter()
                    .cloned()
                    .zip(line.split(',').map(|v| v.trim().to_string()))
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }
}

/// Every table of one feed, in the order they were read.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    tables: Vec<Table>,
}

impl Feed {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.push(table);
        self
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn rows(&self, name: &str) -> impl Iterator<Item = &Row> {
        self.tables
            .iter()
            .filter(move |table| table.name == name)
            .flat_map(|table| table.rows.iter())
    }
}

impl From<Vec<Table>> for Feed {
    fn from(tables: Vec<Table>) -> Self {
        Self { tables }
    }
}

#[test]
fn absent_and_empty_are_distinct() {
    let row = Row::new().with("stop_id", "a").with("stop_name", "");
    assert_eq!(row.get("stop_id"), Some("a"));
    assert_eq!(row.get("stop_name"), Some(""));
    assert_eq!(row.get("stop_desc"), None);
}

#[test]
fn from_lines_trims_header() {
    let table = Table::from_lines(
        "fare_products",
        "fare_product_id, amount, currency",
        &["fare_1,5,EUR"],
    );
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].get("amount"), Some("5"));
    assert_eq!(table.rows[0].get("currency"), Some("EUR"));
}
