use crate::{
    gtfs::{self, Row},
    schema::{EntitySchema, FieldSpec, FieldType, Presence},
    shared::Time,
};

/// A field after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
    Time(Time),
}

impl Value {
    /// String form used when the value takes part in a synthesized id.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Absent => None,
            Value::Text(value) => Some(value.clone()),
            Value::Int(value) => Some(value.to_string()),
            Value::Float(value) => Some(value.to_string()),
            Value::Time(value) => Some(value.to_hms_string()),
        }
    }
}

/// Why a raw value was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    pub value: String,
    pub reason: String,
}

impl Malformed {
    fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Turns one raw field into a typed value.
///
/// Absent and empty are the same thing to every declared field: optional
/// fields become [`Value::Absent`], defaulted ones their default and
/// required ones an error.
pub fn coerce(spec: &FieldSpec, raw: Option<&str>) -> Result<Value, Malformed> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty());
    let Some(raw) = raw else {
        return match spec.presence {
            Presence::Required => Err(Malformed::new("", "required field is missing")),
            Presence::Optional => Ok(Value::Absent),
            Presence::Default(default) => Ok(match spec.ty {
                FieldType::Float => Value::Float(default as f64),
                _ => Value::Int(default),
            }),
        };
    };

    match spec.ty {
        FieldType::Text => Ok(Value::Text(raw.to_string())),
        FieldType::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| Malformed::new(raw, "expected an integer")),
        FieldType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Value::Float)
            .ok_or_else(|| Malformed::new(raw, "expected a number")),
        FieldType::Code { min, max } => {
            let code = raw
                .parse::<i64>()
                .map_err(|_| Malformed::new(raw, "expected an integer code"))?;
            if (min..=max).contains(&code) {
                Ok(Value::Int(code))
            } else {
                Err(Malformed::new(
                    raw,
                    format!("code out of range {min}..={max}"),
                ))
            }
        }
        FieldType::Time => Time::from_hms(raw)
            .map(Value::Time)
            .ok_or_else(|| Malformed::new(raw, "expected HH:MM:SS")),
    }
}

const ABSENT: &Value = &Value::Absent;

/// A row coerced against its entity schema.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    schema: &'a EntitySchema,
    row: &'a Row,
    number: usize,
    values: Vec<Value>,
}

impl<'a> Record<'a> {
    /// Coerces every declared field of `row`; `number` is the 1-based data
    /// row used in error reports.
    pub fn new(schema: &'a EntitySchema, table: &str, number: usize, row: &'a Row) -> Result<Self, gtfs::Error> {
        let values = schema
            .fields
            .iter()
            .map(|spec| {
                coerce(spec, row.get(spec.name)).map_err(|err| gtfs::Error::MalformedField {
                    table: table.to_string(),
                    row: number,
                    column: spec.name.to_string(),
                    value: err.value,
                    reason: err.reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            schema,
            row,
            number,
            values,
        })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn schema(&self) -> &'a EntitySchema {
        self.schema
    }

    /// A [`gtfs::Error::MalformedField`] pointing at this record.
    pub fn malformed(&self, column: &str, value: &str, reason: impl Into<String>) -> gtfs::Error {
        gtfs::Error::MalformedField {
            table: self.schema.table.unwrap_or_default().to_string(),
            row: self.number,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn value(&self, name: &str) -> &Value {
        self.schema
            .field(name)
            .map(|(i, _)| &self.values[i])
            .unwrap_or(ABSENT)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.value(name) {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.value(name) {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn time(&self, name: &str) -> Option<Time> {
        match self.value(name) {
            Value::Time(value) => Some(*value),
            _ => None,
        }
    }

    /// Raw token for a link: the first of the link's columns with a value.
    pub fn token(&self, link: &str) -> Option<&'a str> {
        let fk = self.schema.foreign_key(link)?;
        fk.columns
            .iter()
            .filter_map(|column| self.row.get(column))
            .map(str::trim)
            .find(|token| !token.is_empty())
    }

    /// Values of the kind's id template, in template order. A field present
    /// in the row keeps its trimmed text as written (`01` stays `01`); a
    /// defaulted one that is absent renders its default.
    pub fn id_values(&self) -> Vec<Option<String>> {
        match self.schema.template() {
            Some(template) => template
                .columns()
                .map(|column| {
                    let value = self.value(column);
                    if *value == Value::Absent {
                        return None;
                    }
                    self.row
                        .get(column)
                        .map(str::trim)
                        .filter(|raw| !raw.is_empty())
                        .map(str::to_string)
                        .or_else(|| value.render())
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE: FieldSpec = FieldSpec::defaulted("min_age", FieldType::Int, -999);
    const TYPE: FieldSpec = FieldSpec::optional("distance_type", FieldType::Code { min: 0, max: 1 });

    #[test]
    fn absent_maps_to_sentinel_not_zero() {
        assert_eq!(coerce(&AGE, None), Ok(Value::Int(-999)));
        assert_eq!(coerce(&AGE, Some("")), Ok(Value::Int(-999)));
        assert_eq!(coerce(&AGE, Some("0")), Ok(Value::Int(0)));
    }

    #[test]
    fn codes_are_range_checked() {
        assert_eq!(coerce(&TYPE, Some("1")), Ok(Value::Int(1)));
        assert_eq!(coerce(&TYPE, None), Ok(Value::Absent));
        let err = coerce(&TYPE, Some("2")).unwrap_err();
        assert_eq!(err.value, "2");
        assert!(coerce(&TYPE, Some("x")).is_err());
    }

    #[test]
    fn required_missing_is_malformed() {
        let spec = FieldSpec::required("amount", FieldType::Float);
        assert!(coerce(&spec, None).is_err());
        assert!(coerce(&spec, Some("  ")).is_err());
        assert_eq!(coerce(&spec, Some("4.6")), Ok(Value::Float(4.6)));
        assert!(coerce(&spec, Some("NaN")).is_err());
    }

    #[test]
    fn times_and_text() {
        let time = FieldSpec::optional("arrival_time", FieldType::Time);
        assert_eq!(
            coerce(&time, Some("08:00:00")),
            Ok(Value::Time(Time::from_seconds(8 * 3600)))
        );
        assert!(coerce(&time, Some("8h")).is_err());
        let text = FieldSpec::optional("stop_name", FieldType::Text);
        assert_eq!(coerce(&text, Some(" Main St ")), Ok(Value::Text("Main St".into())));
    }

    #[test]
    fn id_values_keep_the_text_as_written() {
        let schema = crate::schema::Schema::standard();
        let entity = schema.entity(crate::schema::EntityKind::FareTransferRule);
        let row = Row::new()
            .with("from_leg_group_id", "a")
            .with("transfer_count", "01")
            .with("duration_limit", "");
        let record = Record::new(entity, "fare_transfer_rules", 1, &row).unwrap();
        assert_eq!(record.int("transfer_count"), Some(1));
        assert_eq!(
            record.id_values(),
            vec![
                Some("a".to_string()),
                None,
                None,
                Some("01".to_string()),
                Some("-999".to_string()),
            ]
        );
    }

    #[test]
    fn oversized_hour_is_malformed() {
        let schema = crate::schema::Schema::standard();
        let entity = schema.entity(crate::schema::EntityKind::StopTime);
        let row = Row::new()
            .with("trip_id", "t0")
            .with("arrival_time", "2000000:00:00")
            .with("stop_sequence", "0");
        let err = Record::new(entity, "stop_times", 1, &row).unwrap_err();
        assert!(matches!(
            err,
            gtfs::Error::MalformedField { ref column, .. } if column == "arrival_time"
        ));
    }

    #[test]
    fn record_reports_row_and_column() {
        let schema = crate::schema::Schema::standard();
        let entity = schema.entity(crate::schema::EntityKind::FareLegRule);
        let row = Row::new().with("distance_type", "7");
        let err = Record::new(entity, "fare_leg_rules", 3, &row).unwrap_err();
        match err {
            gtfs::Error::MalformedField {
                table, row, column, value, ..
            } => {
                assert_eq!(table, "fare_leg_rules");
                assert_eq!(row, 3);
                assert_eq!(column, "distance_type");
                assert_eq!(value, "7");
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
