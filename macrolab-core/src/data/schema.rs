use polars::prelude::*;

/// Schema of the `raw_data` and `processed_data` tables.
pub struct ObservationSchema;

impl ObservationSchema {
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("series_id".into(), DataType::String),
            Field::new("value".into(), DataType::Float64),
        ])
    }

    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        validate_against(&Self::schema(), df)
    }
}

/// Schema of a market (ticker) table.
pub struct MarketBarSchema;

impl MarketBarSchema {
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("open".into(), DataType::Float64),
            Field::new("high".into(), DataType::Float64),
            Field::new("low".into(), DataType::Float64),
            Field::new("close".into(), DataType::Float64),
            Field::new("volume".into(), DataType::UInt64),
        ])
    }

    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        validate_against(&Self::schema(), df)
    }
}

/// Check that every expected column exists with the expected type.
fn validate_against(expected: &Schema, df: &DataFrame) -> Result<(), SchemaError> {
    let actual = df.schema();

    for field in expected.iter_fields() {
        let actual_dtype = actual
            .get(field.name())
            .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
        if actual_dtype != field.dtype() {
            return Err(SchemaError::TypeMismatch {
                column: field.name().to_string(),
                expected: field.dtype().clone(),
                actual: actual_dtype.clone(),
            });
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}
