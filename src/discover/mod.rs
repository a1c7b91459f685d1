// src/discover/mod.rs

pub mod arcgis;

use serde_json::Value;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::http::Transport;
use crate::table::{RollRecord, RollTable};

use arcgis::Attributes;

/// Composite feature id; its leading digits are the jurisdiction code.
pub const FEATURE_ID_COLUMN: &str = "AFP_OID";
pub const ROLL_NUM_COLUMN: &str = "ROLL_NUM";
pub const IMPR_VALUE_COLUMN: &str = "IMPR_VALUE";
pub const LAND_VALUE_COLUMN: &str = "LAND_VALUE";

/// String-prefix match, so jurisdiction 226 keeps "2260001" but not "2270001".
pub fn matches_jurisdiction(feature_id: &str, jur: u32) -> bool {
    feature_id.starts_with(&jur.to_string())
}

/// Convert a float-valued cell to a whole number. Null stays null; anything
/// fractional, out of range or non-numeric is a coercion error.
pub fn coerce_whole(column: &'static str, roll: &str, value: &Value) -> Result<Option<i64>> {
    let fail = || ScrapeError::Coercion {
        column,
        roll: roll.to_string(),
        value: value.to_string(),
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            let f = n.as_f64().ok_or_else(fail)?;
            if f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(fail());
            }
            Ok(Some(f as i64))
        }
        _ => Err(fail()),
    }
}

fn required<'a>(attrs: &'a Attributes, column: &str) -> Result<&'a Value> {
    attrs.get(column).ok_or_else(|| {
        ScrapeError::UpstreamQuery(format!("feature is missing column {}", column))
    })
}

/// Roll numbers come back as strings, but tolerate a numeric column too.
fn roll_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ScrapeError::UpstreamQuery(format!(
            "unexpected {} value {}",
            ROLL_NUM_COLUMN, other
        ))),
    }
}

/// Turn raw feature attributes into roll records for `jur`: filter on the
/// feature id prefix, keep only the roll number and the two values, coerce
/// the values, and stamp every row with `jur`. Output order follows input order.
pub fn build_roll_table(rows: &[Attributes], jur: u32) -> Result<RollTable> {
    let mut records = Vec::new();

    for attrs in rows {
        let keep = match required(attrs, FEATURE_ID_COLUMN)? {
            Value::String(id) => matches_jurisdiction(id, jur),
            Value::Null => false,
            other => matches_jurisdiction(&other.to_string(), jur),
        };
        if !keep {
            continue;
        }

        let roll_num = roll_string(required(attrs, ROLL_NUM_COLUMN)?)?;
        let impr_value = coerce_whole(
            IMPR_VALUE_COLUMN,
            &roll_num,
            required(attrs, IMPR_VALUE_COLUMN)?,
        )?;
        let land_value = coerce_whole(
            LAND_VALUE_COLUMN,
            &roll_num,
            required(attrs, LAND_VALUE_COLUMN)?,
        )?;

        records.push(RollRecord {
            jur,
            roll_num,
            impr_value,
            land_value,
        });
    }

    Ok(RollTable::new(records))
}

/// Query the assessment feature layer and return every roll record in `jur`.
#[instrument(level = "info", skip(transport, config))]
pub async fn get_roll_nums<T: Transport>(
    transport: &T,
    config: &Config,
    jur: u32,
) -> Result<RollTable> {
    let layer = config.feature_layer_url()?;
    let rows = arcgis::query_layer(transport, &layer, config.page_size).await?;
    let table = build_roll_table(&rows, jur)?;
    info!(
        features = rows.len(),
        records = table.len(),
        "jurisdiction and roll numbers retrieved"
    );
    Ok(table)
}
