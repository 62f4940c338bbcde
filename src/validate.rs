//! Request parameter validation
//!
//! Runs before a request is signed, so malformed parameters never reach the
//! network.

use crate::error::{Error, Result};
use crate::types::Params;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Parameter holding the range start date
pub const START_PARAM: &str = "start";

/// Parameter holding the range end date
pub const END_PARAM: &str = "end";

/// Parameter selecting aggregated results
pub const AGGREGATE_PARAM: &str = "aggregateData";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Check request parameters.
///
/// `start` and `end`, when present, must be `yyyy-mm-dd` dates, and `start`
/// must not fall after `end`. `aggregateData`, when present, must be `true`
/// or `false`.
pub fn validate_params(params: &Params) -> Result<()> {
    let start = params
        .get(START_PARAM)
        .map(|value| parse_date(START_PARAM, value))
        .transpose()?;
    let end = params
        .get(END_PARAM)
        .map(|value| parse_date(END_PARAM, value))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(Error::DateOrder {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }

    if let Some(value) = params.get(AGGREGATE_PARAM) {
        if value != "true" && value != "false" {
            return Err(Error::InvalidFlag {
                field: AGGREGATE_PARAM.to_string(),
                value: value.clone(),
            });
        }
    }

    Ok(())
}

/// Parse a `yyyy-mm-dd` date parameter
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDateFormat {
        field: field.to_string(),
        value: value.to_string(),
    };

    if !DATE_PATTERN.is_match(value) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}
