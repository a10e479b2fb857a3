use serde_json::Value;

pub const INVALID_MOBILE_NUMBER: &str = "Invalid mobile number";

/// A ten digit phone number, kept as an `i64` so it survives storage in a
/// `BIGINT` column without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileNumber(i64);

impl MobileNumber {
    pub const MIN: i64 = 1_000_000_000;
    pub const MAX: i64 = 9_999_999_999;

    /// Accepts any JSON number with no fractional part inside
    /// [`Self::MIN`, `Self::MAX`]. Strings, booleans and `null` are rejected.
    pub fn parse(value: &Value) -> Result<Self, String> {
        let candidate = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().and_then(integral_in_range)),
            _ => None,
        };

        match candidate {
            Some(number) if (Self::MIN..=Self::MAX).contains(&number) => Ok(Self(number)),
            _ => Err(INVALID_MOBILE_NUMBER.to_owned()),
        }
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_in_range(value: f64) -> Option<i64> {
    let range = (MobileNumber::MIN as f64)..=(MobileNumber::MAX as f64);
    (value.fract() == 0.0 && range.contains(&value)).then_some(value as i64)
}
