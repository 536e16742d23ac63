use serde::Serializer;

/// Serializes floats with three decimal places so result tables stay diffable.
pub fn round_float<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64((value * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "round_float")]
        value: f64,
    }

    #[test]
    fn should_round_to_three_decimal_places() {
        let json = serde_json::to_string(&Sample { value: 1.234_567 }).unwrap();
        assert_eq!(json, r#"{"value":1.235}"#);
    }
}
