use loan_approval::workflows::approval::UnknownOption;
use metrics_exporter_prometheus::PrometheusHandle;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Parses one of the enumerated form labels, matching case-insensitively.
pub(crate) fn parse_option<T>(raw: &str) -> Result<T, String>
where
    T: FromStr<Err = UnknownOption>,
{
    raw.parse::<T>().map_err(|err| err.to_string())
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    let value = cleaned
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as a number ({err})"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::workflows::approval::HomeOwnership;

    #[test]
    fn amounts_accept_thousands_separators() {
        assert_eq!(parse_amount("1,500,000"), Ok(1_500_000.0));
        assert_eq!(parse_amount(" 11.5 "), Ok(11.5));
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn options_report_expected_labels() {
        assert_eq!(parse_option::<HomeOwnership>("own"), Ok(HomeOwnership::Own));

        let err = parse_option::<HomeOwnership>("castle").expect_err("unknown option");
        assert!(err.contains("RENT, MORTGAGE, OWN"), "{err}");
    }
}
