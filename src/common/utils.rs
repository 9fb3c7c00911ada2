use log::{error, info};
use serde::Serializer;
use std::time::Duration;

/// Number of decimal places kept for every floating-point artifact field
pub const FLOAT_PRECISION: i32 = 6;

/// Format a duration as "1h 2m 3.4s", dropping leading zero units
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total % 3600.0) / 60.0).floor() as u64;
    let seconds = total % 60.0;

    if hours > 0 {
        format!("{}h {}m {:.1}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:.1}s", minutes, seconds)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Size the global rayon pool; 0 means one thread per core. Returns the thread count.
pub fn configure_thread_pool(threads: usize) -> usize {
    let num_threads = if threads == 0 {
        let cores = num_cpus::get();
        info!("Auto-detected {} CPU cores. Using {} threads.", cores, cores);
        cores
    } else {
        info!("Using specified {} threads.", threads);
        threads
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        error!("Failed to build thread pool: {}. Using default.", e);
    }
    num_threads
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    // Avoid emitting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round to the artifact precision
pub fn round6(value: f64) -> f64 {
    round_to(value, FLOAT_PRECISION)
}

/// serde helper: serialize an optional f64 rounded to the artifact precision
pub fn serialize_rounded_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round6(*v)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round6() {
        assert_eq!(round6(0.123456789), 0.123457);
        assert_eq!(round6(1.0), 1.0);
        assert_eq!(round6(-0.0000001), 0.0);
        assert_eq!(round6(f64::NAN), 0.0);
    }

    #[test]
    fn test_round_to_two_places() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666, 2), 66.67);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5.0s");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "1h 2m 5.0s");
    }

    #[test]
    fn test_serialize_rounded_opt() {
        #[derive(serde::Serialize)]
        struct Row {
            #[serde(serialize_with = "serialize_rounded_opt")]
            score: Option<f64>,
            #[serde(serialize_with = "serialize_rounded_opt")]
            maybe: Option<f64>,
        }

        let json = serde_json::to_string(&Row { score: Some(0.1234567), maybe: None }).unwrap();
        assert_eq!(json, r#"{"score":0.123457,"maybe":null}"#);
    }
}
