//! Descriptive statistics over the loaded network.

pub mod crossborder;

pub use crossborder::{join_countries, CrossBorderReport, JoinedPipeline};

use crate::models::Pipeline;

/// Largest finite value, if any.
pub fn max_finite(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Divide every value by the finite maximum of the slice.
///
/// Results fall in [0, 1], with the maximum itself mapping to exactly 1.0.
/// Non-finite entries, and every entry when no positive maximum exists,
/// map to 0.0.
pub fn normalized(values: &[f64]) -> Vec<f64> {
    let max = match max_finite(values.iter().copied()) {
        Some(m) if m > 0.0 => m,
        _ => return vec![0.0; values.len()],
    };

    values
        .iter()
        .map(|v| {
            if v.is_finite() {
                (v / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// All pipelines whose rated pressure equals the dataset maximum.
///
/// Ties are reported together rather than broken arbitrarily.
pub fn max_pressure_pipelines(pipelines: &[Pipeline]) -> Vec<&Pipeline> {
    let max = match max_finite(pipelines.iter().map(|p| p.max_pressure_bar)) {
        Some(m) => m,
        None => return Vec::new(),
    };

    pipelines
        .iter()
        .filter(|p| p.max_pressure_bar == max)
        .collect()
}

/// Percentage of pipelines flagged as bidirectional, in [0, 100].
pub fn bidirectional_share(pipelines: &[Pipeline]) -> f64 {
    if pipelines.is_empty() {
        return 0.0;
    }

    let bidirectional = pipelines.iter().filter(|p| p.is_bidirectional).count();
    bidirectional as f64 / pipelines.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString};

    fn pipeline(id: &str, bus0: &str, bus1: &str, pressure: f64) -> Pipeline {
        Pipeline {
            id: id.to_string(),
            bus0: bus0.to_string(),
            bus1: bus1.to_string(),
            max_cap_m_m3_per_d: 10.0,
            max_pressure_bar: pressure,
            is_bidirectional: false,
            geometry: LineString::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
            ]),
        }
    }

    #[test]
    fn test_normalized_bounds() {
        let values = [20.0, 5.0, 80.0, 40.0];
        let norm = normalized(&values);

        assert!(norm.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(norm[2], 1.0);
        assert_eq!(norm[1], 5.0 / 80.0);
    }

    #[test]
    fn test_normalized_degenerate_inputs() {
        assert!(normalized(&[]).is_empty());
        assert_eq!(normalized(&[f64::NAN, f64::INFINITY]), vec![0.0, 0.0]);
        assert_eq!(normalized(&[0.0, 0.0]), vec![0.0, 0.0]);
        // A NaN row among valid ones maps to 0 without poisoning the rest
        assert_eq!(normalized(&[f64::NAN, 50.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_max_pressure_selects_argmax() {
        let pipelines = vec![
            pipeline("a", "A", "B", 80.0),
            pipeline("b", "C", "D", 120.0),
            pipeline("c", "E", "F", 95.0),
        ];

        let max = max_pressure_pipelines(&pipelines);
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].id, "b");
        assert_eq!(max[0].max_pressure_bar, 120.0);
    }

    #[test]
    fn test_max_pressure_reports_ties() {
        let pipelines = vec![
            pipeline("a", "A", "B", 120.0),
            pipeline("b", "C", "D", 120.0),
            pipeline("c", "E", "F", 95.0),
        ];

        let max = max_pressure_pipelines(&pipelines);
        let ids: Vec<&str> = max.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_max_pressure_empty() {
        assert!(max_pressure_pipelines(&[]).is_empty());
    }

    #[test]
    fn test_bidirectional_share() {
        let mut pipelines = vec![
            pipeline("a", "A", "B", 80.0),
            pipeline("b", "C", "D", 90.0),
            pipeline("c", "E", "F", 95.0),
            pipeline("d", "G", "H", 70.0),
        ];
        pipelines[0].is_bidirectional = true;

        let share = bidirectional_share(&pipelines);
        assert_eq!(share, 25.0);
        assert!((0.0..=100.0).contains(&share));
    }

    #[test]
    fn test_bidirectional_share_empty() {
        assert_eq!(bidirectional_share(&[]), 0.0);
    }
}
