use crate::labels::CropLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Payload handed to the surveillance collaborator on a confident disease
/// detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub label: CropLabel,
    pub confidence: f32,
    pub location: Option<GeoPoint>,
}

/// Hook for the external disease-reporting transport. The pipeline only
/// decides *when* to report; delivery belongs to the implementor.
pub trait DetectionReporter: Send + Sync {
    fn report(&self, report: &DetectionReport) -> anyhow::Result<()>;
}

impl<F> DetectionReporter for F
where
    F: Fn(&DetectionReport) -> anyhow::Result<()> + Send + Sync,
{
    fn report(&self, report: &DetectionReport) -> anyhow::Result<()> {
        self(report)
    }
}

/// Writes reports to the log. Used when no transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl DetectionReporter for LogReporter {
    fn report(&self, report: &DetectionReport) -> anyhow::Result<()> {
        tracing::info!(
            label = %report.label,
            confidence = report.confidence,
            latitude = report.location.map(|l| l.latitude),
            longitude = report.location.map(|l| l.longitude),
            "Disease detection reported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_reporters() {
        let seen = Mutex::new(Vec::new());
        let reporter = |report: &DetectionReport| -> anyhow::Result<()> {
            seen.lock().unwrap().push(report.label);
            Ok(())
        };

        let report = DetectionReport {
            label: CropLabel::BrownRust,
            confidence: 0.8,
            location: None,
        };
        reporter.report(&report).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![CropLabel::BrownRust]);
    }

    #[test]
    fn report_serializes_location() {
        let report = DetectionReport {
            label: CropLabel::Mildew,
            confidence: 0.75,
            location: Some(GeoPoint {
                latitude: 28.6,
                longitude: 77.2,
            }),
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["label"], "Mildew");
        assert_eq!(json["location"]["latitude"], 28.6);
    }

    #[test]
    fn log_reporter_never_fails() {
        let report = DetectionReport {
            label: CropLabel::Septoria,
            confidence: 0.9,
            location: None,
        };
        assert!(LogReporter.report(&report).is_ok());
    }
}
