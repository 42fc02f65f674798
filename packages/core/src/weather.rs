//! Weather observation input and summary output.

use serde::{Deserialize, Serialize};

use crate::ProcessingError;

/// Longest summary accepted from the model, in characters.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Longest summary accepted from the model, in words.
pub const MAX_SUMMARY_WORDS: usize = 25;

/// Sky coverage reported with an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudCover {
    None,
    Partly,
    Full,
}

impl std::fmt::Display for CloudCover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudCover::None => write!(f, "none"),
            CloudCover::Partly => write!(f, "partly"),
            CloudCover::Full => write!(f, "full"),
        }
    }
}

/// A weather observation submitted for summarizing.
///
/// Field names on the wire follow the public API (`tempCelcius`,
/// `rainMmPerHour`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRequest {
    pub temp_celcius: f64,
    pub humidity: f64,
    pub rain_mm_per_hour: f64,
    pub wind_speed_mph: f64,
    pub clouds: CloudCover,
}

impl WeatherRequest {
    pub fn new(
        temp_celcius: f64,
        humidity: f64,
        rain_mm_per_hour: f64,
        wind_speed_mph: f64,
        clouds: CloudCover,
    ) -> Self {
        Self {
            temp_celcius,
            humidity,
            rain_mm_per_hour,
            wind_speed_mph,
            clouds,
        }
    }
}

/// One-sentence summary produced for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub summary: String,
}

impl WeatherSummary {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }

    /// Parse and validate raw model output.
    ///
    /// The output must be a JSON object with a `summary` string; extra keys
    /// are ignored.
    pub fn from_model_output(raw: &str) -> Result<Self, ProcessingError> {
        let parsed: WeatherSummary = serde_json::from_str(raw.trim())
            .map_err(|e| ProcessingError::InvalidOutput(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check the summary against its length and word limits.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        let chars = self.summary.chars().count();
        if chars > MAX_SUMMARY_CHARS {
            return Err(ProcessingError::SummaryTooLong { chars });
        }

        let words = self.summary.split_whitespace().count();
        if words > MAX_SUMMARY_WORDS {
            return Err(ProcessingError::TooManyWords { words });
        }

        Ok(())
    }
}
