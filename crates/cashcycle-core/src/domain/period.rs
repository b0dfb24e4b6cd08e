use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Which report a snapshot is taken from.
///
/// Both periods are converted to days with the same 365-day factor; a
/// quarterly snapshot therefore reads as an annualised day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    /// Latest fiscal year.
    #[default]
    Annual,
    /// Most recent reported quarter.
    Quarterly,
}

impl ReportingPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl Display for ReportingPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportingPeriod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" | "fy" => Ok(Self::Annual),
            "quarterly" | "quarter" | "mrq" => Ok(Self::Quarterly),
            other => Err(ValidationError::InvalidPeriod {
                value: other.to_owned(),
            }),
        }
    }
}
