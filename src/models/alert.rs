//! Validity-end alert buckets
//!
//! An agreement's proximity to its validity end is classified into one of
//! four buckets, purely from the number of days left.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last day count (inclusive) that is still classified as red
pub const RED_THRESHOLD_DAYS: i64 = 30;

/// Last day count (inclusive) that is still classified as yellow
pub const YELLOW_THRESHOLD_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBucket {
    /// More than 90 days left
    Ok,
    /// 31 to 90 days left
    Yellow,
    /// 0 to 30 days left
    Red,
    /// Validity end already passed
    Expired,
}

impl AlertBucket {
    /// Dashboard order: healthiest first
    pub const ALL: [AlertBucket; 4] = [Self::Ok, Self::Yellow, Self::Red, Self::Expired];

    /// Classify a signed day difference (`validity_end - today`)
    pub fn classify(days_to_expire: i64) -> Self {
        if days_to_expire < 0 {
            Self::Expired
        } else if days_to_expire <= RED_THRESHOLD_DAYS {
            Self::Red
        } else if days_to_expire <= YELLOW_THRESHOLD_DAYS {
            Self::Yellow
        } else {
            Self::Ok
        }
    }

    /// Label used on dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK (>90d)",
            Self::Yellow => "Amarelo (≤90d)",
            Self::Red => "Vermelho (≤30d)",
            Self::Expired => "Vencido",
        }
    }

    /// Short badge text for a single record
    pub fn badge(&self, days_to_expire: i64) -> String {
        match self {
            Self::Expired => format!("VENCIDO ({}d)", days_to_expire),
            _ => format!("{} dias", days_to_expire),
        }
    }
}

impl fmt::Display for AlertBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Yellow => write!(f, "yellow"),
            Self::Red => write!(f, "red"),
            Self::Expired => write!(f, "expired"),
        }
    }
}
