//! Course payload and price conversion.

use super::Time;
use crate::{CourseId, Principal};
use serde::{Deserialize, Serialize};

/// Number of e8s in one ICP.
pub const E8S_PER_ICP: u64 = 100_000_000;

/// A marketplace course as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    /// Creator principal, assigned by the backend from the caller.
    pub creator: Principal,
    pub thumbnail_url: String,
    /// Price in e8s.
    pub price: u64,
    pub enrollment_count: u64,
    pub created_at: Time,
}

impl Course {
    /// Returns the price in ICP.
    #[must_use]
    pub fn price_icp(&self) -> f64 {
        e8s_to_icp(self.price)
    }

    /// Renders the price the way course cards show it (`"1.50 ICP"`).
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("{:.2} ICP", self.price_icp())
    }
}

/// Converts an ICP amount to e8s, rounding to the nearest unit.
///
/// Returns `None` for negative or non-finite amounts.
#[must_use]
pub fn icp_to_e8s(icp: f64) -> Option<u64> {
    if !icp.is_finite() || icp < 0.0 {
        return None;
    }
    let e8s = (icp * E8S_PER_ICP as f64).round();
    if e8s > u64::MAX as f64 {
        return None;
    }
    Some(e8s as u64)
}

/// Converts e8s to an ICP amount.
#[must_use]
pub fn e8s_to_icp(e8s: u64) -> f64 {
    e8s as f64 / E8S_PER_ICP as f64
}
