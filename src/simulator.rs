//! Investment plan simulator.
//!
//! Backs the plan calculator on the marketing site: visitors move sliders for
//! the investment, daily return, duration and downline figures, and the page
//! shows what the compensation plan would pay. The numbers are illustrative
//! only.

use serde::{Deserialize, Serialize};

pub const MAX_LEVELS: usize = 10;

/// Slider values submitted by the calculator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    pub investment: f64,
    pub daily_roi_percent: f64,
    pub duration_days: u32,
    #[serde(default)]
    pub direct_referrals: u32,
    #[serde(default)]
    pub referral_commission_percent: f64,
    /// Commission percentage paid per downline level, level 1 first
    #[serde(default)]
    pub level_percents: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProjection {
    pub daily_return: f64,
    pub total_return: f64,
    pub referral_income: f64,
    pub level_income: Vec<f64>,
    pub total_income: f64,
    /// Total income divided by the investment
    pub roi_multiple: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulatorError {
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("at most 10 commission levels are supported")]
    TooManyLevels,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), SimulatorError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SimulatorError::OutOfRange { field, min, max })
    }
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PlanInput {
    /// Enforce the calculator's slider bounds.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        check_range("investment", self.investment, 10.0, 1_000_000.0)?;
        check_range("dailyRoiPercent", self.daily_roi_percent, 0.0, 10.0)?;
        check_range("durationDays", f64::from(self.duration_days), 1.0, 3650.0)?;
        check_range("directReferrals", f64::from(self.direct_referrals), 0.0, 10_000.0)?;
        check_range("referralCommissionPercent", self.referral_commission_percent, 0.0, 100.0)?;

        if self.level_percents.len() > MAX_LEVELS {
            return Err(SimulatorError::TooManyLevels);
        }
        for percent in &self.level_percents {
            check_range("levelPercents", *percent, 0.0, 100.0)?;
        }
        Ok(())
    }
}

/// Project earnings for a plan.
///
/// Each direct referral is assumed to invest the same amount as the visitor;
/// level commissions apply that same volume at every level.
pub fn project(input: &PlanInput) -> Result<PlanProjection, SimulatorError> {
    input.validate()?;

    let daily_return = input.investment * input.daily_roi_percent / 100.0;
    let total_return = daily_return * f64::from(input.duration_days);

    let referral_volume = input.investment * f64::from(input.direct_referrals);
    let referral_income = referral_volume * input.referral_commission_percent / 100.0;

    let level_income: Vec<f64> = input
        .level_percents
        .iter()
        .map(|percent| cents(referral_volume * percent / 100.0))
        .collect();

    let total_income = total_return + referral_income + level_income.iter().sum::<f64>();

    Ok(PlanProjection {
        daily_return: cents(daily_return),
        total_return: cents(total_return),
        referral_income: cents(referral_income),
        level_income,
        total_income: cents(total_income),
        roi_multiple: cents(total_income / input.investment),
    })
}
