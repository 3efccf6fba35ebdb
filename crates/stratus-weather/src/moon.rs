//! Moon phase calculation.
//!
//! Days elapsed since a reference new moon (2000-01-06), modulo the synodic
//! period of 29.53 days, bucketed into the eight named phases. Illumination
//! is approximated by a sinusoid of the phase fraction.

use chrono::NaiveDate;

/// Length of the synodic month in days
const SYNODIC_PERIOD: f64 = 29.53;

/// One computed lunar phase
#[derive(Debug, Clone, PartialEq)]
pub struct MoonPhase {
    pub name: &'static str,
    pub emoji: &'static str,
    /// Illuminated fraction as a whole percentage, 0-100
    pub illumination: u8,
    /// Days into the current cycle, `0.0..SYNODIC_PERIOD`
    pub phase_day: f64,
}

/// Named phase buckets over the cycle, `[start, end)` in days
const PHASES: [(&str, &str, f64, f64); 8] = [
    ("New Moon", "\u{1F311}", 0.0, 1.84),
    ("Waxing Crescent", "\u{1F312}", 1.84, 7.38),
    ("First Quarter", "\u{1F313}", 7.38, 9.23),
    ("Waxing Gibbous", "\u{1F314}", 9.23, 14.77),
    ("Full Moon", "\u{1F315}", 14.77, 16.61),
    ("Waning Gibbous", "\u{1F316}", 16.61, 22.15),
    ("Last Quarter", "\u{1F317}", 22.15, 23.99),
    ("Waning Crescent", "\u{1F318}", 23.99, SYNODIC_PERIOD),
];

/// Reference new moon used as the cycle epoch.
fn reference_new_moon() -> NaiveDate {
    // 2000-01-06 is in range for NaiveDate, so the fallback never triggers;
    // it keeps the function total without a panic path.
    NaiveDate::from_ymd_opt(2000, 1, 6).unwrap_or(NaiveDate::MIN)
}

/// Compute the lunar phase for a calendar date.
pub fn phase_on(date: NaiveDate) -> MoonPhase {
    let days_since = (date - reference_new_moon()).num_days() as f64;
    let phase_day = days_since.rem_euclid(SYNODIC_PERIOD);

    let (name, emoji) = PHASES
        .iter()
        .find(|(_, _, start, end)| phase_day >= *start && phase_day < *end)
        .map(|(name, emoji, _, _)| (*name, *emoji))
        .unwrap_or((PHASES[0].0, PHASES[0].1));

    let fraction = phase_day / SYNODIC_PERIOD;
    let illumination =
        (((fraction * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2).sin() + 1.0) / 2.0
            * 100.0)
            .round() as u8;

    MoonPhase {
        name,
        emoji,
        illumination,
        phase_day,
    }
}
