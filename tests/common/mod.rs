#![allow(dead_code)]

use hifitime::Epoch;
use ndastro::{ndastro::Ndastro, time::days_between};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Façade over the built-in analytic ephemeris: no kernel file needed.
pub fn analytic() -> Ndastro {
    init_logger();
    Ndastro::new("analytic").unwrap()
}

pub fn assert_epoch_near(actual: Epoch, expected: Epoch, tolerance_days: f64) {
    let diff = days_between(&expected, &actual).abs();
    assert!(
        diff <= tolerance_days,
        "{actual} is {:.2} minutes away from {expected}",
        diff * 1440.0
    );
}

pub fn hours_between(from: &Epoch, to: &Epoch) -> f64 {
    days_between(from, to) * 24.0
}
