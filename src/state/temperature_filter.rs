// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debouncing of spurious ambient temperature readings.

/// Outcome of feeding one reading into a [`TemperatureFilter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOutcome {
    /// The reading became the accepted value.
    Accepted(f64),
    /// The reading jumped too far from the accepted value and was discarded.
    Rejected {
        /// The discarded reading.
        reading: f64,
        /// Consecutive rejections so far.
        consecutive: u8,
    },
    /// The reading lies outside the plausible band.
    OutOfRange(f64),
}

/// Rejects isolated temperature spikes.
///
/// A reading more than [`MAX_JUMP_C`](Self::MAX_JUMP_C) away from the last
/// accepted value is discarded, unless it is the
/// [`ACCEPT_AFTER`](Self::ACCEPT_AFTER)-th such reading in a row, in which
/// case the jump is taken as real.
///
/// # Examples
///
/// ```
/// use mertik_lib::state::{FilterOutcome, TemperatureFilter};
///
/// let mut filter = TemperatureFilter::new();
/// assert_eq!(filter.feed(20.0), FilterOutcome::Accepted(20.0));
/// assert!(matches!(filter.feed(28.0), FilterOutcome::Rejected { .. }));
/// assert!(matches!(filter.feed(28.0), FilterOutcome::Rejected { .. }));
/// assert_eq!(filter.feed(28.0), FilterOutcome::Accepted(28.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemperatureFilter {
    last_accepted: Option<f64>,
    consecutive_outliers: u8,
}

impl TemperatureFilter {
    /// Largest jump accepted without debouncing, in °C.
    pub const MAX_JUMP_C: f64 = 5.0;

    /// The outlier that reaches this count is accepted.
    pub const ACCEPT_AFTER: u8 = 3;

    const INITIAL_MIN_C: f64 = 0.0;
    const INITIAL_MAX_C: f64 = 60.0;
    const PLAUSIBLE_MIN_C: f64 = 1.0;
    const PLAUSIBLE_MAX_C: f64 = 50.0;

    /// Creates a filter with no accepted reading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last accepted reading.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.last_accepted
    }

    /// Returns the number of consecutive rejected outliers.
    #[must_use]
    pub fn consecutive_outliers(&self) -> u8 {
        self.consecutive_outliers
    }

    /// Feeds a raw reading and returns what happened to it.
    pub fn feed(&mut self, reading: f64) -> FilterOutcome {
        let Some(last) = self.last_accepted else {
            if (Self::INITIAL_MIN_C..=Self::INITIAL_MAX_C).contains(&reading) {
                return self.accept(reading);
            }
            return FilterOutcome::OutOfRange(reading);
        };

        if reading <= Self::PLAUSIBLE_MIN_C || reading >= Self::PLAUSIBLE_MAX_C {
            return FilterOutcome::OutOfRange(reading);
        }

        if (reading - last).abs() > Self::MAX_JUMP_C {
            self.consecutive_outliers = self.consecutive_outliers.saturating_add(1);
            if self.consecutive_outliers < Self::ACCEPT_AFTER {
                return FilterOutcome::Rejected {
                    reading,
                    consecutive: self.consecutive_outliers,
                };
            }
        }

        self.accept(reading)
    }

    fn accept(&mut self, reading: f64) -> FilterOutcome {
        self.last_accepted = Some(reading);
        self.consecutive_outliers = 0;
        FilterOutcome::Accepted(reading)
    }
}
