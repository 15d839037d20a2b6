// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Sources of the current time for trip timestamps and token lifetimes.

use time::OffsetDateTime;

/// Drops any precision finer than microseconds from `now`.
///
/// Trip creation times are stored in the database with microsecond resolution, so anything finer
/// would not survive a round trip.
fn truncate_to_micros(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_nanosecond(now.nanosecond() / 1000 * 1000).unwrap_or(now)
}

/// Source of the current time.
pub trait Clock {
    /// Returns the current UTC time with microsecond resolution.
    fn now_utc(&self) -> OffsetDateTime;

    /// Returns the current UTC time with the sub-second part dropped.
    ///
    /// Access tokens carry their timestamps in whole seconds.
    fn now_utc_secs(&self) -> OffsetDateTime {
        let now = self.now_utc();
        now.replace_nanosecond(0).unwrap_or(now)
    }
}

/// Clock backed by the system's wall time.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        truncate_to_micros(OffsetDateTime::now_utc())
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Panics if `now` carries more precision than the database can store.
    fn check_micros(now: OffsetDateTime) -> OffsetDateTime {
        assert_eq!(now, truncate_to_micros(now), "Sub-microsecond precision not supported");
        now
    }

    /// A clock frozen at a given instant until a test moves it.
    pub struct SettableClock {
        now: Mutex<OffsetDateTime>,
    }

    impl SettableClock {
        /// Creates a new clock frozen at `now`.
        pub fn new(now: OffsetDateTime) -> Self {
            Self { now: Mutex::from(check_micros(now)) }
        }

        /// Moves the clock to `now`, which may be in the past.
        pub fn set(&self, now: OffsetDateTime) {
            *self.now.lock().unwrap() = check_micros(now);
        }

        /// Moves the clock forward by `delta`.
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = check_micros(*now + delta);
        }
    }

    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            *self.now.lock().unwrap()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::panic::catch_unwind;
        use time::macros::datetime;

        #[test]
        fn test_settableclock_keeps_trip_timestamps() {
            let departure = datetime!(2023-07-01 06:30:00.250000 UTC);
            let clock = SettableClock::new(departure);
            assert_eq!(departure, clock.now_utc());
            assert_eq!(departure, clock.now_utc());

            let arrival = datetime!(2023-07-01 18:45:10.000001 UTC);
            clock.set(arrival);
            assert_eq!(arrival, clock.now_utc());

            clock.set(departure);
            assert_eq!(departure, clock.now_utc());
        }

        #[test]
        fn test_settableclock_advance_crosses_days() {
            let clock = SettableClock::new(datetime!(2023-12-31 23:30:00 UTC));
            clock.advance(Duration::from_secs(45 * 60));
            assert_eq!(datetime!(2024-01-01 00:15:00 UTC), clock.now_utc());
            clock.advance(Duration::from_micros(3));
            assert_eq!(datetime!(2024-01-01 00:15:00.000003 UTC), clock.now_utc());
        }

        #[test]
        fn test_settableclock_rejects_nanoseconds() {
            catch_unwind(|| {
                SettableClock::new(datetime!(2023-07-01 06:30:00.000000500 UTC));
            })
            .unwrap_err();

            let clock = SettableClock::new(datetime!(2023-07-01 06:30:00 UTC));
            catch_unwind(|| clock.set(datetime!(2023-07-01 06:30:00.000000001 UTC)))
                .unwrap_err();
            catch_unwind(|| clock.advance(Duration::from_nanos(10))).unwrap_err();
        }

        #[test]
        fn test_settableclock_now_utc_secs() {
            let clock = SettableClock::new(datetime!(2023-07-01 06:30:59.999999 UTC));
            assert_eq!(datetime!(2023-07-01 06:30:59 UTC), clock.now_utc_secs());
            assert_eq!(datetime!(2023-07-01 06:30:59.999999 UTC), clock.now_utc());
        }
    }
}
