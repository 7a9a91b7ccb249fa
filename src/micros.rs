use core::{
    ops::{Add, AddAssign},
    time::Duration,
};

#[doc = r#"
A point on the playback clock, in whole microseconds since the start of a session.

```rust
# use scorestream::UMicros;
use std::time::Duration;

let t = UMicros::new(1_500) + UMicros::new(250);
assert_eq!(t.as_millis(), 1);
assert_eq!(Duration::from(t), Duration::from_micros(1_750));
```
"#]
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UMicros(u64);

impl UMicros {
    /// Start of the clock
    pub const ZERO: Self = Self(0);

    /// `micros` microseconds
    #[inline]
    pub const fn new(micros: u64) -> Self {
        Self(micros)
    }

    /// Whole microseconds
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Whole milliseconds, rounded down
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Time from `earlier` to `self`, or zero if `earlier` is later
    #[inline]
    pub const fn since(&self, earlier: Self) -> Self {
        Self(self.0.saturating_sub(earlier.0))
    }
}

impl Add for UMicros {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for UMicros {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl From<UMicros> for Duration {
    fn from(value: UMicros) -> Self {
        Duration::from_micros(value.0)
    }
}

#[test]
fn clock_arithmetic() {
    assert_eq!(UMicros::new(1_999).as_millis(), 1);
    assert_eq!(UMicros::new(10).since(UMicros::new(20)), UMicros::ZERO);
    assert_eq!(UMicros::new(u64::MAX) + UMicros::new(1), UMicros::new(u64::MAX));
    let mut t = UMicros::ZERO;
    t += UMicros::new(7);
    assert_eq!(t.as_micros(), 7);
}
