use time::{OffsetDateTime, PrimitiveDateTime};

/// Source of the wall-clock time stamped onto memos.
pub trait Clock {
    fn now(&self) -> PrimitiveDateTime;
}

/// Local time truncated to whole seconds, falling back to UTC when the local offset
/// cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let time = now.time();
        PrimitiveDateTime::new(now.date(), time.replace_nanosecond(0).unwrap_or(time))
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub PrimitiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}
