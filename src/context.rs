//! Per-operation context: who is acting and what time it is.
//!
//! Services never read the wall clock or an ambient user directly. Every
//! mutating operation receives an [`OperationContext`] so that seal
//! timestamps and `created_by`/`sealed_by` stamps are deterministic in tests.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct OperationContext {
    /// Acting user, if the call is attributable to one.
    pub actor_id: Option<Uuid>,
    clock: Arc<dyn Clock>,
}

impl OperationContext {
    pub fn new(actor_id: Option<Uuid>, clock: Arc<dyn Clock>) -> Self {
        Self { actor_id, clock }
    }

    /// Context for unattributed work driven by the system clock.
    pub fn system() -> Self {
        Self::new(None, Arc::new(SystemClock))
    }

    pub fn for_actor(actor_id: Uuid) -> Self {
        Self::new(Some(actor_id), Arc::new(SystemClock))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("actor_id", &self.actor_id)
            .field("now", &self.clock.now())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let actor = Uuid::new_v4();
        let ctx = OperationContext::for_actor(actor).with_clock(Arc::new(FixedClock(instant)));

        assert_eq!(ctx.now(), instant);
        assert_eq!(ctx.now(), ctx.now());
        assert_eq!(ctx.actor_id, Some(actor));
    }

    #[test]
    fn system_context_has_no_actor() {
        assert!(OperationContext::system().actor_id.is_none());
    }
}
