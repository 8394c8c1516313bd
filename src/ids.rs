//! Identity and time assignment for new entities.

use uuid::Uuid;

/// Kind of entity an id is minted for. Each kind has its own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Review,
    Subtask,
    Report,
    Image,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Review => "review",
            EntityKind::Subtask => "subtask",
            EntityKind::Report => "report",
            EntityKind::Image => "img",
        }
    }
}

/// Source of fresh entity ids.
pub trait IdGenerator {
    fn next_id(&mut self, kind: EntityKind) -> String;
}

/// UUIDv7 ids: `task-0190c6f2-…`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, kind: EntityKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::now_v7())
    }
}

/// Sequential ids: `task-1`, `review-2`, … Deterministic, for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: EntityKind) -> String {
        self.next += 1;
        format!("{}-{}", kind.prefix(), self.next)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Source of command timestamps.
pub trait Clock {
    fn now(&mut self) -> i64;
}

/// Wall clock that never goes backwards, even if the system clock does.
#[derive(Debug, Default, Clone)]
pub struct SystemClock {
    last: i64,
}

impl Clock for SystemClock {
    fn now(&mut self) -> i64 {
        self.last = self.last.max(now_ms());
        self.last
    }
}

/// A clock that advances by a fixed step on every read.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: i64,
    step: i64,
}

impl ManualClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self { now: start, step }
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> i64 {
        let now = self.now;
        self.now += self.step;
        now
    }
}
