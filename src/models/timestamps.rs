use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}

/// Entities carrying creation and modification times. The persistence layer
/// calls the hooks; setters never touch the timestamps.
pub trait Timestampable {
    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps().updated_at
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        *self.timestamps_mut() = Timestamps::at(now);
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.timestamps_mut().updated_at = now;
    }
}
