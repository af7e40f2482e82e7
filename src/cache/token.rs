use chrono::{DateTime, Duration, Utc};

/// Short-lived bearer credential issued by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Time left before the token enters the safety margin.
    pub fn remaining(&self, now: DateTime<Utc>, safety_margin: Duration) -> Duration {
        self.expires_at - (now + safety_margin)
    }

    /// Check if token can still be served at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>, safety_margin: Duration) -> bool {
        self.remaining(now, safety_margin) > Duration::zero()
    }
}
