use std::time::{Duration, Instant};

/// An unanswered bulk instance request
pub struct InstanceListRequest {
    request_id: u32,
    sent_at: Instant,
    attempts: u32,
}

impl InstanceListRequest {
    pub fn new(request_id: u32, now: Instant) -> Self {
        Self {
            request_id,
            sent_at: now,
            attempts: 1,
        }
    }

    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.sent_at) >= timeout
    }

    /// Records a re-send under a new request id, so that a late answer to an
    /// earlier attempt is not mistaken for the current one
    pub fn resend(&mut self, request_id: u32, now: Instant) {
        self.request_id = request_id;
        self.sent_at = now;
        self.attempts += 1;
    }
}
