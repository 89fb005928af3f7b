/// Let an action through at most once per `delay_ms`
///
/// ELI5: a turnstile that locks for `delay_ms` after every pass
/// - first call goes straight through and locks the turnstile
/// - calls while locked are DROPPED, never queued for later
/// - once `delay_ms` has elapsed the next call goes through again
///
/// There is no timer running in the background : the owner hands in the
/// current time on every call, so a throttle can never fire on behalf of an
/// owner that no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    delay_ms: f64,
    last_fired: Option<f64>,
}

impl Throttle {
    pub fn new(delay_ms: f64) -> Self {
        Throttle {
            delay_ms,
            last_fired: None,
        }
    }

    pub fn is_armed(&self, now: f64) -> bool {
        match self.last_fired {
            None => true,
            Some(fired_at) => now - fired_at >= self.delay_ms,
        }
    }

    /// Run `action` if the throttle is armed at `now`
    /// # Returns
    /// * `true`  - action ran
    /// * `false` - call dropped
    pub fn call<F: FnOnce()>(&mut self, now: f64, action: F) -> bool {
        if !self.is_armed(now) {
            return false;
        }
        action();
        self.last_fired = Some(now);
        true
    }
}
