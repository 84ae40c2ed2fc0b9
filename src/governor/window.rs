//! One-second admission window.
//
// The window start (unix seconds as u32) and the admitted count share one
// AtomicU64, so rollover and claim are a single compare-and-swap. Seconds past
// u32::MAX (year 2106) saturate into one last window instead of wrapping.

use std::sync::atomic::{AtomicU64, Ordering};

use super::spec::TraceRateSpec;

#[inline]
fn pack(window: u32, count: u32) -> u64 {
    (u64::from(window) << 32) | u64::from(count)
}

#[inline]
fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

/// Per (category, regime) window state.
#[derive(Debug, Default)]
pub struct WindowCounter {
    state: AtomicU64,
}

impl WindowCounter {
    pub fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
        }
    }

    /// Tries to claim one admission in the window containing `now_secs`.
    ///
    /// A window older than `now_secs` is rolled to `(now_secs, 0)` by whichever
    /// caller wins the CAS; the others observe the new window on retry.
    pub fn try_admit(&self, now_secs: u64, spec: &TraceRateSpec, hash_selected: bool) -> bool {
        let now = u32::try_from(now_secs).unwrap_or(u32::MAX);
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            let (window, count) = unpack(cur);
            let (window, count) = if now > window { (now, 0) } else { (window, count) };

            let admit = count < u32::MAX && spec.admits(count, hash_selected);
            let next = if admit {
                pack(window, count + 1)
            } else {
                pack(window, count)
            };
            if next == cur {
                return false;
            }

            match self
                .state
                .compare_exchange_weak(cur, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return admit,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Window start and admitted count as last stored.
    pub fn snapshot(&self) -> (u32, u32) {
        unpack(self.state.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000;

    #[test]
    fn test_rollover_resets_count() {
        let w = WindowCounter::new();
        let spec = TraceRateSpec::new(2, 0, 0, true);

        assert!(w.try_admit(T0, &spec, false));
        assert!(w.try_admit(T0, &spec, false));
        assert!(!w.try_admit(T0, &spec, false));

        assert!(w.try_admit(T0 + 1, &spec, false));
        assert_eq!(w.snapshot(), ((T0 + 1) as u32, 1));
    }

    #[test]
    fn test_denied_call_still_rolls_window() {
        let w = WindowCounter::new();
        let deny_all = TraceRateSpec::new(1, 0, 0, false);

        assert!(!w.try_admit(T0, &deny_all, false));
        assert_eq!(w.snapshot(), (T0 as u32, 0));
    }

    #[test]
    fn test_clock_going_back_keeps_current_window() {
        let w = WindowCounter::new();
        let spec = TraceRateSpec::new(1, 0, 0, true);

        assert!(w.try_admit(T0, &spec, false));
        assert!(!w.try_admit(T0 - 1, &spec, false));
        assert_eq!(w.snapshot(), (T0 as u32, 1));
    }

    #[test]
    fn test_seconds_past_u32_saturate_instead_of_wrapping() {
        let w = WindowCounter::new();
        let spec = TraceRateSpec::new(1, 0, 0, true);
        let last = u64::from(u32::MAX);

        assert!(w.try_admit(last - 1, &spec, false));
        assert!(w.try_admit(last + 5, &spec, false));
        assert_eq!(w.snapshot(), (u32::MAX, 1));

        // Every later second shares the saturated window and its cap.
        assert!(!w.try_admit(last + (1 << 32), &spec, false));
        assert_eq!(w.snapshot(), (u32::MAX, 1));
    }
}
