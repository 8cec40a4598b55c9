//! # Progress Reporting
//!
//! While a render request is in flight the service exposes a percentage on a
//! separate endpoint. We poll it on a fixed interval, concurrently with the
//! request, and feed the result into a [`ProgressDisplay`].
//!
//! ## Display rules
//!
//! | Raw percent | Bar width | Label |
//! |-------------|-----------|-------|
//! | 0 (just started) | full, animated | `Processing...` |
//! | 0 < p < 100 | `min(p, cap)` | `NN%` |
//! | 100 | 100 | `Complete` |
//!
//! Downloads leave headroom for the archive steps: server progress is scaled
//! by [`ProgressPolicy::download_scale`], a finished render shows
//! [`ProgressPolicy::download_finished`], and the client then marks
//! `rendered` and `prepared` itself before the final 100.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::client::MergeService;

/// Which server-side job a progress endpoint reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Preview,
    Download,
}

/// Caps and fixed marks for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressPolicy {
    /// Highest width shown while the job is still running.
    pub cap: f64,
    /// Multiplier on server progress during a download render.
    pub download_scale: f64,
    /// Shown when the download render reports 100.
    pub download_finished: f64,
    /// Shown once every record has been rendered.
    pub rendered: f64,
    /// Shown once the archive has been prepared.
    pub prepared: f64,
}

impl ProgressPolicy {
    pub const COMBINED: Self = Self {
        cap: 95.0,
        download_scale: 0.9,
        download_finished: 95.0,
        rendered: 96.0,
        prepared: 98.0,
    };

    /// Map a raw server percentage to what the bar should be fed.
    pub fn scale(&self, kind: ProgressKind, raw: f64) -> f64 {
        match kind {
            ProgressKind::Preview => raw,
            ProgressKind::Download if raw < 100.0 => raw * self.download_scale,
            ProgressKind::Download => self.download_finished,
        }
    }
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self::COMBINED
    }
}

/// State of one progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDisplay {
    policy: ProgressPolicy,
    visible: bool,
    indeterminate: bool,
    width: f64,
    label: String,
}

impl ProgressDisplay {
    pub fn new(policy: ProgressPolicy) -> Self {
        Self {
            policy,
            visible: false,
            indeterminate: false,
            width: 0.0,
            label: String::new(),
        }
    }

    /// Show the bar in its animated "working" state.
    pub fn show(&mut self) {
        self.visible = true;
        self.indeterminate = true;
        self.width = 100.0;
        self.label = "Processing...".to_string();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn update(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        if percent > 0.0 {
            self.indeterminate = false;
        }
        if self.indeterminate {
            return;
        }
        self.width = if percent < 100.0 {
            percent.min(self.policy.cap)
        } else {
            100.0
        };
        self.label = if percent < 100.0 {
            format!("{}%", self.width.round())
        } else {
            "Complete".to_string()
        };
    }

    pub fn policy(&self) -> &ProgressPolicy {
        &self.policy
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    /// Bar width in percent.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Run `work` while polling `kind` progress into `display` every `every`.
///
/// Polling starts one interval after `work` does and stops when `work`
/// completes, the service reports 100, the service has no progress endpoint
/// for `kind`, or a poll fails. Poll failures are logged, never returned.
pub async fn track<S, F, T>(
    service: &S,
    kind: ProgressKind,
    every: Duration,
    display: &mut ProgressDisplay,
    work: F,
) -> T
where
    S: MergeService + ?Sized,
    F: Future<Output = T>,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let work = async move {
        let out = work.await;
        let _ = stop_tx.send(());
        out
    };
    let (out, ()) = tokio::join!(work, poll(service, kind, every, display, stop_rx));
    out
}

async fn poll<S>(
    service: &S,
    kind: ProgressKind,
    every: Duration,
    display: &mut ProgressDisplay,
    mut stop: oneshot::Receiver<()>,
) where
    S: MergeService + ?Sized,
{
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let raw = tokio::select! {
            _ = &mut stop => return,
            raw = async {
                ticker.tick().await;
                service.progress(kind).await
            } => raw,
        };
        match raw {
            Ok(Some(raw)) => {
                let shown = display.policy().scale(kind, raw);
                display.update(shown);
                debug!("{:?} progress {} -> {}", kind, raw, display.label());
                if raw >= 100.0 {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!("Error checking {:?} progress: {}", kind, e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indeterminate_until_real_progress() {
        let mut d = ProgressDisplay::new(ProgressPolicy::COMBINED);
        d.show();
        d.update(0.0);
        assert!(d.is_visible());
        assert!(d.is_indeterminate());
        assert_eq!(d.label(), "Processing...");

        d.update(42.4);
        assert!(!d.is_indeterminate());
        assert_eq!(d.width(), 42.4);
        assert_eq!(d.label(), "42%");
    }

    #[test]
    fn test_capped_below_complete() {
        let mut d = ProgressDisplay::new(ProgressPolicy::COMBINED);
        d.show();
        d.update(99.0);
        assert_eq!(d.width(), 95.0);
        assert_eq!(d.label(), "95%");
        d.update(100.0);
        assert_eq!(d.width(), 100.0);
        assert_eq!(d.label(), "Complete");
    }

    #[test]
    fn test_custom_cap() {
        let policy = ProgressPolicy {
            cap: 80.0,
            ..ProgressPolicy::COMBINED
        };
        let mut d = ProgressDisplay::new(policy);
        d.show();
        d.update(90.0);
        assert_eq!(d.label(), "80%");
    }

    #[test]
    fn test_download_scaling() {
        let p = ProgressPolicy::COMBINED;
        assert_eq!(p.scale(ProgressKind::Preview, 50.0), 50.0);
        assert_eq!(p.scale(ProgressKind::Download, 50.0), 45.0);
        assert_eq!(p.scale(ProgressKind::Download, 100.0), 95.0);
    }

    #[test]
    fn test_hide_keeps_last_value() {
        let mut d = ProgressDisplay::new(ProgressPolicy::COMBINED);
        d.show();
        d.update(30.0);
        d.hide();
        assert!(!d.is_visible());
        assert_eq!(d.label(), "30%");
    }
}
