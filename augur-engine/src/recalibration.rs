//! Background recalibration: a cancellable task that periodically refits
//! the Platt calibrator on the accumulated sample window.
//!
//! In-flight predictions keep using the previously calibrated model until
//! the store performs its guarded atomic swap; a regressing or cancelled
//! fit never mutates live state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use augur_core::errors::AugurError;
use augur_core::traits::{MetricEvent, MetricsSink};
use augur_scoring::calibration::CalibrationStore;

pub struct RecalibrationScheduler {
    cancel: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RecalibrationScheduler {
    /// Spawn the periodic recalibration task. The first pass runs after one
    /// full interval, not at startup; a fresh engine has no samples worth
    /// fitting.
    pub fn spawn(
        store: Arc<CalibrationStore>,
        metrics: Arc<dyn MetricsSink>,
        interval: Duration,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task_cancel = Arc::clone(&cancel);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of a tokio interval fires immediately; skip it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        task_cancel.store(false, Ordering::Relaxed);
                        run_once(&store, metrics.as_ref(), &task_cancel);
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        Self {
            cancel,
            shutdown,
            handle,
        }
    }

    /// Cooperatively cancel an in-flight fit; partial progress is
    /// discarded, the active model stays as it was.
    pub fn cancel_in_flight(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Stop the scheduler, cancelling any in-flight fit first.
    pub async fn shutdown(self) {
        self.cancel.store(true, Ordering::Relaxed);
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

fn run_once(store: &CalibrationStore, metrics: &dyn MetricsSink, cancel: &AtomicBool) {
    match store.try_recalibrate(cancel) {
        Ok(report) => {
            info!(
                samples = report.samples,
                brier_before = report.brier_before,
                brier_after = report.brier_after,
                cv_brier = report.cv_brier,
                "scheduled recalibration complete"
            );
            metrics.record(MetricEvent::Recalibrated {
                brier_before: report.brier_before,
                brier_after: report.brier_after,
                samples: report.samples,
            });
        }
        Err(AugurError::InsufficientCalibrationData { required, available }) => {
            debug!(required, available, "recalibration skipped, not enough samples");
        }
        Err(AugurError::CalibrationCancelled) => {
            debug!("recalibration cancelled, partial progress discarded");
        }
        Err(error) => {
            warn!(%error, "recalibration aborted, active model unchanged");
        }
    }
}
