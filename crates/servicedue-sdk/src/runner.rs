//! Campaign launch runner.
//!
//! One tokio task per launch races the progress ticker against the launch
//! request. The ticker walks up to the second-to-last step and holds there;
//! only the real outcome moves the bar to 100 % (success) or ends the run
//! with [`LaunchEvent::Failed`].
//!
//! ```text
//! Progress(0) … Progress(n-1) ─┬─ ok  ─▶ Progress(n), Completed, (hold) Dismissed
//!                              └─ err ─▶ Failed
//! ```

use std::future::Future;

use servicedue_models::{LaunchReceipt, Progress};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::ProgressConfig;
use crate::error::SdkError;

/// What the runner reports to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    Progress(Progress),
    /// The backend accepted the launch.
    Completed(LaunchReceipt),
    /// The launch failed. `signed_out` is set when the backend rejected
    /// the session, so the caller should forget it.
    Failed { message: String, signed_out: bool },
    /// The success hold elapsed; the UI returns to idle.
    Dismissed,
}

/// Drives one launch.
pub struct CampaignRunner;

impl CampaignRunner {
    /// Spawn the runner for `launch` and return its event stream.
    ///
    /// The stream ends after [`LaunchEvent::Dismissed`] or
    /// [`LaunchEvent::Failed`]. Dropping the receiver does not cancel the
    /// launch request.
    pub fn spawn<F>(launch: F, config: ProgressConfig) -> mpsc::UnboundedReceiver<LaunchEvent>
    where
        F: Future<Output = Result<LaunchReceipt, SdkError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(launch, config, tx));
        rx
    }
}

async fn run<F>(launch: F, config: ProgressConfig, tx: mpsc::UnboundedSender<LaunchEvent>)
where
    F: Future<Output = Result<LaunchReceipt, SdkError>>,
{
    let steps = config.steps.max(1);
    let mut ticker = tokio::time::interval(config.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    // Send errors only mean the UI went away; the launch still runs to the end.
    let emit = |event: LaunchEvent| {
        let _ = tx.send(event);
    };

    emit(LaunchEvent::Progress(Progress::new(0, steps)));

    tokio::pin!(launch);
    let mut step = 0;
    let result = loop {
        tokio::select! {
            biased;
            result = &mut launch => break result,
            _ = ticker.tick(), if step + 1 < steps => {
                step += 1;
                emit(LaunchEvent::Progress(Progress::new(step, steps)));
            }
        }
    };

    match result {
        Ok(receipt) => {
            info!(
                campaign_id = receipt.campaign_id.as_deref().unwrap_or("-"),
                queued = receipt.queued,
                "campaign launched"
            );
            emit(LaunchEvent::Progress(Progress::complete(steps)));
            emit(LaunchEvent::Completed(receipt));
            tokio::time::sleep(config.hold).await;
            emit(LaunchEvent::Dismissed);
        }
        Err(e) => {
            error!(error = %e, "campaign launch failed");
            emit(LaunchEvent::Failed {
                message: e.banner(),
                signed_out: e.is_auth_failure(),
            });
        }
    }
}
