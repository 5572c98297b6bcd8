//! Campaign launch state machine.
//!
//! ```text
//!            open_drawer (selection > 0)
//!   Idle ────────────────────────────────▶ DrawerOpen
//!    ▲  ◀──────────── cancel ─────────────┘    │ confirm_drawer (channel chosen)
//!    │  ◀──────────── cancel ──────────── ConfirmOpen
//!    │                                         │ confirm_launch
//!    └──────────── dismiss (outcome known) ── Running
//! ```
//!
//! Every transition method returns whether it applied; calls that do not
//! match the current state leave it untouched. No launch request is ever
//! produced outside [`CampaignFlow::confirm_launch`].

use std::fmt;

use crate::campaign::CampaignLaunchRequest;
use crate::channel::Channel;
use crate::lead::LeadId;
use crate::segment::Segment;

/// Position of the progress ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: u32,
    pub steps: u32,
}

impl Progress {
    /// Progress at `step` of `steps`; `steps` is at least one.
    pub fn new(step: u32, steps: u32) -> Self {
        let steps = steps.max(1);
        Self {
            step: step.min(steps),
            steps,
        }
    }

    /// Finished ticker.
    pub fn complete(steps: u32) -> Self {
        Self::new(steps, steps)
    }

    /// Whole percent, 0..=100.
    pub fn percent(self) -> u16 {
        u16::try_from(u64::from(self.step) * 100 / u64::from(self.steps)).unwrap_or(100)
    }

    /// `true` at the last step.
    pub fn is_complete(self) -> bool {
        self.step >= self.steps
    }
}

/// Parameters captured when the drawer is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLaunch {
    pub segment: Segment,
    pub channel: Channel,
    pub template_id: &'static str,
}

/// Result of a launch, once the backend has answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Succeeded,
    Failed(String),
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchOutcome::Succeeded => f.write_str("Campaign launched"),
            LaunchOutcome::Failed(reason) => write!(f, "Campaign launch failed: {reason}"),
        }
    }
}

/// Current screen of the launch flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    DrawerOpen {
        segment: Segment,
        template_id: &'static str,
        channel: Option<Channel>,
    },
    ConfirmOpen {
        pending: PendingLaunch,
        recipients: usize,
    },
    Running {
        request: CampaignLaunchRequest,
        progress: Progress,
        outcome: Option<LaunchOutcome>,
    },
}

/// The launch state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignFlow {
    state: FlowState,
}

impl CampaignFlow {
    /// A flow in [`FlowState::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// `true` in [`FlowState::Idle`].
    pub fn is_idle(&self) -> bool {
        matches!(self.state, FlowState::Idle)
    }

    /// `true` while a launch is in flight or its outcome is displayed.
    pub fn is_running(&self) -> bool {
        matches!(self.state, FlowState::Running { .. })
    }

    /// Open the channel drawer for `segment`.
    ///
    /// A no-op unless idle with at least one selected lead.
    pub fn open_drawer(&mut self, segment: Segment, selected: usize) -> bool {
        if !self.is_idle() || selected == 0 {
            return false;
        }
        self.state = FlowState::DrawerOpen {
            segment,
            template_id: segment.template_id(),
            channel: None,
        };
        true
    }

    /// Pick the channel inside the drawer.
    pub fn choose_channel(&mut self, chosen: Channel) -> bool {
        match &mut self.state {
            FlowState::DrawerOpen { channel, .. } => {
                *channel = Some(chosen);
                true
            }
            _ => false,
        }
    }

    /// Confirm the drawer; requires a chosen channel.
    pub fn confirm_drawer(&mut self, recipients: usize) -> bool {
        let FlowState::DrawerOpen {
            segment,
            template_id,
            channel: Some(channel),
        } = self.state
        else {
            return false;
        };
        self.state = FlowState::ConfirmOpen {
            pending: PendingLaunch {
                segment,
                channel,
                template_id,
            },
            recipients,
        };
        true
    }

    /// Close the drawer or the confirmation modal without launching.
    ///
    /// A running launch cannot be cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            FlowState::DrawerOpen { .. } | FlowState::ConfirmOpen { .. } => {
                self.state = FlowState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Confirm the launch and move to [`FlowState::Running`].
    ///
    /// Returns the request the caller must send, exactly once. `None` when
    /// not in [`FlowState::ConfirmOpen`] or when `lead_ids` is empty.
    pub fn confirm_launch(&mut self, lead_ids: Vec<LeadId>) -> Option<CampaignLaunchRequest> {
        let FlowState::ConfirmOpen { pending, .. } = self.state else {
            return None;
        };
        if lead_ids.is_empty() {
            return None;
        }
        let request = CampaignLaunchRequest {
            lead_ids,
            segment: pending.segment,
            channel: pending.channel,
            template_id: pending.template_id.to_string(),
        };
        self.state = FlowState::Running {
            request: request.clone(),
            progress: Progress::new(0, 1),
            outcome: None,
        };
        Some(request)
    }

    /// Record a ticker update. Ignored once the outcome is known.
    pub fn record_progress(&mut self, update: Progress) -> bool {
        match &mut self.state {
            FlowState::Running {
                progress,
                outcome: None,
                ..
            } => {
                *progress = update;
                true
            }
            _ => false,
        }
    }

    /// The backend accepted the launch.
    pub fn launch_succeeded(&mut self) -> bool {
        match &mut self.state {
            FlowState::Running {
                progress, outcome, ..
            } if outcome.is_none() => {
                *progress = Progress::complete(progress.steps);
                *outcome = Some(LaunchOutcome::Succeeded);
                true
            }
            _ => false,
        }
    }

    /// The backend rejected the launch or could not be reached.
    pub fn launch_failed(&mut self, reason: impl Into<String>) -> bool {
        match &mut self.state {
            FlowState::Running { outcome, .. } if outcome.is_none() => {
                *outcome = Some(LaunchOutcome::Failed(reason.into()));
                true
            }
            _ => false,
        }
    }

    /// Leave the finished launch screen and return to idle.
    ///
    /// Returns the outcome that was displayed; `None` (and no transition)
    /// while the launch is still in flight.
    pub fn dismiss(&mut self) -> Option<LaunchOutcome> {
        let FlowState::Running {
            outcome: Some(_), ..
        } = &self.state
        else {
            return None;
        };
        match std::mem::take(&mut self.state) {
            FlowState::Running { outcome, .. } => outcome,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<LeadId> {
        (0..n).map(|i| LeadId::new(&format!("L{i}"))).collect()
    }

    fn running_flow() -> CampaignFlow {
        let mut flow = CampaignFlow::new();
        assert!(flow.open_drawer(Segment::Warranty, 2));
        assert!(flow.choose_channel(Channel::Whatsapp));
        assert!(flow.confirm_drawer(2));
        flow.confirm_launch(ids(2)).unwrap();
        flow
    }

    #[test]
    fn zero_selection_does_not_open_drawer() {
        let mut flow = CampaignFlow::new();
        assert!(!flow.open_drawer(Segment::Routine, 0));
        assert!(flow.is_idle());
    }

    #[test]
    fn drawer_preselects_segment_template() {
        let mut flow = CampaignFlow::new();
        flow.open_drawer(Segment::Winback, 3);
        assert_eq!(
            flow.state(),
            &FlowState::DrawerOpen {
                segment: Segment::Winback,
                template_id: "WINBACK_OFFER",
                channel: None,
            }
        );
    }

    #[test]
    fn closing_drawer_without_channel_never_launches() {
        let mut flow = CampaignFlow::new();
        flow.open_drawer(Segment::Warranty, 4);
        assert!(!flow.confirm_drawer(4), "no channel chosen yet");
        assert!(flow.confirm_launch(ids(4)).is_none());
        assert!(flow.cancel());
        assert!(flow.is_idle());
        assert!(flow.confirm_launch(ids(4)).is_none());
    }

    #[test]
    fn cancelling_confirmation_returns_to_idle() {
        let mut flow = CampaignFlow::new();
        flow.open_drawer(Segment::Warranty, 1);
        flow.choose_channel(Channel::Voice);
        flow.confirm_drawer(1);
        assert!(matches!(flow.state(), FlowState::ConfirmOpen { recipients: 1, .. }));
        assert!(flow.cancel());
        assert!(flow.is_idle());
    }

    #[test]
    fn confirm_launch_builds_request_once() {
        let mut flow = CampaignFlow::new();
        flow.open_drawer(Segment::Warranty, 2);
        flow.choose_channel(Channel::Mix);
        flow.confirm_drawer(2);
        let req = flow.confirm_launch(ids(2)).unwrap();
        assert_eq!(req.segment, Segment::Warranty);
        assert_eq!(req.channel, Channel::Mix);
        assert_eq!(req.template_id, "WARRANTY_EXPIRY_URGENT");
        assert_eq!(req.lead_ids.len(), 2);
        assert!(flow.is_running());
        assert!(flow.confirm_launch(ids(2)).is_none());
    }

    #[test]
    fn running_cannot_be_cancelled_or_reopened() {
        let mut flow = running_flow();
        assert!(!flow.cancel());
        assert!(!flow.open_drawer(Segment::Warranty, 2));
        assert!(flow.is_running());
    }

    #[test]
    fn dismiss_waits_for_outcome() {
        let mut flow = running_flow();
        assert!(flow.record_progress(Progress::new(10, 50)));
        assert_eq!(flow.dismiss(), None);
        assert!(flow.is_running());
    }

    #[test]
    fn success_completes_progress() {
        let mut flow = running_flow();
        flow.record_progress(Progress::new(49, 50));
        assert!(flow.launch_succeeded());
        match flow.state() {
            FlowState::Running { progress, outcome, .. } => {
                assert_eq!(progress.percent(), 100);
                assert_eq!(outcome, &Some(LaunchOutcome::Succeeded));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(!flow.record_progress(Progress::new(1, 50)), "frozen after outcome");
        assert_eq!(flow.dismiss(), Some(LaunchOutcome::Succeeded));
        assert!(flow.is_idle());
    }

    #[test]
    fn failure_is_kept_until_dismissed() {
        let mut flow = running_flow();
        assert!(flow.launch_failed("HTTP 502"));
        assert!(!flow.launch_succeeded());
        assert_eq!(
            flow.dismiss(),
            Some(LaunchOutcome::Failed("HTTP 502".into()))
        );
    }

    #[test]
    fn progress_percent() {
        assert_eq!(Progress::new(0, 50).percent(), 0);
        assert_eq!(Progress::new(25, 50).percent(), 50);
        assert_eq!(Progress::new(49, 50).percent(), 98);
        assert_eq!(Progress::new(80, 50).percent(), 100);
        assert!(Progress::complete(50).is_complete());
        assert_eq!(Progress::new(0, 0).steps, 1);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(LaunchOutcome::Succeeded.to_string(), "Campaign launched");
        assert_eq!(
            LaunchOutcome::Failed("timeout".into()).to_string(),
            "Campaign launch failed: timeout"
        );
    }
}
