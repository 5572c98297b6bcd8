//! State of the campaign dashboard screen.
//!
//! [`Dashboard`] ties the active segment, its lead page, the selection and
//! the launch [`CampaignFlow`] together and keeps the selection invariant:
//! every selected id belongs to the displayed page of the active segment.

use std::collections::BTreeSet;

use crate::campaign::CampaignLaunchRequest;
use crate::channel::Channel;
use crate::flow::{CampaignFlow, FlowState, LaunchOutcome, Progress};
use crate::lead::{Lead, LeadId, LeadPage};
use crate::pricing::CampaignQuote;
use crate::segment::Segment;
use crate::template::PlaceholderValues;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    segment: Segment,
    page: Option<LeadPage>,
    selection: BTreeSet<LeadId>,
    flow: CampaignFlow,
}

impl Dashboard {
    /// Dashboard showing `segment`, with no leads loaded yet.
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            ..Self::default()
        }
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Loaded page, `None` while loading.
    pub fn page(&self) -> Option<&LeadPage> {
        self.page.as_ref()
    }

    /// Displayed leads; empty while loading.
    pub fn leads(&self) -> &[Lead] {
        self.page
            .as_ref()
            .map(|p| p.customers.as_slice())
            .unwrap_or(&[])
    }

    pub fn flow(&self) -> &CampaignFlow {
        &self.flow
    }

    // ── Segment & leads ──────────────────────────────────────────────

    /// Switch tabs. Clears the selection and the displayed page.
    ///
    /// Refused while the drawer or the confirmation modal is open.
    pub fn switch_segment(&mut self, segment: Segment) -> bool {
        if matches!(
            self.flow.state(),
            FlowState::DrawerOpen { .. } | FlowState::ConfirmOpen { .. }
        ) {
            return false;
        }
        if segment == self.segment {
            return false;
        }
        self.segment = segment;
        self.page = None;
        self.selection.clear();
        true
    }

    /// Install a freshly loaded page.
    ///
    /// Pages for another segment are stale and dropped. Selected ids that
    /// are no longer displayed are deselected.
    pub fn replace_leads(&mut self, segment: Segment, page: LeadPage) -> bool {
        if segment != self.segment {
            return false;
        }
        self.selection.retain(|id| page.contains(id));
        self.page = Some(page);
        true
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Flip selection of a displayed lead.
    pub fn toggle(&mut self, id: &LeadId) -> bool {
        if !self.is_displayed(id) {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
        true
    }

    /// Select every displayed lead.
    pub fn select_all(&mut self) {
        self.selection = self.leads().iter().map(|l| l.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// `true` when every displayed lead is selected (and there is at least one).
    pub fn all_selected(&self) -> bool {
        !self.leads().is_empty() && self.selection.len() == self.leads().len()
    }

    pub fn is_selected(&self, id: &LeadId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Selected leads in display order.
    pub fn selected_leads(&self) -> Vec<&Lead> {
        self.leads()
            .iter()
            .filter(|l| self.selection.contains(&l.id))
            .collect()
    }

    /// Selected ids in display order.
    pub fn selected_ids(&self) -> Vec<LeadId> {
        self.selected_leads().into_iter().map(|l| l.id.clone()).collect()
    }

    fn is_displayed(&self, id: &LeadId) -> bool {
        self.page.as_ref().is_some_and(|p| p.contains(id))
    }

    // ── Drawer content ───────────────────────────────────────────────

    /// Price the current selection on `channel`.
    pub fn quote(&self, channel: Channel) -> CampaignQuote {
        CampaignQuote::new(channel, self.selected_leads())
    }

    /// Message preview for the active segment's template, filled in with the
    /// first selected lead or with sample data when nothing is selected.
    pub fn preview(&self, booking_base_url: &str) -> String {
        let template = self.segment.template();
        match self.selected_leads().first() {
            Some(lead) => template.render(&PlaceholderValues::for_lead(lead, booking_base_url)),
            None => template.render(&PlaceholderValues::sample()),
        }
    }

    // ── Launch flow ──────────────────────────────────────────────────

    /// Open the channel drawer; a no-op with an empty selection.
    pub fn open_drawer(&mut self) -> bool {
        self.flow.open_drawer(self.segment, self.selection.len())
    }

    pub fn choose_channel(&mut self, channel: Channel) -> bool {
        self.flow.choose_channel(channel)
    }

    pub fn confirm_drawer(&mut self) -> bool {
        self.flow.confirm_drawer(self.selection.len())
    }

    pub fn cancel(&mut self) -> bool {
        self.flow.cancel()
    }

    /// Start the launch; returns the request to send.
    pub fn confirm_launch(&mut self) -> Option<CampaignLaunchRequest> {
        let ids = self.selected_ids();
        self.flow.confirm_launch(ids)
    }

    pub fn record_progress(&mut self, progress: Progress) -> bool {
        self.flow.record_progress(progress)
    }

    pub fn launch_succeeded(&mut self) -> bool {
        self.flow.launch_succeeded()
    }

    pub fn launch_failed(&mut self, reason: impl Into<String>) -> bool {
        self.flow.launch_failed(reason)
    }

    /// Return to idle after a finished launch.
    ///
    /// A successful launch clears the selection; after a failure the
    /// selection is kept so the dealer can retry.
    pub fn dismiss(&mut self) -> Option<LaunchOutcome> {
        let outcome = self.flow.dismiss()?;
        if outcome == LaunchOutcome::Succeeded {
            self.selection.clear();
        }
        Some(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
