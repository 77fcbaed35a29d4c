mod apply;
mod availability;
mod conflicts;
mod lifecycle;
pub mod suggest;
mod types;
mod util;

pub use types::{
    AlternativeKit, ApplyOutcome, Availability, AutoAssignReport, Conflict, Leg, OverlapPair,
    PlanError, SuggestOptions, Suggestion, Unassignable, UpcomingAssignment,
};

use crate::catalog;
use crate::model::{
    AssignmentDates, AssignmentId, AssignmentStatus, Kit, KitId, KitType, Ledger, OrgId, Show,
    ShowId,
};
use crate::window::DateWindow;
use chrono::NaiveDate;

/// Planner : encapsule le Ledger et porte tous les chemins d'écriture.
#[derive(Debug, Default)]
pub struct Planner {
    ledger: Ledger,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            ledger: Ledger::default(),
        }
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Ajoute ou remplace un kit après validation de ses champs.
    ///
    /// Changer les délais d'un kit déplace les fenêtres de ses affectations
    /// ouvertes : elles sont revalidées avant tout remplacement.
    pub fn upsert_kit(&mut self, kit: Kit) -> Result<KitId, PlanError> {
        catalog::validate_kit(&kit)?;
        let id = kit.id.clone();
        let mut candidate = self.ledger.clone();
        match candidate.find_kit_mut(&id) {
            Some(existing) => *existing = kit,
            None => candidate.kits.push(kit),
        }
        apply::ensure_windows_hold(&candidate, |a| a.kit_id == id)?;
        self.ledger = candidate;
        Ok(id)
    }

    /// Synchronise un salon venant du calendrier (remplacement par id).
    ///
    /// Des dates déplacées ne sont acceptées que si les affectations ouvertes
    /// du salon restent sans chevauchement.
    pub fn upsert_show(&mut self, show: Show) -> Result<ShowId, PlanError> {
        let id = show.id.clone();
        let mut candidate = self.ledger.clone();
        match candidate.shows.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = show,
            None => candidate.shows.push(show),
        }
        apply::ensure_windows_hold(&candidate, |a| a.show_id == id)?;
        self.ledger = candidate;
        Ok(id)
    }

    pub fn active_kits(&self, org: &OrgId, kit_type: Option<KitType>) -> Vec<&Kit> {
        catalog::active_kits(&self.ledger.kits, org, kit_type)
    }

    pub fn assignment_window(&self, id: &AssignmentId) -> Result<DateWindow, PlanError> {
        let assignment = self
            .ledger
            .find_assignment(id)
            .ok_or_else(|| PlanError::UnknownAssignment(id.to_string()))?;
        util::assignment_window(&self.ledger, assignment)
    }

    pub fn detect_conflicts(
        &self,
        kit_id: &KitId,
        window: &DateWindow,
        exclude: Option<&AssignmentId>,
    ) -> Vec<Conflict> {
        conflicts::detect_conflicts(self, kit_id, window, exclude)
    }

    pub fn check_availability(
        &self,
        kit_id: &KitId,
        window: &DateWindow,
        exclude: Option<&AssignmentId>,
    ) -> bool {
        self.detect_conflicts(kit_id, window, exclude).is_empty()
    }

    pub fn availability(&self, kit_id: &KitId, as_of: NaiveDate) -> Result<Availability, PlanError> {
        availability::availability(self, kit_id, as_of)
    }

    pub fn availability_report(&self, org: &OrgId, as_of: NaiveDate) -> Vec<Availability> {
        availability::availability_report(self, org, as_of)
    }

    pub fn auto_assign(&self, org: &OrgId, opts: &SuggestOptions) -> AutoAssignReport {
        suggest::auto_assign(&self.ledger, org, opts)
    }

    pub fn apply_all(&mut self, suggestions: &[Suggestion]) -> Vec<ApplyOutcome> {
        apply::apply_suggestions(self, suggestions)
    }

    /// Applique uniquement les suggestions des salons listés.
    pub fn apply_selected(
        &mut self,
        suggestions: &[Suggestion],
        show_ids: &[ShowId],
    ) -> Vec<ApplyOutcome> {
        let picked: Vec<Suggestion> = suggestions
            .iter()
            .filter(|s| show_ids.contains(&s.show_id))
            .cloned()
            .collect();
        apply::apply_suggestions(self, &picked)
    }

    pub fn assign_manual(
        &mut self,
        kit_id: &KitId,
        show_id: &ShowId,
        dates: AssignmentDates,
    ) -> Result<AssignmentId, PlanError> {
        apply::assign_manual(self, kit_id, show_id, dates)
    }

    pub fn update_dates(
        &mut self,
        id: &AssignmentId,
        dates: AssignmentDates,
    ) -> Result<(), PlanError> {
        apply::update_dates(self, id, dates)
    }

    pub fn reassign_kit(&mut self, id: &AssignmentId, kit_id: &KitId) -> Result<(), PlanError> {
        apply::reassign_kit(self, id, kit_id)
    }

    pub fn set_tracking(
        &mut self,
        id: &AssignmentId,
        leg: Leg,
        carrier: Option<String>,
        tracking: Option<String>,
    ) -> Result<(), PlanError> {
        apply::set_tracking(self, id, leg, carrier, tracking)
    }

    pub fn transition(&mut self, id: &AssignmentId, to: AssignmentStatus) -> Result<(), PlanError> {
        lifecycle::transition(self, id, to)
    }

    pub fn cancel(&mut self, id: &AssignmentId) -> Result<(), PlanError> {
        lifecycle::transition(self, id, AssignmentStatus::Cancelled)
    }

    pub fn retire_kit(&mut self, kit_id: &KitId, as_of: NaiveDate) -> Result<(), PlanError> {
        apply::retire_kit(self, kit_id, as_of)
    }

    pub fn audit(&self) -> Vec<OverlapPair> {
        conflicts::audit(self)
    }

    fn active_kit(&self, kit_id: &KitId) -> Result<&Kit, PlanError> {
        let kit = self
            .ledger
            .find_kit(kit_id)
            .ok_or_else(|| PlanError::UnknownKit(kit_id.to_string()))?;
        if !kit.active {
            return Err(PlanError::KitInactive(kit_id.to_string()));
        }
        Ok(kit)
    }
}
