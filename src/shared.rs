//! Planner partagé entre plusieurs appelants (threads, requêtes concurrentes).
//!
//! Chaque écriture prend le verrou, revalide contre le ledger courant puis
//! écrit : la revalidation et l'écriture forment une seule section critique.

use crate::model::{AssignmentDates, AssignmentId, AssignmentStatus, KitId, OrgId, ShowId};
use crate::planner::{ApplyOutcome, AutoAssignReport, PlanError, Planner, SuggestOptions, Suggestion};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct SharedPlanner {
    inner: Arc<Mutex<Planner>>,
}

impl SharedPlanner {
    pub fn new(planner: Planner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(planner)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Planner>, PlanError> {
        self.inner
            .lock()
            .map_err(|_| PlanError::Other(anyhow::anyhow!("planner lock poisoned")))
    }

    /// Exécute `f` sous le verrou.
    pub fn with<R>(&self, f: impl FnOnce(&mut Planner) -> R) -> Result<R, PlanError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn auto_assign(&self, org: &OrgId, opts: &SuggestOptions) -> Result<AutoAssignReport, PlanError> {
        self.with(|p| p.auto_assign(org, opts))
    }

    pub fn apply_all(&self, suggestions: &[Suggestion]) -> Result<Vec<ApplyOutcome>, PlanError> {
        self.with(|p| p.apply_all(suggestions))
    }

    pub fn apply_selected(
        &self,
        suggestions: &[Suggestion],
        show_ids: &[ShowId],
    ) -> Result<Vec<ApplyOutcome>, PlanError> {
        self.with(|p| p.apply_selected(suggestions, show_ids))
    }

    pub fn assign_manual(
        &self,
        kit_id: &KitId,
        show_id: &ShowId,
        dates: AssignmentDates,
    ) -> Result<AssignmentId, PlanError> {
        self.with(|p| p.assign_manual(kit_id, show_id, dates))?
    }

    pub fn transition(&self, id: &AssignmentId, to: AssignmentStatus) -> Result<(), PlanError> {
        self.with(|p| p.transition(id, to))?
    }
}
