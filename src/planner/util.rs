use super::PlanError;
use crate::model::{Assignment, AssignmentId, AssignmentStatus, KitId, Ledger, ShowId};
use crate::window::{self, DateWindow, WindowOverrides};

/// Réservation vue par le détecteur de conflits : une affectation du ledger
/// ou une suggestion retenue plus tôt dans le lot courant.
#[derive(Debug, Clone)]
pub(super) struct Booking {
    pub assignment_id: Option<AssignmentId>,
    pub kit_id: KitId,
    pub show_id: ShowId,
    pub show_name: String,
    pub status: AssignmentStatus,
    pub window: DateWindow,
}

/// Fenêtre tamponnée d'une affectation existante (dates explicites prioritaires).
pub(super) fn assignment_window(
    ledger: &Ledger,
    assignment: &Assignment,
) -> Result<DateWindow, PlanError> {
    let kit = ledger
        .find_kit(&assignment.kit_id)
        .ok_or_else(|| PlanError::UnknownKit(assignment.kit_id.to_string()))?;
    let show = ledger
        .find_show(&assignment.show_id)
        .ok_or_else(|| PlanError::UnknownShow(assignment.show_id.to_string()))?;
    window::buffered_window(show, kit, &WindowOverrides::from(&assignment.dates))
}

/// Réservations bloquantes du ledger, pour un kit ou pour tous.
pub(super) fn blocking_bookings(ledger: &Ledger, kit: Option<&KitId>) -> Vec<Booking> {
    ledger
        .assignments
        .iter()
        .filter(|a| a.status.is_blocking())
        .filter(|a| kit.map_or(true, |k| &a.kit_id == k))
        .filter_map(|a| match assignment_window(ledger, a) {
            Ok(window) => Some(Booking {
                assignment_id: Some(a.id.clone()),
                kit_id: a.kit_id.clone(),
                show_id: a.show_id.clone(),
                show_name: ledger
                    .find_show(&a.show_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                status: a.status,
                window,
            }),
            Err(err) => {
                tracing::warn!(assignment = %a.id, error = %err, "assignment window unresolved, ignored");
                None
            }
        })
        .collect()
}

pub(super) fn find_assignment_index(ledger: &Ledger, id: &AssignmentId) -> Option<usize> {
    ledger.assignments.iter().position(|a| &a.id == id)
}
