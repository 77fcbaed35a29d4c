use super::util::{self, Booking};
use super::{Conflict, OverlapPair, Planner};
use crate::model::{AssignmentId, KitId};
use crate::window::{self, DateWindow};

/// Conflits de `window` avec les réservations de `kit_id`, hors `exclude`.
pub(super) fn conflicts_against(
    bookings: &[Booking],
    kit_id: &KitId,
    window: &DateWindow,
    exclude: Option<&AssignmentId>,
) -> Vec<Conflict> {
    bookings
        .iter()
        .filter(|b| &b.kit_id == kit_id)
        .filter(|b| exclude.is_none() || b.assignment_id.as_ref() != exclude)
        .filter(|b| window::overlaps(&b.window, window))
        .map(|b| Conflict {
            assignment_id: b.assignment_id.clone(),
            show_id: b.show_id.clone(),
            show_name: b.show_name.clone(),
            window: b.window,
            overlap_days: window::overlap_days(&b.window, window),
        })
        .collect()
}

pub(super) fn detect_conflicts(
    planner: &Planner,
    kit_id: &KitId,
    window: &DateWindow,
    exclude: Option<&AssignmentId>,
) -> Vec<Conflict> {
    let bookings = util::blocking_bookings(&planner.ledger, Some(kit_id));
    conflicts_against(&bookings, kit_id, window, exclude)
}

/// Toutes les paires d'affectations bloquantes qui se chevauchent sur un même kit.
pub(super) fn audit(planner: &Planner) -> Vec<OverlapPair> {
    let mut bookings = util::blocking_bookings(&planner.ledger, None);
    bookings.sort_by(|a, b| a.kit_id.cmp(&b.kit_id).then(a.window.start.cmp(&b.window.start)));

    let mut out = Vec::new();
    for (idx, a) in bookings.iter().enumerate() {
        for b in bookings.iter().skip(idx + 1) {
            if b.kit_id != a.kit_id {
                break;
            }
            if window::overlaps(&a.window, &b.window) {
                let (Some(id_a), Some(id_b)) = (&a.assignment_id, &b.assignment_id) else {
                    continue;
                };
                out.push(OverlapPair {
                    kit_id: a.kit_id.clone(),
                    assignment_a: id_a.clone(),
                    assignment_b: id_b.clone(),
                    overlap_days: window::overlap_days(&a.window, &b.window),
                });
            }
        }
    }
    out
}
