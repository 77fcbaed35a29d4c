use super::{conflicts, lifecycle, util, ApplyOutcome, Leg, PlanError, Planner, Suggestion};
use crate::model::{
    Assignment, AssignmentDates, AssignmentId, AssignmentStatus, KitId, Ledger, ShowId,
};
use crate::window::{self, DateWindow, WindowOverrides};

pub(super) fn apply_suggestions(
    planner: &mut Planner,
    suggestions: &[Suggestion],
) -> Vec<ApplyOutcome> {
    suggestions
        .iter()
        .map(|s| ApplyOutcome {
            show_id: s.show_id.clone(),
            kit_id: s.kit_id.clone(),
            result: apply_one(planner, s),
        })
        .collect()
}

/// Revalide une suggestion contre le ledger courant puis l'écrit.
///
/// Rejouer une suggestion déjà appliquée renvoie l'affectation existante.
fn apply_one(planner: &mut Planner, suggestion: &Suggestion) -> Result<AssignmentId, PlanError> {
    let kit = planner.active_kit(&suggestion.kit_id)?;
    let show = planner
        .ledger
        .find_show(&suggestion.show_id)
        .ok_or_else(|| PlanError::UnknownShow(suggestion.show_id.to_string()))?;

    if let Some(existing) = planner.ledger.assignments.iter().find(|a| {
        a.show_id == suggestion.show_id
            && a.kit_id == suggestion.kit_id
            && a.status != AssignmentStatus::Cancelled
    }) {
        return Ok(existing.id.clone());
    }
    if planner.ledger.show_has_active_assignment(&suggestion.show_id) {
        return Err(PlanError::ShowAlreadyAssigned(suggestion.show_id.to_string()));
    }

    if show.start != Some(suggestion.show_dates.start) || show.end != Some(suggestion.show_dates.end) {
        tracing::warn!(show = %show.id, "show dates moved since suggestion");
        return Err(PlanError::StaleSuggestion {
            show: suggestion.show_id.clone(),
            kit: suggestion.kit_id.clone(),
            conflicts: Vec::new(),
        });
    }
    let default_window = window::buffered_window(show, kit, &WindowOverrides::default())?;

    let live = conflicts::detect_conflicts(planner, &suggestion.kit_id, &suggestion.window, None);
    if !live.is_empty() {
        tracing::warn!(
            show = %suggestion.show_id,
            kit = %suggestion.kit_id,
            conflicts = live.len(),
            "suggestion rejected at apply time"
        );
        if suggestion.conflicts.is_empty() {
            return Err(PlanError::StaleSuggestion {
                show: suggestion.show_id.clone(),
                kit: suggestion.kit_id.clone(),
                conflicts: live,
            });
        }
        return Err(PlanError::ConflictDetected {
            kit: suggestion.kit_id.clone(),
            window: suggestion.window,
            conflicts: live,
        });
    }

    let mut assignment = Assignment::new(suggestion.kit_id.clone(), suggestion.show_id.clone());
    if suggestion.window != default_window {
        assignment.dates.ship_date = Some(suggestion.window.start);
        assignment.dates.return_arrival_date = Some(suggestion.window.end);
    }
    assignment.ai_recommended = true;
    assignment.ai_recommendation_reason = Some(suggestion.reason.clone());
    assignment.ai_confidence = Some(suggestion.confidence);

    let id = assignment.id.clone();
    planner.ledger.assignments.push(assignment);
    tracing::info!(assignment = %id, show = %suggestion.show_id, kit = %suggestion.kit_id, "suggestion applied");
    Ok(id)
}

pub(super) fn assign_manual(
    planner: &mut Planner,
    kit_id: &KitId,
    show_id: &ShowId,
    dates: AssignmentDates,
) -> Result<AssignmentId, PlanError> {
    let kit = planner.active_kit(kit_id)?;
    let show = planner
        .ledger
        .find_show(show_id)
        .ok_or_else(|| PlanError::UnknownShow(show_id.to_string()))?;
    let window = window::buffered_window(show, kit, &WindowOverrides::from(&dates))?;
    ensure_free(planner, kit_id, window, None)?;

    let mut assignment = Assignment::new(kit_id.clone(), show_id.clone());
    assignment.dates = dates;
    let id = assignment.id.clone();
    planner.ledger.assignments.push(assignment);
    tracing::info!(assignment = %id, show = %show_id, kit = %kit_id, %window, "manual assignment");
    Ok(id)
}

/// Remplace les dates logistiques ; une fenêtre modifiée repasse par le
/// détecteur de conflits.
pub(super) fn update_dates(
    planner: &mut Planner,
    id: &AssignmentId,
    dates: AssignmentDates,
) -> Result<(), PlanError> {
    let pos = open_assignment_index(planner, id)?;
    let current = &planner.ledger.assignments[pos];
    if let Some(missing) = lifecycle::missing_date(current.status, &dates) {
        return Err(PlanError::IncompleteTransition {
            to: current.status,
            missing,
        });
    }

    let old_window = util::assignment_window(&planner.ledger, current)?;
    let mut edited = current.clone();
    edited.dates = dates;
    let new_window = util::assignment_window(&planner.ledger, &edited)?;
    if new_window != old_window {
        ensure_free(planner, &edited.kit_id, new_window, Some(id))?;
    }

    planner.ledger.assignments[pos] = edited;
    Ok(())
}

pub(super) fn reassign_kit(
    planner: &mut Planner,
    id: &AssignmentId,
    kit_id: &KitId,
) -> Result<(), PlanError> {
    let pos = open_assignment_index(planner, id)?;
    planner.active_kit(kit_id)?;

    let mut moved = planner.ledger.assignments[pos].clone();
    moved.kit_id = kit_id.clone();
    let window = util::assignment_window(&planner.ledger, &moved)?;
    ensure_free(planner, kit_id, window, Some(id))?;

    planner.ledger.assignments[pos] = moved;
    tracing::info!(assignment = %id, kit = %kit_id, "assignment moved to another kit");
    Ok(())
}

pub(super) fn set_tracking(
    planner: &mut Planner,
    id: &AssignmentId,
    leg: Leg,
    carrier: Option<String>,
    tracking: Option<String>,
) -> Result<(), PlanError> {
    let pos = open_assignment_index(planner, id)?;
    let assignment = &mut planner.ledger.assignments[pos];
    let (carrier_slot, tracking_slot) = match leg {
        Leg::Outbound => (&mut assignment.outbound_carrier, &mut assignment.outbound_tracking),
        Leg::Return => (&mut assignment.return_carrier, &mut assignment.return_tracking),
    };
    if carrier.is_some() {
        *carrier_slot = carrier;
    }
    if tracking.is_some() {
        *tracking_slot = tracking;
    }
    Ok(())
}

pub(super) fn retire_kit(
    planner: &mut Planner,
    kit_id: &KitId,
    as_of: chrono::NaiveDate,
) -> Result<(), PlanError> {
    if planner.ledger.find_kit(kit_id).is_none() {
        return Err(PlanError::UnknownKit(kit_id.to_string()));
    }
    let in_use = util::blocking_bookings(&planner.ledger, Some(kit_id))
        .iter()
        .any(|b| b.window.end >= as_of);
    if in_use {
        return Err(PlanError::KitInUse(kit_id.to_string()));
    }
    if let Some(kit) = planner.ledger.find_kit_mut(kit_id) {
        kit.active = false;
    }
    tracing::info!(kit = %kit_id, "kit retired");
    Ok(())
}

/// Revalide, dans un ledger candidat où un salon ou un kit a été remplacé,
/// chaque affectation ouverte que `touches` désigne.
pub(super) fn ensure_windows_hold(
    candidate: &Ledger,
    touches: impl Fn(&Assignment) -> bool,
) -> Result<(), PlanError> {
    let bookings = util::blocking_bookings(candidate, None);
    for assignment in candidate
        .assignments
        .iter()
        .filter(|a| a.status.is_blocking() && touches(a))
    {
        let window = util::assignment_window(candidate, assignment)?;
        let found =
            conflicts::conflicts_against(&bookings, &assignment.kit_id, &window, Some(&assignment.id));
        if !found.is_empty() {
            tracing::warn!(
                assignment = %assignment.id,
                kit = %assignment.kit_id,
                %window,
                conflicts = found.len(),
                "catalog update rejected"
            );
            return Err(PlanError::ConflictDetected {
                kit: assignment.kit_id.clone(),
                window,
                conflicts: found,
            });
        }
    }
    Ok(())
}

/// Unique porte d'entrée avant toute écriture qui crée ou déplace une fenêtre.
fn ensure_free(
    planner: &Planner,
    kit_id: &KitId,
    window: DateWindow,
    exclude: Option<&AssignmentId>,
) -> Result<(), PlanError> {
    let found = conflicts::detect_conflicts(planner, kit_id, &window, exclude);
    if found.is_empty() {
        return Ok(());
    }
    tracing::warn!(kit = %kit_id, %window, conflicts = found.len(), "write rejected");
    Err(PlanError::ConflictDetected {
        kit: kit_id.clone(),
        window,
        conflicts: found,
    })
}

fn open_assignment_index(planner: &Planner, id: &AssignmentId) -> Result<usize, PlanError> {
    let pos = util::find_assignment_index(&planner.ledger, id)
        .ok_or_else(|| PlanError::UnknownAssignment(id.to_string()))?;
    if planner.ledger.assignments[pos].status.is_terminal() {
        return Err(PlanError::AssignmentClosed(id.to_string()));
    }
    Ok(pos)
}
