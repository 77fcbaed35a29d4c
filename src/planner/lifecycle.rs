use super::{util, PlanError, Planner};
use crate::model::{AssignmentDates, AssignmentId, AssignmentStatus};

/// Étape suivante du cycle nominal (sans l'annulation).
pub(super) fn next_status(from: AssignmentStatus) -> Option<AssignmentStatus> {
    match from {
        AssignmentStatus::Planned => Some(AssignmentStatus::Confirmed),
        AssignmentStatus::Confirmed => Some(AssignmentStatus::Shipped),
        AssignmentStatus::Shipped => Some(AssignmentStatus::AtVenue),
        AssignmentStatus::AtVenue => Some(AssignmentStatus::Returned),
        AssignmentStatus::Returned | AssignmentStatus::Cancelled => None,
    }
}

/// Date exigée pour entrer dans `status`, si elle manque.
pub(super) fn missing_date(status: AssignmentStatus, dates: &AssignmentDates) -> Option<&'static str> {
    match status {
        AssignmentStatus::Shipped if dates.ship_date.is_none() => Some("ship date"),
        AssignmentStatus::AtVenue if dates.arrival_date.is_none() => Some("arrival date"),
        AssignmentStatus::Returned if dates.return_arrival_date.is_none() => {
            Some("return arrival date")
        }
        _ => None,
    }
}

pub(super) fn transition(
    planner: &mut Planner,
    id: &AssignmentId,
    to: AssignmentStatus,
) -> Result<(), PlanError> {
    let Some(pos) = util::find_assignment_index(&planner.ledger, id) else {
        return Err(PlanError::UnknownAssignment(id.to_string()));
    };

    let assignment = &planner.ledger.assignments[pos];
    let from = assignment.status;
    let allowed = !from.is_terminal()
        && (to == AssignmentStatus::Cancelled || next_status(from) == Some(to));
    if !allowed {
        return Err(PlanError::InvalidTransition { from, to });
    }
    if let Some(missing) = missing_date(to, &assignment.dates) {
        return Err(PlanError::IncompleteTransition { to, missing });
    }

    planner.ledger.assignments[pos].status = to;
    tracing::info!(assignment = %id, %from, %to, "assignment transitioned");
    Ok(())
}
