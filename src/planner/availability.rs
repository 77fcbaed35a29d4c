use super::util::{self, Booking};
use super::{Availability, PlanError, Planner, UpcomingAssignment};
use crate::catalog;
use crate::model::{AssignmentStatus, KitId, KitStatus, OrgId};
use chrono::NaiveDate;

pub(super) fn availability(
    planner: &Planner,
    kit_id: &KitId,
    as_of: NaiveDate,
) -> Result<Availability, PlanError> {
    let kit = planner
        .ledger
        .find_kit(kit_id)
        .ok_or_else(|| PlanError::UnknownKit(kit_id.to_string()))?;

    let bookings = util::blocking_bookings(&planner.ledger, Some(kit_id));
    let current = bookings.iter().find(|b| b.window.contains(as_of));
    let next = bookings
        .iter()
        .filter(|b| b.window.start > as_of)
        .min_by_key(|b| (b.window.start, b.assignment_id.clone()));

    let status = match (kit.status, current) {
        (KitStatus::Maintenance, _) => KitStatus::Maintenance,
        (_, Some(b)) => occupied_status(b),
        (_, None) => KitStatus::Available,
    };
    let available_from = current.map_or(as_of, |b| b.window.end.succ_opt().unwrap_or(b.window.end));

    Ok(Availability {
        kit_id: kit.id.clone(),
        status,
        current_location: kit.current_location.clone(),
        current_assignment: current.and_then(|b| b.assignment_id.clone()),
        next_assignment: next.and_then(|b| {
            Some(UpcomingAssignment {
                assignment_id: b.assignment_id.clone()?,
                show_id: b.show_id.clone(),
                show_name: b.show_name.clone(),
                window: b.window,
            })
        }),
        available_from,
    })
}

pub(super) fn availability_report(
    planner: &Planner,
    org: &OrgId,
    as_of: NaiveDate,
) -> Vec<Availability> {
    catalog::active_kits(&planner.ledger.kits, org, None)
        .into_iter()
        .filter_map(|kit| availability(planner, &kit.id, as_of).ok())
        .collect()
}

fn occupied_status(booking: &Booking) -> KitStatus {
    match booking.status {
        AssignmentStatus::Shipped => KitStatus::InTransit,
        AssignmentStatus::AtVenue => KitStatus::AtShow,
        _ => KitStatus::Assigned,
    }
}
