use crate::model::{AssignmentId, AssignmentStatus, KitId, KitStatus, KitType, ShowId};
use crate::window::DateWindow;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Options d'auto-affectation
#[derive(Debug, Clone)]
pub struct SuggestOptions {
    /// Sous-ensemble explicite de salons ; sinon tous les salons non affectés.
    pub show_ids: Option<Vec<ShowId>>,
    /// Gammes préférées, la plus souhaitée en premier.
    pub preferred_kit_types: Vec<KitType>,
    /// Délai (jours) appliqué des deux côtés à toutes les fenêtres candidates.
    pub buffer_days: Option<u32>,
    pub allow_conflicts: bool,
    /// Ne cible implicitement que les salons qui croisent cette période.
    pub range: Option<DateWindow>,
    pub max_shows: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            show_ids: None,
            preferred_kit_types: Vec::new(),
            buffer_days: None,
            allow_conflicts: false,
            range: None,
            max_shows: 500,
        }
    }
}

/// Chevauchement entre une fenêtre candidate et une réservation existante.
///
/// `assignment_id` vaut `None` quand la réservation est une suggestion
/// retenue plus tôt dans le même lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub assignment_id: Option<AssignmentId>,
    pub show_id: ShowId,
    pub show_name: String,
    pub window: DateWindow,
    pub overlap_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeKit {
    pub kit_id: KitId,
    pub kit_name: String,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub show_id: ShowId,
    pub show_name: String,
    /// Dates du salon au moment du calcul, pour détecter un salon déplacé.
    pub show_dates: DateWindow,
    pub kit_id: KitId,
    pub kit_name: String,
    pub kit_type: KitType,
    pub window: DateWindow,
    pub confidence: f64,
    pub reason: String,
    pub conflicts: Vec<Conflict>,
    pub alternatives: Vec<AlternativeKit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unassignable {
    pub show_id: ShowId,
    pub show_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AutoAssignReport {
    pub suggestions: Vec<Suggestion>,
    pub unassignable: Vec<Unassignable>,
    pub warnings: Vec<String>,
}

/// Résultat par suggestion d'un apply en lot.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub show_id: ShowId,
    pub kit_id: KitId,
    pub result: Result<AssignmentId, PlanError>,
}

/// Projection de disponibilité d'un kit à une date donnée.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub kit_id: KitId,
    pub status: KitStatus,
    pub current_location: Option<String>,
    pub current_assignment: Option<AssignmentId>,
    pub next_assignment: Option<UpcomingAssignment>,
    pub available_from: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingAssignment {
    pub assignment_id: AssignmentId,
    pub show_id: ShowId,
    pub show_name: String,
    pub window: DateWindow,
}

/// Trajet concerné par une mise à jour transporteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Outbound,
    Return,
}

/// Paire d'affectations d'un même kit qui se chevauchent dans le ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapPair {
    pub kit_id: KitId,
    pub assignment_a: AssignmentId,
    pub assignment_b: AssignmentId,
    pub overlap_days: i64,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("kit {kit} has {} conflicting booking(s) in {window}", conflicts.len())]
    ConflictDetected {
        kit: KitId,
        window: DateWindow,
        conflicts: Vec<Conflict>,
    },
    #[error("cannot move to {to}: {missing} is required")]
    IncompleteTransition {
        to: AssignmentStatus,
        missing: &'static str,
    },
    #[error("transition {from} -> {to} not allowed")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    #[error("suggestion for show {show} / kit {kit} is stale ({} new conflict(s))", conflicts.len())]
    StaleSuggestion {
        show: ShowId,
        kit: KitId,
        conflicts: Vec<Conflict>,
    },
    #[error("show {0} already has an active assignment on another kit")]
    ShowAlreadyAssigned(String),
    #[error("assignment {0} is closed")]
    AssignmentClosed(String),
    #[error("unknown kit: {0}")]
    UnknownKit(String),
    #[error("unknown show: {0}")]
    UnknownShow(String),
    #[error("unknown assignment: {0}")]
    UnknownAssignment(String),
    #[error("kit {0} is retired")]
    KitInactive(String),
    #[error("kit {0} still has upcoming assignments")]
    KitInUse(String),
    #[error("invalid kit: {0}")]
    InvalidKit(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
