#![forbid(unsafe_code)]
//! Kitplan : affectation de kits de stand à des salons, sans double réservation.
//!
//! - Fenêtres tamponnées (aller + salon + retour), bornes incluses.
//! - Détection de conflits par kit, portier unique de toute écriture.
//! - Suggestions par lot, ordonnées et notées ; application revalidée.
//! - Stockage fichiers (JSON/CSV), contexte d'organisation explicite.

pub mod catalog;
pub mod io;
pub mod model;
pub mod planner;
pub mod shared;
pub mod storage;
pub mod window;

pub use model::{
    Assignment, AssignmentDates, AssignmentId, AssignmentStatus, Dimensions, Kit, KitId,
    KitStatus, KitType, Ledger, OrgId, PackingItem, Show, ShowId,
};
pub use planner::{
    AlternativeKit, ApplyOutcome, Availability, AutoAssignReport, Conflict, Leg, OverlapPair,
    PlanError, Planner, SuggestOptions, Suggestion, Unassignable, UpcomingAssignment,
};
pub use shared::SharedPlanner;
pub use storage::{JsonStorage, Storage};
pub use window::{buffered_window, overlap_days, overlaps, DateWindow, WindowOverrides};
