//! Auto-affectation par lot : sélection des salons, candidats, score, choix.
//!
//! Les salons sont traités par date de début croissante et chaque suggestion
//! retenue rejoint aussitôt le registre de travail : un kit disputé revient au
//! salon qui commence le plus tôt.

use super::conflicts::conflicts_against;
use super::util::{self, Booking};
use super::{AlternativeKit, AutoAssignReport, Conflict, SuggestOptions, Suggestion, Unassignable};
use crate::catalog;
use crate::model::{AssignmentStatus, Kit, KitType, Ledger, OrgId, Show};
use crate::window::{self, DateWindow, WindowOverrides};
use std::cmp::Ordering;

pub const BASE_SCORE: f64 = 0.5;
pub const PREFERENCE_BONUS: f64 = 0.3;
pub const PROXIMITY_BONUS: f64 = 0.1;
pub const BREATHING_ROOM_BONUS: f64 = 0.1;
pub const BREATHING_ROOM_DAYS: u64 = 14;
pub const CONFLICT_PENALTY: f64 = 0.2;
const MAX_ALTERNATIVES: usize = 2;

pub(super) const MISSING_DATES: &str = "missing dates";
pub(super) const NO_CONFLICT_FREE_KIT: &str = "no kit available without conflict in requested window";
pub const PREFERRED_TYPE_FALLBACK: &str = "no kit of preferred type available; considered all types";

#[derive(Debug, Clone, Copy, Default)]
struct ScoreBreakdown {
    preference: f64,
    preference_rank: Option<usize>,
    proximity: bool,
    breathing_room: bool,
}

impl ScoreBreakdown {
    fn total(&self) -> f64 {
        let mut score = BASE_SCORE + self.preference;
        if self.proximity {
            score += PROXIMITY_BONUS;
        }
        if self.breathing_room {
            score += BREATHING_ROOM_BONUS;
        }
        score.clamp(0.0, 1.0)
    }
}

struct Candidate<'a> {
    kit: &'a Kit,
    window: DateWindow,
    conflicts: Vec<Conflict>,
    breakdown: ScoreBreakdown,
}

impl Candidate<'_> {
    fn score(&self) -> f64 {
        self.breakdown.total()
    }

    fn overlap_days(&self) -> i64 {
        self.conflicts.iter().map(|c| c.overlap_days).sum()
    }
}

pub(super) fn auto_assign(ledger: &Ledger, org: &OrgId, opts: &SuggestOptions) -> AutoAssignReport {
    let mut report = AutoAssignReport::default();
    let targets = select_targets(ledger, org, opts, &mut report);
    let kits = catalog::active_kits(&ledger.kits, org, None);
    let mut working = util::blocking_bookings(ledger, None);

    for show in targets {
        match suggest_for_show(show, &kits, &working, opts, &mut report.warnings) {
            Ok(suggestion) => {
                tracing::info!(
                    show = %suggestion.show_id,
                    kit = %suggestion.kit_id,
                    confidence = suggestion.confidence,
                    "kit suggested"
                );
                working.push(Booking {
                    assignment_id: None,
                    kit_id: suggestion.kit_id.clone(),
                    show_id: suggestion.show_id.clone(),
                    show_name: suggestion.show_name.clone(),
                    status: AssignmentStatus::Planned,
                    window: suggestion.window,
                });
                report.suggestions.push(suggestion);
            }
            Err(reason) => {
                tracing::warn!(show = %show.id, %reason, "show unassignable");
                report.unassignable.push(Unassignable {
                    show_id: show.id.clone(),
                    show_name: show.name.clone(),
                    reason,
                });
            }
        }
    }

    report
}

/// Salons à traiter, datés et triés ; les salons sans dates partent
/// directement dans `unassignable`.
fn select_targets<'a>(
    ledger: &'a Ledger,
    org: &OrgId,
    opts: &SuggestOptions,
    report: &mut AutoAssignReport,
) -> Vec<&'a Show> {
    let shows: Vec<&Show> = match &opts.show_ids {
        Some(ids) => {
            let mut out: Vec<&Show> = Vec::new();
            for id in ids {
                match ledger.find_show(id).filter(|s| &s.org == org) {
                    None => report.warnings.push(format!("unknown show id {id}")),
                    Some(_) if ledger.show_has_active_assignment(id) => report
                        .warnings
                        .push(format!("show {id} already has an active assignment, skipped")),
                    Some(show) => {
                        if !out.iter().any(|s| s.id == show.id) {
                            out.push(show);
                        }
                    }
                }
            }
            out
        }
        None => ledger
            .shows
            .iter()
            .filter(|s| &s.org == org)
            .filter(|s| !ledger.show_has_active_assignment(&s.id))
            .filter(|s| in_range(s, opts.range.as_ref()))
            .collect(),
    };

    let mut dated = Vec::with_capacity(shows.len());
    for show in shows {
        if show.start.is_none() || show.end.is_none() {
            report.unassignable.push(Unassignable {
                show_id: show.id.clone(),
                show_name: show.name.clone(),
                reason: MISSING_DATES.to_string(),
            });
        } else {
            dated.push(show);
        }
    }

    dated.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    if dated.len() > opts.max_shows {
        report.warnings.push(format!(
            "batch capped at {} shows, {} deferred",
            opts.max_shows,
            dated.len() - opts.max_shows
        ));
        dated.truncate(opts.max_shows);
    }
    dated
}

fn in_range(show: &Show, range: Option<&DateWindow>) -> bool {
    match (range, show.start, show.end) {
        (Some(r), Some(start), Some(end)) => start <= r.end && end >= r.start,
        _ => true,
    }
}

fn suggest_for_show(
    show: &Show,
    kits: &[&Kit],
    bookings: &[Booking],
    opts: &SuggestOptions,
    warnings: &mut Vec<String>,
) -> Result<Suggestion, String> {
    let prefs = &opts.preferred_kit_types;
    let mut pool: Vec<&Kit> = kits
        .iter()
        .copied()
        .filter(|k| prefs.is_empty() || prefs.contains(&k.kit_type))
        .collect();
    if pool.is_empty() && !prefs.is_empty() {
        // un seul avertissement par lot, le détail par salon part dans les logs
        tracing::warn!(show = %show.id, "{}", PREFERRED_TYPE_FALLBACK);
        if !warnings.iter().any(|w| w == PREFERRED_TYPE_FALLBACK) {
            warnings.push(PREFERRED_TYPE_FALLBACK.to_string());
        }
        pool = kits.to_vec();
    }
    if pool.is_empty() {
        return Err("no active kit in catalog".to_string());
    }

    let overrides = WindowOverrides {
        buffer_days: opts.buffer_days,
        ..Default::default()
    };
    let mut clean = Vec::new();
    let mut conflicting = Vec::new();
    let mut range_error = None;

    for kit in pool {
        let window = match window::buffered_window(show, kit, &overrides) {
            Ok(w) => w,
            Err(err) => {
                range_error = Some(err.to_string());
                continue;
            }
        };
        let conflicts = conflicts_against(bookings, &kit.id, &window, None);
        let preference_rank = prefs.iter().position(|t| *t == kit.kit_type);
        let breakdown = ScoreBreakdown {
            preference: preference_bonus(kit.kit_type, prefs),
            preference_rank,
            proximity: location_matches(kit, show),
            breathing_room: conflicts.is_empty() && has_breathing_room(bookings, kit, &window),
        };
        let candidate = Candidate {
            kit,
            window,
            conflicts,
            breakdown,
        };
        if candidate.conflicts.is_empty() {
            clean.push(candidate);
        } else {
            conflicting.push(candidate);
        }
    }

    if !clean.is_empty() {
        clean.sort_by(rank_clean);
        let chosen = &clean[0];
        let alternatives = clean
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|c| alternative(c, alternative_reason(c, chosen)))
            .collect();
        let reason = clean_reason(chosen, prefs.len());
        return Ok(build_suggestion(show, chosen, chosen.score(), reason, alternatives));
    }

    if conflicting.is_empty() {
        return Err(range_error.unwrap_or_else(|| NO_CONFLICT_FREE_KIT.to_string()));
    }
    if !opts.allow_conflicts {
        return Err(NO_CONFLICT_FREE_KIT.to_string());
    }

    conflicting.sort_by(rank_conflicting);
    let chosen = &conflicting[0];
    let penalty = CONFLICT_PENALTY * chosen.conflicts.len() as f64;
    let confidence = (chosen.score() - penalty).max(0.0);
    let alternatives = conflicting
        .iter()
        .skip(1)
        .take(MAX_ALTERNATIVES)
        .map(|c| alternative(c, format!("more overlap ({} day(s))", c.overlap_days())))
        .collect();
    let reason = format!(
        "{} ({}) overlaps {} booking(s) for {} day(s) over {}",
        chosen.kit.name,
        chosen.kit.kit_type,
        chosen.conflicts.len(),
        chosen.overlap_days(),
        chosen.window
    );
    Ok(build_suggestion(show, chosen, confidence, reason, alternatives))
}

/// Bonus linéaire : plein pour le premier rang, nul au dernier.
fn preference_bonus(kit_type: KitType, prefs: &[KitType]) -> f64 {
    let Some(rank) = prefs.iter().position(|t| *t == kit_type) else {
        return 0.0;
    };
    if prefs.len() == 1 {
        return PREFERENCE_BONUS;
    }
    let last = (prefs.len() - 1) as f64;
    PREFERENCE_BONUS * (1.0 - rank as f64 / last)
}

/// Correspondance de sous-chaîne, insensible à la casse, entre le lieu du
/// salon et la position courante ou la base du kit. Pas de géocodage.
fn location_matches(kit: &Kit, show: &Show) -> bool {
    let target = show.location.trim().to_lowercase();
    if target.is_empty() {
        return false;
    }
    kit.current_location
        .iter()
        .chain(std::iter::once(&kit.home_base))
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .any(|l| l.contains(&target) || target.contains(&l))
}

fn has_breathing_room(bookings: &[Booking], kit: &Kit, window: &DateWindow) -> bool {
    let margin = window.widen(BREATHING_ROOM_DAYS);
    !bookings
        .iter()
        .any(|b| b.kit_id == kit.id && window::overlaps(&b.window, &margin))
}

// Score quantifié au millième : évite qu'un arrondi flottant départage deux kits.
fn quantized(score: f64) -> i64 {
    (score * 1000.0).round() as i64
}

fn rank_clean(a: &Candidate, b: &Candidate) -> Ordering {
    quantized(b.score())
        .cmp(&quantized(a.score()))
        .then(b.breakdown.proximity.cmp(&a.breakdown.proximity))
        .then_with(|| a.kit.id.cmp(&b.kit.id))
}

fn rank_conflicting(a: &Candidate, b: &Candidate) -> Ordering {
    a.overlap_days()
        .cmp(&b.overlap_days())
        .then(quantized(b.score()).cmp(&quantized(a.score())))
        .then_with(|| a.kit.id.cmp(&b.kit.id))
}

fn clean_reason(chosen: &Candidate, pref_count: usize) -> String {
    let mut parts = vec![format!(
        "{} ({}) is free over {}",
        chosen.kit.name, chosen.kit.kit_type, chosen.window
    )];
    if let Some(rank) = chosen.breakdown.preference_rank {
        if pref_count > 1 {
            parts.push(format!("preferred type #{}", rank + 1));
        } else {
            parts.push("preferred type".to_string());
        }
    }
    if chosen.breakdown.proximity {
        parts.push("near show location".to_string());
    }
    if chosen.breakdown.breathing_room {
        parts.push(format!("no booking within {BREATHING_ROOM_DAYS} days"));
    }
    parts.join("; ")
}

fn alternative_reason(c: &Candidate, chosen: &Candidate) -> String {
    let (alt, best) = (&c.breakdown, &chosen.breakdown);
    let mut lacks = Vec::new();
    if alt.preference < best.preference {
        lacks.push(if alt.preference_rank.is_none() {
            "non-preferred type"
        } else {
            "less preferred type"
        });
    }
    if best.proximity && !alt.proximity {
        lacks.push("lower proximity match");
    }
    if best.breathing_room && !alt.breathing_room {
        lacks.push("tight turnaround with a nearby booking");
    }
    if lacks.is_empty() {
        "same score, higher kit id".to_string()
    } else {
        lacks.join(", ")
    }
}

fn alternative(c: &Candidate, reason: String) -> AlternativeKit {
    AlternativeKit {
        kit_id: c.kit.id.clone(),
        kit_name: c.kit.name.clone(),
        score: c.score(),
        reason,
    }
}

fn build_suggestion(
    show: &Show,
    chosen: &Candidate,
    confidence: f64,
    reason: String,
    alternatives: Vec<AlternativeKit>,
) -> Suggestion {
    // Les dates ont été vérifiées par `buffered_window`.
    let show_dates = DateWindow {
        start: show.start.unwrap_or(chosen.window.start),
        end: show.end.unwrap_or(chosen.window.end),
    };
    Suggestion {
        show_id: show.id.clone(),
        show_name: show.name.clone(),
        show_dates,
        kit_id: chosen.kit.id.clone(),
        kit_name: chosen.kit.name.clone(),
        kit_type: chosen.kit.kit_type,
        window: chosen.window,
        confidence,
        reason,
        conflicts: chosen.conflicts.clone(),
        alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_bonus_decays_to_zero() {
        let prefs = [KitType::Flagship, KitType::Standard, KitType::Compact];
        assert_eq!(preference_bonus(KitType::Flagship, &prefs), PREFERENCE_BONUS);
        assert!((preference_bonus(KitType::Standard, &prefs) - 0.15).abs() < 1e-9);
        assert_eq!(preference_bonus(KitType::Compact, &prefs), 0.0);
        assert_eq!(preference_bonus(KitType::Tabletop, &prefs), 0.0);
        assert_eq!(preference_bonus(KitType::Tabletop, &[KitType::Tabletop]), PREFERENCE_BONUS);
        assert_eq!(preference_bonus(KitType::Tabletop, &[]), 0.0);
    }

    #[test]
    fn score_is_clamped() {
        let full = ScoreBreakdown {
            preference: PREFERENCE_BONUS,
            preference_rank: Some(0),
            proximity: true,
            breathing_room: true,
        };
        assert!(full.total() <= 1.0);
        assert_eq!(quantized(full.total()), 1000);
        assert_eq!(quantized(ScoreBreakdown::default().total()), 500);
    }
}
