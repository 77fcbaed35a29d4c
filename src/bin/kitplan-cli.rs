#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use kitplan::{
    io,
    model::{AssignmentId, AssignmentStatus, KitId, KitType, OrgId, ShowId},
    planner::{Leg, Planner, SuggestOptions},
    storage::{JsonStorage, Storage},
    DateWindow,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des kits de stand (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du ledger
    #[arg(long, global = true, env = "KITPLAN_LEDGER", default_value = "kitplan.json")]
    ledger: String,

    /// Organisation courante
    #[arg(long, global = true, env = "KITPLAN_ORG", default_value = "default")]
    org: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StatusArg {
    Confirmed,
    Shipped,
    AtVenue,
    Returned,
    Cancelled,
}

impl From<StatusArg> for AssignmentStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Confirmed => AssignmentStatus::Confirmed,
            StatusArg::Shipped => AssignmentStatus::Shipped,
            StatusArg::AtVenue => AssignmentStatus::AtVenue,
            StatusArg::Returned => AssignmentStatus::Returned,
            StatusArg::Cancelled => AssignmentStatus::Cancelled,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des kits depuis un CSV
    ImportKits {
        #[arg(long)]
        csv: String,
    },

    /// Importer des salons depuis un CSV
    ImportShows {
        #[arg(long)]
        csv: String,
    },

    /// Proposer un kit pour chaque salon non affecté
    Suggest {
        /// liste "show1,show2,..."
        #[arg(long)]
        shows: Option<String>,
        /// gammes préférées, la plus souhaitée d'abord : "flagship,standard"
        #[arg(long)]
        prefer: Option<String>,
        #[arg(long)]
        buffer_days: Option<u32>,
        #[arg(long)]
        allow_conflicts: bool,
        /// YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[arg(long)]
        until: Option<NaiveDate>,
        #[arg(long, default_value_t = 500)]
        max_shows: usize,
        /// Export CSV du rapport (optionnel)
        #[arg(long)]
        report: Option<String>,
        /// Écrire les suggestions dans le ledger
        #[arg(long)]
        apply: bool,
    },

    /// Affecter manuellement un kit à un salon
    Assign {
        #[arg(long)]
        kit: String,
        #[arg(long)]
        show: String,
        #[arg(long)]
        ship_date: Option<NaiveDate>,
        #[arg(long)]
        return_arrival_date: Option<NaiveDate>,
    },

    /// Faire avancer une affectation dans son cycle de vie
    Transition {
        #[arg(long)]
        id: String,
        #[arg(long, value_enum)]
        to: StatusArg,
    },

    /// Renseigner dates et suivi transporteur d'une affectation
    SetDates {
        #[arg(long)]
        id: String,
        #[arg(long)]
        ship_date: Option<NaiveDate>,
        #[arg(long)]
        arrival_date: Option<NaiveDate>,
        #[arg(long)]
        return_ship_date: Option<NaiveDate>,
        #[arg(long)]
        return_arrival_date: Option<NaiveDate>,
        #[arg(long)]
        outbound_carrier: Option<String>,
        #[arg(long)]
        outbound_tracking: Option<String>,
        #[arg(long)]
        return_carrier: Option<String>,
        #[arg(long)]
        return_tracking: Option<String>,
    },

    /// Annuler une affectation (libère la fenêtre du kit)
    Cancel {
        #[arg(long)]
        id: String,
    },

    /// Désactiver un kit (historique conservé)
    RetireKit {
        #[arg(long)]
        kit: String,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Disponibilité de chaque kit actif
    Availability {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Lister et optionnellement exporter les affectations
    List {
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier qu'aucun kit n'est réservé deux fois
    Check,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let org = OrgId::new(&cli.org);
    let storage = JsonStorage::open(&cli.ledger)?;
    let mut planner = Planner::from_ledger(storage.load_or_default()?);
    let today = Utc::now().date_naive();

    let code = match cli.cmd {
        Commands::ImportKits { csv } => {
            let kits = io::import_kits_csv(csv, &org)?;
            let mut count = 0usize;
            let mut skipped = 0usize;
            for kit in kits {
                let id = kit.id.clone();
                match planner.upsert_kit(kit) {
                    Ok(_) => count += 1,
                    Err(err) => {
                        eprintln!("warning: kit {id} skipped: {err}");
                        skipped += 1;
                    }
                }
            }
            storage.save(planner.ledger())?;
            println!("{count} kit(s) imported");
            if skipped == 0 {
                0
            } else {
                2
            }
        }
        Commands::ImportShows { csv } => {
            let shows = io::import_shows_csv(csv, &org)?;
            let mut count = 0usize;
            let mut skipped = 0usize;
            for show in shows {
                let id = show.id.clone();
                match planner.upsert_show(show) {
                    Ok(_) => count += 1,
                    // salon déplacé sur la fenêtre d'un autre : on garde l'ancien
                    Err(err) => {
                        eprintln!("warning: show {id} skipped: {err}");
                        skipped += 1;
                    }
                }
            }
            storage.save(planner.ledger())?;
            println!("{count} show(s) imported");
            if skipped == 0 {
                0
            } else {
                2
            }
        }
        Commands::Suggest {
            shows,
            prefer,
            buffer_days,
            allow_conflicts,
            from,
            until,
            max_shows,
            report,
            apply,
        } => {
            let preferred_kit_types = match prefer {
                Some(list) => split_list(&list)
                    .iter()
                    .map(|t| t.parse::<KitType>().map_err(anyhow::Error::msg))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            let range = match (from, until) {
                (None, None) => None,
                (from, until) => Some(DateWindow::new(
                    from.unwrap_or(NaiveDate::MIN),
                    until.unwrap_or(NaiveDate::MAX),
                )?),
            };
            let opts = SuggestOptions {
                show_ids: shows.map(|list| split_list(&list).iter().map(ShowId::new).collect()),
                preferred_kit_types,
                buffer_days,
                allow_conflicts,
                range,
                max_shows,
            };

            let result = planner.auto_assign(&org, &opts);
            for s in &result.suggestions {
                println!(
                    "{} -> {} | {} | {:.2} | {}",
                    s.show_id, s.kit_id, s.window, s.confidence, s.reason
                );
            }
            for u in &result.unassignable {
                println!("{} -> - | {}", u.show_id, u.reason);
            }
            for w in &result.warnings {
                eprintln!("warning: {w}");
            }
            if let Some(path) = report {
                io::export_report_csv(path, &result)?;
            }

            let mut failed = 0usize;
            if apply {
                for outcome in planner.apply_all(&result.suggestions) {
                    if let Err(err) = outcome.result {
                        eprintln!("apply {} failed: {err}", outcome.show_id);
                        failed += 1;
                    }
                }
                storage.save(planner.ledger())?;
            }
            // Code 2 = WARNING/INCOMPLETE
            if result.unassignable.is_empty() && failed == 0 {
                0
            } else {
                2
            }
        }
        Commands::Assign {
            kit,
            show,
            ship_date,
            return_arrival_date,
        } => {
            let dates = kitplan::AssignmentDates {
                ship_date,
                return_arrival_date,
                ..Default::default()
            };
            let id = planner.assign_manual(&KitId::new(kit), &ShowId::new(show), dates)?;
            storage.save(planner.ledger())?;
            println!("{id}");
            0
        }
        Commands::Transition { id, to } => {
            planner.transition(&AssignmentId::new(id), to.into())?;
            storage.save(planner.ledger())?;
            0
        }
        Commands::SetDates {
            id,
            ship_date,
            arrival_date,
            return_ship_date,
            return_arrival_date,
            outbound_carrier,
            outbound_tracking,
            return_carrier,
            return_tracking,
        } => {
            let id = AssignmentId::new(id);
            let Some(current) = planner.ledger().find_assignment(&id) else {
                bail!("unknown assignment: {id}");
            };
            let mut dates = current.dates.clone();
            dates.ship_date = ship_date.or(dates.ship_date);
            dates.arrival_date = arrival_date.or(dates.arrival_date);
            dates.return_ship_date = return_ship_date.or(dates.return_ship_date);
            dates.return_arrival_date = return_arrival_date.or(dates.return_arrival_date);
            planner.update_dates(&id, dates)?;
            planner.set_tracking(&id, Leg::Outbound, outbound_carrier, outbound_tracking)?;
            planner.set_tracking(&id, Leg::Return, return_carrier, return_tracking)?;
            storage.save(planner.ledger())?;
            0
        }
        Commands::Cancel { id } => {
            planner.cancel(&AssignmentId::new(id))?;
            storage.save(planner.ledger())?;
            0
        }
        Commands::RetireKit { kit, as_of } => {
            planner.retire_kit(&KitId::new(kit), as_of.unwrap_or(today))?;
            storage.save(planner.ledger())?;
            0
        }
        Commands::Availability { as_of } => {
            let as_of = as_of.unwrap_or(today);
            for a in planner.availability_report(&org, as_of) {
                let next = a
                    .next_assignment
                    .as_ref()
                    .map(|n| format!("{} ({})", n.show_name, n.window))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} | {:?} | {} | from {} | next {}",
                    a.kit_id,
                    a.status,
                    a.current_location.as_deref().unwrap_or("-"),
                    a.available_from,
                    next
                );
            }
            0
        }
        Commands::List { out_csv } => {
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &planner)?;
            }
            // impression compacte
            for a in &planner.ledger().assignments {
                let window = planner
                    .assignment_window(&a.id)
                    .map(|w| w.to_string())
                    .unwrap_or_else(|_| "?".to_string());
                println!(
                    "{} | {} | {} | {} | {}",
                    a.id, a.kit_id, a.show_id, window, a.status
                );
            }
            0
        }
        Commands::Check => {
            let overlaps = planner.audit();
            if overlaps.is_empty() {
                println!("OK: no double booking");
                0
            } else {
                eprintln!("Found {} double booking(s)", overlaps.len());
                for o in &overlaps {
                    eprintln!(
                        "{}: {} / {} ({} day(s))",
                        o.kit_id, o.assignment_a, o.assignment_b, o.overlap_days
                    );
                }
                2
            }
        }
    };

    std::process::exit(code);
}
