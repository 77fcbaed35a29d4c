use crate::model::{Kit, KitId, KitStatus, KitType, OrgId, PackingItem, Show, ShowId};
use crate::planner::{AutoAssignReport, Planner};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

/// Import de kits depuis CSV. Header :
/// `id,name,code,kit_type,home_base,current_location,ship_days,return_days[,status][,packing_list][,replacement_value]`
pub fn import_kits_csv<P: AsRef<Path>>(path: P, org: &OrgId) -> anyhow::Result<Vec<Kit>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let kit = parse_kit_record(&rec, org).with_context(|| format!("kit row {}", line + 1))?;
        out.push(kit);
    }
    Ok(out)
}

fn parse_kit_record(rec: &StringRecord, org: &OrgId) -> anyhow::Result<Kit> {
    let id = required(rec, 0, "id")?;
    let name = required(rec, 1, "name")?;
    let kit_type: KitType = required(rec, 3, "kit_type")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let home_base = required(rec, 4, "home_base")?;
    let ship_days: u32 = required(rec, 6, "ship_days")?
        .parse()
        .context("ship_days must be a non-negative integer")?;
    let return_days: u32 = required(rec, 7, "return_days")?
        .parse()
        .context("return_days must be a non-negative integer")?;

    let mut kit = Kit::new(org.clone(), name, kit_type, home_base, ship_days, return_days)
        .with_id(KitId::new(id));
    kit.code = optional(rec, 2).map(str::to_string);
    kit.current_location = optional(rec, 5).map(str::to_string);
    if let Some(status) = optional(rec, 8) {
        kit.status = status.parse::<KitStatus>().map_err(anyhow::Error::msg)?;
    }
    if let Some(list) = optional(rec, 9) {
        kit.contents = parse_packing_list(list)?;
    }
    if let Some(value) = optional(rec, 10) {
        kit.replacement_value = Some(value.parse().context("invalid replacement_value")?);
    }
    crate::catalog::validate_kit(&kit)?;
    Ok(kit)
}

/// Liste de colisage `nom:quantité;nom:quantité` (quantité 1 par défaut).
fn parse_packing_list(raw: &str) -> anyhow::Result<Vec<PackingItem>> {
    raw.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let (name, qty) = match chunk.rsplit_once(':') {
                Some((name, qty)) => (
                    name.trim(),
                    qty.trim()
                        .parse::<u32>()
                        .with_context(|| format!("invalid quantity in {chunk}"))?,
                ),
                None => (chunk, 1),
            };
            if name.is_empty() {
                bail!("empty packing item name");
            }
            Ok(PackingItem {
                name: name.to_string(),
                quantity: qty,
            })
        })
        .collect()
}

/// Import de salons : header `id,name,location,start,end` (dates `YYYY-MM-DD`, vides tolérées).
pub fn import_shows_csv<P: AsRef<Path>>(path: P, org: &OrgId) -> anyhow::Result<Vec<Show>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let show = parse_show_record(&rec, org).with_context(|| format!("show row {}", line + 1))?;
        out.push(show);
    }
    Ok(out)
}

fn parse_show_record(rec: &StringRecord, org: &OrgId) -> anyhow::Result<Show> {
    let id = required(rec, 0, "id")?;
    let name = required(rec, 1, "name")?;
    let location = optional(rec, 2).unwrap_or("");
    let start = optional(rec, 3).map(parse_date).transpose()?;
    let end = optional(rec, 4).map(parse_date).transpose()?;
    Ok(Show::new(org.clone(), name, location, start, end).with_id(ShowId::new(id)))
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn required<'a>(rec: &'a StringRecord, idx: usize, field: &str) -> anyhow::Result<&'a str> {
    match optional(rec, idx) {
        Some(v) => Ok(v),
        None => bail!("missing {field}"),
    }
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

/// Export CSV des affectations :
/// `id,kit_id,show_id,status,window_start,window_end,ai_confidence`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, planner: &Planner) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "kit_id",
        "show_id",
        "status",
        "window_start",
        "window_end",
        "ai_confidence",
    ])?;
    for a in &planner.ledger().assignments {
        let (start, end) = match planner.assignment_window(&a.id) {
            Ok(win) => (win.start.to_string(), win.end.to_string()),
            Err(_) => (String::new(), String::new()),
        };
        let confidence = a.ai_confidence.map(|c| format!("{c:.2}")).unwrap_or_default();
        w.write_record([
            a.id.as_str(),
            a.kit_id.as_str(),
            a.show_id.as_str(),
            a.status.as_str(),
            start.as_str(),
            end.as_str(),
            confidence.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Rapport de suggestions : une ligne par suggestion puis par salon non affectable.
pub fn write_report_csv<W: std::io::Write>(out: W, report: &AutoAssignReport) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "show_id",
        "kit_id",
        "window_start",
        "window_end",
        "confidence",
        "conflicts",
        "reason",
    ])?;
    for s in &report.suggestions {
        w.write_record([
            s.show_id.to_string(),
            s.kit_id.to_string(),
            s.window.start.to_string(),
            s.window.end.to_string(),
            format!("{:.2}", s.confidence),
            s.conflicts.len().to_string(),
            s.reason.clone(),
        ])?;
    }
    for u in &report.unassignable {
        w.write_record([
            u.show_id.to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            u.reason.clone(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_report_csv<P: AsRef<Path>>(path: P, report: &AutoAssignReport) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    write_report_csv(file, report)
}
