use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use overworld::gameplay::{
    load_layout, plan_world, unmatched_signatures, GridCell, LayoutCode, LayoutGrid, Neighborhood,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    pub path: PathBuf,
    pub dimension: u32,
    pub strict: bool,
    pub list_gaps: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/layout.csv"),
            dimension: 80,
            strict: false,
            list_gaps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub dimension: u32,
    pub code_counts: BTreeMap<i32, usize>,
    pub unknown_codes: Vec<(GridCell, i32)>,
    pub tile_counts: BTreeMap<&'static str, usize>,
    pub unmatched: Vec<(GridCell, Neighborhood)>,
    pub blocked_cells: usize,
    pub entrances: Vec<(GridCell, u16)>,
}

impl AuditReport {
    /// Problems `--strict` refuses: untiled path cells and unknown codes.
    pub fn problem_count(&self) -> usize {
        self.unmatched.len() + self.unknown_codes.len()
    }
}

pub fn audit_layout(layout: &LayoutGrid) -> AuditReport {
    let mut code_counts = BTreeMap::new();
    let mut unknown_codes = Vec::new();
    for (cell, raw) in layout.cells() {
        *code_counts.entry(raw).or_insert(0) += 1;
        if LayoutCode::from_raw(raw).is_none() {
            unknown_codes.push((cell, raw));
        }
    }

    let plan = plan_world(layout);
    let mut tile_counts = BTreeMap::new();
    for (_, tile) in &plan.path_tiles {
        *tile_counts.entry(tile.texture_key()).or_insert(0) += 1;
    }

    AuditReport {
        dimension: layout.dimension(),
        code_counts,
        unknown_codes,
        tile_counts,
        unmatched: plan
            .unmatched_paths
            .iter()
            .map(|gap| (gap.cell, gap.neighborhood))
            .collect(),
        blocked_cells: plan.collision.blocked_count(),
        entrances: plan.enterable.entrances().collect(),
    }
}

fn code_label(raw: i32) -> String {
    match LayoutCode::from_raw(raw) {
        Some(code) => format!("{code:?}"),
        None => "unknown".to_string(),
    }
}

pub fn write_report<W: Write>(report: &AuditReport, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "dimension: {0}x{0}", report.dimension)?;
    writeln!(out, "codes:")?;
    for (raw, count) in &report.code_counts {
        writeln!(out, "  {raw:>3} {:<16} {count}", code_label(*raw))?;
    }
    writeln!(out, "path tiles:")?;
    for (key, count) in &report.tile_counts {
        writeln!(out, "  {key:<20} {count}")?;
    }
    writeln!(out, "untiled path cells: {}", report.unmatched.len())?;
    for (cell, neighborhood) in &report.unmatched {
        writeln!(
            out,
            "  ({}, {}) {:#04x} {neighborhood}",
            cell.col,
            cell.row,
            neighborhood.signature()
        )?;
    }
    for (cell, raw) in &report.unknown_codes {
        writeln!(out, "unknown code {raw} at ({}, {})", cell.col, cell.row)?;
    }
    writeln!(out, "blocked cells: {}", report.blocked_cells)?;
    writeln!(out, "entrances: {}", report.entrances.len())?;
    for (cell, code) in &report.entrances {
        writeln!(out, "  ({}, {}) code {code}", cell.col, cell.row)?;
    }
    Ok(())
}

pub fn write_gap_table<W: Write>(out: &mut W) -> std::io::Result<()> {
    let gaps = unmatched_signatures();
    writeln!(out, "neighborhoods with no tile: {}", gaps.len())?;
    for signature in gaps {
        writeln!(
            out,
            "  {signature:#04x} {}",
            Neighborhood::from_signature(signature)
        )?;
    }
    Ok(())
}

pub fn run<W: Write>(options: &AuditOptions, stdout: &mut W) -> Result<(), String> {
    let layout = load_layout(&options.path, options.dimension).map_err(|error| error.to_string())?;
    let report = audit_layout(&layout);
    write_report(&report, stdout).map_err(|error| format!("write report: {error}"))?;
    if options.list_gaps {
        write_gap_table(stdout).map_err(|error| format!("write gap table: {error}"))?;
    }
    if options.strict && report.problem_count() > 0 {
        return Err(format!(
            "{} problem cell(s) in {}",
            report.problem_count(),
            options.path.display()
        ));
    }
    Ok(())
}
