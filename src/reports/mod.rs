use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use mechorder::error::MoResult;
use mechorder::gate::{accept, GateDecision, GateVerdict};
use mechorder::mapping::IndexSpace;
use mechorder::orchestrator::OptimizedMechanism;

fn decision_cell(decision: GateDecision) -> Cell {
    match decision {
        GateDecision::Adopted => Cell::new("optimized").fg(Color::Green),
        GateDecision::Retained => Cell::new("original").fg(Color::Yellow),
    }
}

pub fn print_gate_report(result: &OptimizedMechanism) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Index Set").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Original").fg(Color::Cyan),
        Cell::new("Candidate").fg(Color::Cyan),
        Cell::new("Kept").add_attribute(Attribute::Bold),
    ]);

    for i in 1..=3 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let rows: [(&str, usize, &Option<GateVerdict>); 2] = [
        ("reactions", result.reaction_order.len(), &result.reaction_gate),
        ("species", result.species_order.len(), &result.species_gate),
    ];

    for (name, count, verdict) in rows {
        match verdict {
            Some(v) => table.add_row(vec![
                Cell::new(name).add_attribute(Attribute::Bold),
                Cell::new(count),
                Cell::new(v.baseline_cost),
                Cell::new(v.candidate_cost),
                decision_cell(v.decision),
            ]),
            None => table.add_row(vec![
                Cell::new(name).add_attribute(Attribute::Bold),
                Cell::new(count),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("checkpoint"),
            ]),
        };
    }
    println!("\n{}", table);
}

pub fn print_ordering(title: &str, order: &[usize], names: &[String]) {
    println!("\n{} order:", title);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Pos").add_attribute(Attribute::Bold),
        Cell::new("Orig"),
        Cell::new("Entry"),
    ]);

    for (pos, &orig) in order.iter().enumerate() {
        let name = names.get(pos).map(String::as_str).unwrap_or("");
        table.add_row(vec![
            Cell::new(pos).set_alignment(CellAlignment::Right),
            Cell::new(orig).set_alignment(CellAlignment::Right),
            Cell::new(name),
        ]);
    }
    println!("{}", table);
}

pub fn print_score_report(rows: &[(IndexSpace, usize, usize, Option<usize>)]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Index Set").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Identity").fg(Color::Cyan),
        Cell::new("Given").fg(Color::Cyan),
        Cell::new("Verdict"),
    ]);

    for &(space, count, baseline, candidate) in rows {
        let (given, verdict) = match candidate {
            Some(c) if accept(baseline, c) => (Cell::new(c), Cell::new("accept").fg(Color::Green)),
            Some(c) => (Cell::new(c), Cell::new("reject").fg(Color::Red)),
            None => (Cell::new("-"), Cell::new("-")),
        };
        table.add_row(vec![
            Cell::new(space).add_attribute(Attribute::Bold),
            Cell::new(count),
            Cell::new(baseline),
            given,
            verdict,
        ]);
    }
    println!("\n{}", table);

    for &(space, _, baseline, _) in rows {
        println!("{} identity cost: {}", space, baseline);
    }
}

/// Writes `kind,position,original,name` rows.
pub fn export_orderings(path: &str, result: &OptimizedMechanism) -> MoResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["kind", "position", "original", "name"])?;

    for (pos, &orig) in result.species_order.iter().enumerate() {
        let name = result.species.get(pos).map(|s| s.name.clone()).unwrap_or_default();
        wtr.write_record([
            IndexSpace::Species.to_string(),
            pos.to_string(),
            orig.to_string(),
            name,
        ])?;
    }
    for (pos, &orig) in result.reaction_order.iter().enumerate() {
        let name = result
            .reactions
            .get(pos)
            .map(|r| r.equation())
            .unwrap_or_default();
        wtr.write_record([
            IndexSpace::Reaction.to_string(),
            pos.to_string(),
            orig.to_string(),
            name,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
