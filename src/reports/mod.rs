use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use modforge::assignment::{CharacterOutcome, RunResult};
use modforge::character::Character;
use modforge::mods::Slot;
use modforge::scorer::{Evaluation, Loadout};
use modforge::stats::StatKind;
use strum::IntoEnumIterator;

fn outcome_cell(outcome: CharacterOutcome) -> Cell {
    let cell = Cell::new(format!("{:?}", outcome));
    match outcome {
        CharacterOutcome::Optimized => cell.fg(Color::Green),
        CharacterOutcome::Kept | CharacterOutcome::Reused => cell.fg(Color::Cyan),
        CharacterOutcome::Locked | CharacterOutcome::Partial => cell.fg(Color::Yellow),
        CharacterOutcome::Failed => cell.fg(Color::Red),
    }
}

pub fn print_results(result: &RunResult) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Character").add_attribute(Attribute::Bold),
        Cell::new("Outcome"),
    ];
    header.extend(Slot::ALL.iter().map(|s| Cell::new(s.to_string())));
    header.push(Cell::new("Score").fg(Color::Cyan));
    header.push(Cell::new("Missed").fg(Color::Red));
    table.add_row(header);

    for r in &result.results {
        let mut row = vec![
            Cell::new(&r.character_id).add_attribute(Attribute::Bold),
            outcome_cell(r.outcome),
        ];
        row.extend(
            r.mods
                .iter()
                .map(|m| Cell::new(m.as_deref().unwrap_or("-"))),
        );
        row.push(Cell::new(format!("{:.0}", r.score)).set_alignment(CellAlignment::Right));
        row.push(Cell::new(r.missed_goals.len()).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }

    println!("\n{}", table);
    println!("Status: {:?}", result.status);
}

/// Missed goals and diagnostics, one line each.
pub fn print_messages(result: &RunResult) {
    for r in &result.results {
        if r.missed_goals.is_empty() && r.messages.is_empty() {
            continue;
        }
        println!("\n{}:", r.character_id);
        for m in &r.missed_goals {
            println!("  ✗ {}", m);
        }
        for m in &r.messages {
            println!("  • {}", m);
        }
    }
}

pub fn print_loadout(name: &str, loadout: &Loadout) {
    println!("\nLoadout: {}", name);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Mod"),
        Cell::new("Set"),
        Cell::new("Primary"),
        Cell::new("Secondaries"),
    ]);

    for slot in Slot::ALL {
        match loadout[slot.index()] {
            Some(m) => {
                let secondaries = m
                    .secondaries
                    .iter()
                    .map(|s| format!("{} {}", s.kind, s.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(vec![
                    Cell::new(slot.to_string()),
                    Cell::new(&m.id),
                    Cell::new(m.set.to_string()),
                    Cell::new(format!("{} {}", m.primary.kind, m.primary.value)),
                    Cell::new(secondaries),
                ]);
            }
            None => {
                table.add_row(vec![Cell::new(slot.to_string()), Cell::new("-")]);
            }
        }
    }
    println!("{}", table);
}

pub fn print_evaluation(character: &Character, eval: &Evaluation) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Stat").add_attribute(Attribute::Bold),
        Cell::new("Base"),
        Cell::new("Mods").fg(Color::Green),
        Cell::new("Total").add_attribute(Attribute::Bold),
    ]);
    for i in 1..=3 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for stat in StatKind::iter() {
        let base = character.base_stats[stat];
        let added = eval.stats[stat];
        if base.is_zero() && added.is_zero() {
            continue;
        }
        table.add_row(vec![
            Cell::new(stat.to_string()),
            Cell::new(base.to_string()),
            Cell::new(added.to_string()).fg(Color::Green),
            Cell::new(eval.totals[stat].to_string()),
        ]);
    }
    println!("\n{}", table);

    if !eval.sets.is_empty() {
        let sets = eval
            .sets
            .iter()
            .map(|s| {
                format!(
                    "{} x{}{}",
                    s.set,
                    s.bonuses,
                    if s.full { "" } else { " (reduced)" }
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("Sets: {}", sets);
    }

    for g in &eval.goals {
        let mark = if g.met() { "✓" } else { "✗" };
        println!(
            "Goal {} {} in [{}, {}]: {}",
            mark, g.stat, g.lower, g.upper, g.achieved
        );
    }
    println!("Score: {}", eval.score);
}
