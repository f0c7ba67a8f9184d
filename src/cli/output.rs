//! Output formatting utilities for CLI.

use movedex::catalog::CatalogManifest;
use movedex::dex::Move;
use movedex::engine::SweepOutcome;
use movedex::round::{AnswerOutcome, RoundStart};
use std::fmt::Write;

/// Format a started round as human-readable text.
pub(super) fn format_round(round: &RoundStart) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Who learns all of these? (generation {})", round.generation);
    for mv in &round.moves {
        let _ = writeln!(output, "  {}", describe_move(mv));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "Token: {}", round.token);
    output
}

fn describe_move(mv: &Move) -> String {
    let stat = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    format!(
        "{:<20} {:<10} pow {:>3}  acc {:>3}  pp {:>2}",
        mv.name,
        mv.element,
        stat(mv.power.map(|p| p.to_string())),
        stat(mv.accuracy.map(|a| a.to_string())),
        stat(mv.pp.map(|p| p.to_string())),
    )
}

/// Format an answer outcome as human-readable text.
pub(super) fn format_answer(outcome: &AnswerOutcome) -> String {
    let mut output = String::new();
    if outcome.correct {
        let _ = writeln!(output, "Correct! +{} points", outcome.points);
    } else {
        let _ = writeln!(output, "Wrong.");
    }
    if let Some(creature) = &outcome.reveal {
        let _ = writeln!(
            output,
            "It was #{} {} ({})",
            creature.dex_number,
            creature.name,
            creature.types.join("/")
        );
    }
    output
}

/// Format a finished sweep and its catalog as human-readable text.
pub(super) fn format_sweep(outcome: &SweepOutcome, manifest: &CatalogManifest) -> String {
    let stats = &outcome.stats;
    let secs = stats.elapsed.as_secs_f64();
    #[allow(clippy::cast_precision_loss)]
    let rate = if secs > 0.0 {
        stats.combinations_checked as f64 / secs
    } else {
        0.0
    };
    let mut output = String::new();
    let _ = writeln!(output, "Generation {} ({})", outcome.generation, outcome.mode);
    let _ = writeln!(
        output,
        "  Creatures:    {} ({} skipped)",
        stats.creatures_total, stats.creatures_skipped
    );
    let _ = writeln!(output, "  Checked:      {}", stats.combinations_checked);
    let _ = writeln!(output, "  Unique:       {}", manifest.puzzles);
    let _ = writeln!(output, "  Duration:     {secs:.2}s ({rate:.0} checks/sec)");
    output
}
