use anyhow::{Result, bail};
use colored::Colorize;
use ethos_core::scoring::{MAX_EVS, MIN_EVS, performance_rating, scale_session};

/// Prints the scaled session score for a list of EVS values.
pub fn run(evs: &[f64]) -> Result<()> {
    if let Some(bad) = evs.iter().find(|v| !(MIN_EVS..=MAX_EVS).contains(*v)) {
        bail!("EVS values must lie in [{MIN_EVS}, {MAX_EVS}], got {bad}");
    }

    let score = scale_session(evs);
    let rating = performance_rating(score.final_score);

    println!(
        "{}",
        format!("{:.1}/10 - {}", score.final_score, rating.rating)
            .bright_magenta()
            .bold()
    );
    println!("{}", rating.description);
    println!(
        "{}",
        format!(
            "raw {:+} over {} choices, range [{}, {}], scaled {:.2}",
            score.raw_total,
            evs.len(),
            score.min_possible,
            score.max_possible,
            score.scaled
        )
        .bright_black()
    );
    Ok(())
}
