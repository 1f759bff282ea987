//! Phase listing: `docforge phases`.

use anyhow::Result;

pub fn cmd_phases() -> Result<()> {
    use docforge::phase::Phase;

    println!();
    println!(
        "{:<4} {:<50} {:<12} {:<7} File",
        "#", "Phase", "Tag", "Review"
    );
    println!(
        "{:<4} {:<50} {:<12} {:<7} ----",
        "--", "-----", "---", "------"
    );

    for (i, phase) in Phase::sequence().iter().enumerate() {
        let review = if phase.has_approval_gate() {
            console::style("yes").green()
        } else {
            console::style("no").dim()
        };
        println!(
            "{:<4} {:<50} {:<12} {:<7} {}",
            i + 1,
            phase.display_name(),
            phase.tag(),
            review,
            phase.artifact_filename()
        );
    }
    println!();
    Ok(())
}
