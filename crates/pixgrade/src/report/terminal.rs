use std::path::Path;

use crate::compare::CompareResult;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

/// Print the classified comparison result as a terminal card.
pub fn print_result(result: &CompareResult, diff_path: &Path) {
    let c = result.category;
    let matching = result.total_pixels - result.mismatched_pixels;

    println!();
    println!("  {}  {}{BOLD}{}{RESET}", c.icon, c.color, c.label);
    println!();
    println!(
        "  Pixels:      {} different, {matching} matching, {} total",
        result.mismatched_pixels, result.total_pixels
    );
    println!(
        "  Difference:  {}{:.2}%{RESET}  {DIM}{}{RESET}",
        c.color, result.diff_percent, c.description
    );
    println!("  Diff image:  {}", diff_path.display());
}
