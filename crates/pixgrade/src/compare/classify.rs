//! Severity classification of an aggregate comparison result.
//!
//! The category table is an explicit ordered array with strictly
//! increasing exclusive upper bounds and an infinite final bound, so the
//! lookup is total and iteration order is guaranteed.

/// One severity tier. `color` is the ANSI escape used by the terminal
/// report.
pub struct Category {
    pub exclusive_upper_bound: f64,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub static CATEGORIES: [Category; 4] = [
    Category {
        exclusive_upper_bound: 20.0,
        label: "Very similar",
        color: "\x1b[32m",
        icon: "\u{2705}",
        description: "Images are nearly identical",
    },
    Category {
        exclusive_upper_bound: 40.0,
        label: "Similar",
        color: "\x1b[36m",
        icon: "\u{1f50d}",
        description: "Images are very similar",
    },
    Category {
        exclusive_upper_bound: 60.0,
        label: "Somewhat different",
        color: "\x1b[33m",
        icon: "\u{26a0}\u{fe0f}",
        description: "Images have noticeable differences",
    },
    Category {
        exclusive_upper_bound: f64::INFINITY,
        label: "Very different",
        color: "\x1b[31m",
        icon: "\u{274c}",
        description: "Images are significantly different",
    },
];

/// First category whose bound strictly exceeds the percentage. A value
/// exactly on a bound belongs to the *next* category (`<`, not `<=`).
pub fn classify(diff_percent: f64) -> &'static Category {
    CATEGORIES
        .iter()
        .find(|c| diff_percent < c.exclusive_upper_bound)
        .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
}

/// Aggregate result of one comparison run. Derived entirely from the two
/// counts; never mutated after creation.
pub struct CompareResult {
    pub mismatched_pixels: u64,
    pub total_pixels: u64,
    pub diff_percent: f64,
    pub category: &'static Category,
}

impl CompareResult {
    pub fn new(mismatched_pixels: u64, total_pixels: u64) -> Self {
        debug_assert!(total_pixels > 0);
        debug_assert!(mismatched_pixels <= total_pixels);
        let diff_percent = (mismatched_pixels as f64 / total_pixels as f64) * 100.0;
        Self {
            mismatched_pixels,
            total_pixels,
            diff_percent,
            category: classify(diff_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_strictly_increase() {
        for pair in CATEGORIES.windows(2) {
            assert!(pair[0].exclusive_upper_bound < pair[1].exclusive_upper_bound);
        }
        assert!(CATEGORIES[CATEGORIES.len() - 1]
            .exclusive_upper_bound
            .is_infinite());
    }

    #[test]
    fn zero_percent_is_first_category() {
        assert_eq!(classify(0.0).label, "Very similar");
    }

    #[test]
    fn hundred_percent_is_last_category() {
        assert_eq!(classify(100.0).label, "Very different");
    }

    #[test]
    fn boundary_values_belong_to_the_next_category() {
        // 20 < 20 is false, so exactly 20% falls through to "Similar".
        assert_eq!(classify(20.0).label, "Similar");
        assert_eq!(classify(40.0).label, "Somewhat different");
        assert_eq!(classify(60.0).label, "Very different");
    }

    #[test]
    fn just_below_a_bound_stays_in_the_lower_category() {
        assert_eq!(classify(19.0).label, "Very similar");
        assert_eq!(classify(39.99).label, "Similar");
        assert_eq!(classify(59.99).label, "Somewhat different");
    }

    #[test]
    fn nineteen_of_one_hundred_pixels() {
        let result = CompareResult::new(19, 100);
        assert_eq!(result.diff_percent, 19.0);
        assert_eq!(result.category.label, "Very similar");
    }

    #[test]
    fn twenty_of_one_hundred_pixels() {
        let result = CompareResult::new(20, 100);
        assert_eq!(result.diff_percent, 20.0);
        assert_eq!(result.category.label, "Similar");
    }

    #[test]
    fn percent_stays_in_range() {
        for (m, t) in [(0u64, 16u64), (7, 16), (16, 16), (99, 100)] {
            let result = CompareResult::new(m, t);
            assert!((0.0..=100.0).contains(&result.diff_percent));
        }
    }
}
