//! Raw category score → [0, 1].
//!
//! Each category's raw score lives on its own scale; dividing by the
//! category ceiling and clamping puts them on a common footing before they
//! are blended with opinion scores.

use crate::domain::Category;

/// Raw score that normalizes to exactly 1.0.
pub fn ceiling(category: Category) -> f64 {
    match category {
        Category::Trend | Category::Short => 100.0,
        Category::Condor => 15.0,
        Category::Wheel => 10.0,
        Category::Survivor => 30.0,
    }
}

/// `clamp(raw / ceiling, 0, 1)`. A NaN raw score normalizes to 0.
pub fn normalize(category: Category, raw: f64) -> f64 {
    let scaled = raw / ceiling(category);
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, 1.0)
}
