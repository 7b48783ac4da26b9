//! Style metadata for comparison plots.
//!
//! Pure lookup, no drawing: a rendering collaborator maps these names onto
//! actual pens. Known condition labels keep a fixed color so the same method
//! looks the same across figures; everything else cycles the default palette
//! by condition index.

use serde::{Deserialize, Serialize};

/// Fixed colors for well-known condition labels (case-insensitive).
const KNOWN_COLORS: &[(&str, &str)] = &[
    ("baseline", "#555555"),
    ("ours", "#d62728"),
    ("random", "#949494"),
    ("sgd", "#0173b2"),
    ("adam", "#de8f05"),
    ("rmsprop", "#029e73"),
    ("adagrad", "#cc78bc"),
];

/// Colorblind-safe default palette, cycled by condition index.
const DEFAULT_PALETTE: &[&str] = &[
    "#0173b2", "#de8f05", "#029e73", "#d55e00", "#cc78bc", "#ca9161", "#fbafe4", "#949494",
    "#ece133", "#56b4e9",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// Per-condition style attached to chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionStyle {
    pub color: String,
    pub linestyle: LineStyle,
}

/// Resolve the style for a condition label at position `index` in the
/// legend order. Pruning-variant labels render dashed so ablations are
/// visually separable from their parent method.
pub fn style_for(label: &str, index: usize) -> ConditionStyle {
    let lowered = label.to_ascii_lowercase();
    let color = KNOWN_COLORS
        .iter()
        .find(|(known, _)| *known == lowered)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]);
    let linestyle = if lowered.contains("prun") {
        LineStyle::Dashed
    } else {
        LineStyle::Solid
    };
    ConditionStyle {
        color: color.to_string(),
        linestyle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_keep_their_color() {
        assert_eq!(style_for("sgd", 0).color, "#0173b2");
        assert_eq!(style_for("SGD", 7).color, "#0173b2");
        assert_eq!(style_for("Baseline", 3).color, "#555555");
    }

    #[test]
    fn unknown_labels_cycle_the_palette() {
        assert_eq!(style_for("mystery", 0).color, DEFAULT_PALETTE[0]);
        assert_eq!(style_for("mystery", 3).color, DEFAULT_PALETTE[3]);
        assert_eq!(
            style_for("mystery", DEFAULT_PALETTE.len()).color,
            DEFAULT_PALETTE[0]
        );
    }

    #[test]
    fn pruning_labels_render_dashed() {
        assert_eq!(style_for("sgd-pruned", 0).linestyle, LineStyle::Dashed);
        assert_eq!(style_for("Pruning-0.5", 1).linestyle, LineStyle::Dashed);
        assert_eq!(style_for("sgd", 0).linestyle, LineStyle::Solid);
    }
}
