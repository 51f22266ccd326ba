//! Collision sweep for chord labels.
//!
//! Labels are processed once, left to right in text order. Each one keeps
//! its natural position unless that would bring it closer than `min_gap` to
//! the label placed before it on the same row, in which case it is pushed
//! right by exactly the missing amount. Earlier labels are never moved.

use log::trace;

/// A label at the position the text flow puts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalLabel {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// A label after collision correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLabel {
    pub natural_x: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

impl ResolvedLabel {
    /// How far the label was pushed right of its anchor.
    pub fn shift(&self) -> f64 {
        self.x - self.natural_x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Fold state: the row currently being filled and its rightmost label edge.
#[derive(Debug, Clone, Copy)]
struct RowCursor {
    y: f64,
    right: f64,
}

/// Resolve overlaps between labels given in text order.
///
/// A label starts a new row when its `y` differs from the previous label's by
/// more than `row_tolerance`; a new row carries no constraint from the row
/// above.
pub fn resolve_collisions(labels: &[NaturalLabel], min_gap: f64, row_tolerance: f64) -> Vec<ResolvedLabel> {
    labels
        .iter()
        .scan(None::<RowCursor>, |cursor, label| {
            let same_row = cursor.map(|c| (label.y - c.y).abs() <= row_tolerance);
            let x = match (*cursor, same_row) {
                (Some(c), Some(true)) => {
                    let min_left = c.right + min_gap;
                    if label.x < min_left {
                        trace!("label at {:.2} pushed to {:.2}", label.x, min_left);
                        min_left
                    } else {
                        label.x
                    }
                }
                _ => label.x,
            };
            let resolved = ResolvedLabel {
                natural_x: label.x,
                x,
                y: label.y,
                width: label.width,
            };
            *cursor = Some(RowCursor {
                y: label.y,
                right: resolved.right(),
            });
            Some(resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAP: f64 = 1.0;
    const TOLERANCE: f64 = 0.5;

    fn label(x: f64, y: f64, width: f64) -> NaturalLabel {
        NaturalLabel { x, y, width }
    }

    #[test]
    fn test_close_labels_are_pushed_to_exact_gap() {
        // Second label starts 0.3 glyphs after the first one ends
        let resolved = resolve_collisions(&[label(0.0, 0.0, 3.0), label(3.3, 0.0, 2.0)], GAP, TOLERANCE);
        assert_eq!(resolved[0].x, 0.0);
        assert_eq!(resolved[1].x, 4.0);
        assert_eq!(resolved[1].x - resolved[0].right(), GAP);
        assert!((resolved[1].shift() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_labels_far_apart_keep_natural_position() {
        let resolved = resolve_collisions(&[label(0.0, 0.0, 2.0), label(10.0, 0.0, 2.0)], GAP, TOLERANCE);
        assert_eq!(resolved[1].x, 10.0);
        assert_eq!(resolved[1].shift(), 0.0);
    }

    #[test]
    fn test_new_row_is_not_affected_by_row_above() {
        let resolved = resolve_collisions(
            &[label(0.0, 0.0, 5.0), label(1.0, 0.0, 2.0), label(0.0, 40.0, 2.0)],
            GAP,
            TOLERANCE,
        );
        assert_eq!(resolved[1].x, 6.0);
        assert_eq!(resolved[2].x, 0.0);
        assert_eq!(resolved[2].shift(), 0.0);
    }

    #[test]
    fn test_small_vertical_jitter_is_same_row() {
        let resolved = resolve_collisions(&[label(0.0, 0.0, 3.0), label(2.0, 0.3, 1.0)], GAP, TOLERANCE);
        assert_eq!(resolved[1].x, 4.0);
    }

    #[test]
    fn test_pushes_cascade_left_to_right() {
        let resolved = resolve_collisions(
            &[label(0.0, 0.0, 2.0), label(1.0, 0.0, 2.0), label(2.0, 0.0, 2.0)],
            GAP,
            TOLERANCE,
        );
        let xs: Vec<f64> = resolved.iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0]);
        for pair in resolved.windows(2) {
            assert!(pair[1].x >= pair[0].right() + GAP);
        }
    }

    #[test]
    fn test_rerun_is_stable() {
        let input = [label(0.0, 0.0, 4.0), label(1.0, 0.0, 4.0)];
        assert_eq!(
            resolve_collisions(&input, GAP, TOLERANCE),
            resolve_collisions(&input, GAP, TOLERANCE)
        );
        assert!(resolve_collisions(&[], GAP, TOLERANCE).is_empty());
    }
}
