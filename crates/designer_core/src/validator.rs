use std::collections::BTreeMap;

use shared::domain::{Color, Validity, FACE_COUNT, STICKERS_PER_FACE};

use crate::cube_state::CubeState;

/// Per-color cardinality check.
///
/// A cube passes when every color covers exactly nine stickers. Permutation and
/// orientation parity are not examined, so a passing cube may still be unsolvable.
pub struct Validator;

impl Validator {
    pub fn color_counts(state: &CubeState) -> [usize; FACE_COUNT] {
        let mut counts = [0; FACE_COUNT];
        for color in state.stickers() {
            counts[usize::from(color.ordinal())] += 1;
        }
        counts
    }

    pub fn check(state: &CubeState) -> Validity {
        let counts: BTreeMap<Color, usize> = Color::ALL
            .into_iter()
            .zip(Self::color_counts(state))
            .filter(|(_, count)| *count != STICKERS_PER_FACE)
            .collect();

        if counts.is_empty() {
            Validity::Valid
        } else {
            Validity::Invalid { counts }
        }
    }
}
