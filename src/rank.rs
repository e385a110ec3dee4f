// Competition ranking with ties ("1,2,2,4" style, not ordinal "1,2,3,4").

use serde::Serialize;

/// A sorted row decorated with its competition position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub display_position: usize,
    /// True only for the first row of a tie group.
    pub show_position: bool,
    #[serde(flatten)]
    pub row: T,
}

/// Walk an already-sorted sequence and assign competition positions.
///
/// `key_fn` must extract the rank-relevant key the sequence was sorted by,
/// excluding any final name tiebreak. Rows with equal keys share the
/// position of the group's first row; a tie group of size k starting at
/// ordinal index i occupies positions i..i+k-1 all displaying i, and the
/// next distinct row resumes at ordinal index i+k.
pub fn assign_competition_ranks<T, K: PartialEq>(
    rows: Vec<T>,
    key_fn: impl Fn(&T) -> K,
) -> Vec<Ranked<T>> {
    let mut ranked = Vec::with_capacity(rows.len());
    let mut last_key: Option<K> = None;
    let mut last_position = 0;

    for (i, row) in rows.into_iter().enumerate() {
        let index = i + 1;
        let key = key_fn(&row);
        let starts_group = last_key.as_ref() != Some(&key);
        if starts_group {
            last_position = index;
            last_key = Some(key);
        }
        ranked.push(Ranked {
            display_position: last_position,
            show_position: starts_group,
            row,
        });
    }

    ranked
}
