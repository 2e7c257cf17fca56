//! Drag-and-drop reorder support.
//!
//! The UI reports drags by step id; the store works on indices. The
//! resolution between the two lives here so it can be tested without a UI.

use super::step::{SequenceStep, StepId};

/// A finished drag: the dragged step and the step it was dropped on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active: StepId,
    pub over: Option<StepId>,
}

impl DragEnd {
    pub fn new(active: impl Into<StepId>, over: Option<StepId>) -> Self {
        Self {
            active: active.into(),
            over,
        }
    }
}

/// Resolve a drag to `(old_index, new_index)`.
///
/// Returns `None` when there is no drop target, the step was dropped on
/// itself, or either id is not in the list.
pub fn resolve_drag(steps: &[SequenceStep], drag: &DragEnd) -> Option<(usize, usize)> {
    let over = drag.over.as_ref()?;
    if *over == drag.active {
        return None;
    }
    let old_index = steps.iter().position(|s| s.id == drag.active)?;
    let new_index = steps.iter().position(|s| s.id == *over)?;
    Some((old_index, new_index))
}

/// Remove the item at `from` and insert it at `to`.
///
/// Returns false (and leaves `items` alone) when either index is out of
/// range or the two are equal.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Rewrite positions so they match array order, starting at 0
pub fn renumber(steps: &mut [SequenceStep]) {
    for (index, step) in steps.iter_mut().enumerate() {
        step.position = index as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::step::StepType;

    fn steps(ids: &[&str]) -> Vec<SequenceStep> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut step = SequenceStep::new(StepType::Wait, i as u32);
                step.id = (*id).to_string();
                step
            })
            .collect()
    }

    #[test]
    fn test_resolve_drag_to_indices() {
        let list = steps(&["a", "b", "c"]);
        let drag = DragEnd::new("a", Some("c".to_string()));
        assert_eq!(resolve_drag(&list, &drag), Some((0, 2)));
    }

    #[test]
    fn test_resolve_drag_without_target() {
        let list = steps(&["a", "b"]);
        assert_eq!(resolve_drag(&list, &DragEnd::new("a", None)), None);
    }

    #[test]
    fn test_resolve_drag_onto_itself() {
        let list = steps(&["a", "b"]);
        let drag = DragEnd::new("b", Some("b".to_string()));
        assert_eq!(resolve_drag(&list, &drag), None);
    }

    #[test]
    fn test_resolve_drag_unknown_id() {
        let list = steps(&["a", "b"]);
        let drag = DragEnd::new("a", Some("zzz".to_string()));
        assert_eq!(resolve_drag(&list, &drag), None);
    }

    #[test]
    fn test_move_item_splice_semantics() {
        let mut items = vec![1, 2, 3, 4];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec![2, 3, 1, 4]);
        assert!(move_item(&mut items, 2, 0));
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_move_item_to_same_index() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 1, 1));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_item_out_of_range() {
        let mut items = vec![1, 2];
        assert!(!move_item(&mut items, 0, 5));
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_renumber() {
        let mut list = steps(&["a", "b", "c"]);
        list[0].position = 7;
        list[2].position = 42;
        renumber(&mut list);
        let positions: Vec<u32> = list.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
