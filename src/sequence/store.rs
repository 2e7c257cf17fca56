//! Sequence store: the reducer behind the sequence editor.
//!
//! All changes go through [`reduce`], which applies one [`SequenceAction`]
//! and re-validates whatever it touched. [`SequenceStore`] owns one state
//! instance and offers typed helpers around `dispatch`. There is no global
//! store; each editor constructs its own.

use chrono::{DateTime, Utc};

use super::reorder::{move_item, renumber, resolve_drag, DragEnd};
use super::step::{new_step_id, SequenceStep, StepId, StepPatch, StepType};
use super::validation::{revalidate, CONTENT_REQUIRED};

/// Everything the editor knows about the sequence being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceState {
    pub steps: Vec<SequenceStep>,
    pub selected_step_id: Option<StepId>,
    /// Unsaved user edits exist
    pub is_modified: bool,
    pub is_loading: bool,
    pub last_saved: Option<DateTime<Utc>>,
    /// Bumped on every content change; lets a save detect edits made
    /// while it was in flight
    pub revision: u64,
}

/// Transitions understood by [`reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceAction {
    /// Replace the list wholesale (load or reset). Not a user edit.
    SetSteps(Vec<SequenceStep>),
    AddStep {
        id: StepId,
        step_type: StepType,
        /// Insert after this position; `-1` inserts at the front
        after_position: i64,
    },
    UpdateStep {
        id: StepId,
        patch: StepPatch,
    },
    DeleteStep(StepId),
    ReorderSteps {
        old_index: usize,
        new_index: usize,
    },
    SelectStep(Option<StepId>),
    SetLoading(bool),
    MarkSaved(DateTime<Utc>),
    MarkModified,
}

/// Apply one action to the state
pub fn reduce(state: &mut SequenceState, action: SequenceAction) {
    match action {
        SequenceAction::SetSteps(mut steps) => {
            steps.sort_by_key(|s| s.position);
            renumber(&mut steps);
            steps.iter_mut().for_each(revalidate);
            if let Some(selected) = &state.selected_step_id {
                if !steps.iter().any(|s| &s.id == selected) {
                    state.selected_step_id = None;
                }
            }
            state.steps = steps;
            state.is_modified = false;
            state.revision += 1;
        }
        SequenceAction::AddStep {
            id,
            step_type,
            after_position,
        } => {
            let last = state.steps.len() as i64 - 1;
            let after = after_position.clamp(-1, last);
            let position = (after + 1) as u32;

            for step in &mut state.steps {
                if i64::from(step.position) > after {
                    step.position += 1;
                }
            }

            let mut step = SequenceStep::new(step_type, position);
            step.id = id.clone();
            if step_type == StepType::Email {
                step.is_valid = false;
                step.errors = vec![CONTENT_REQUIRED.to_string()];
            } else {
                revalidate(&mut step);
            }
            state.steps.push(step);
            state.steps.sort_by_key(|s| s.position);

            state.selected_step_id = Some(id);
            touch(state);
        }
        SequenceAction::UpdateStep { id, patch } => {
            let Some(step) = state.steps.iter_mut().find(|s| s.id == id) else {
                return;
            };
            step.apply(patch);
            revalidate(step);
            touch(state);
        }
        SequenceAction::DeleteStep(id) => {
            let before = state.steps.len();
            state.steps.retain(|s| s.id != id);
            if state.steps.len() == before {
                return;
            }
            renumber(&mut state.steps);
            if state.selected_step_id.as_deref() == Some(id.as_str()) {
                state.selected_step_id = None;
            }
            touch(state);
        }
        SequenceAction::ReorderSteps {
            old_index,
            new_index,
        } => {
            if !move_item(&mut state.steps, old_index, new_index) {
                return;
            }
            renumber(&mut state.steps);
            touch(state);
        }
        SequenceAction::SelectStep(id) => {
            state.selected_step_id = id;
        }
        SequenceAction::SetLoading(loading) => {
            state.is_loading = loading;
        }
        SequenceAction::MarkSaved(at) => {
            state.is_modified = false;
            state.last_saved = Some(at);
        }
        SequenceAction::MarkModified => {
            state.is_modified = true;
        }
    }
}

fn touch(state: &mut SequenceState) {
    state.is_modified = true;
    state.revision += 1;
}

/// Owner of one sequence's editing state
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    state: SequenceState,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `steps`, as if loaded from the backend
    pub fn with_steps(steps: Vec<SequenceStep>) -> Self {
        let mut store = Self::new();
        store.set_steps(steps);
        store
    }

    pub fn dispatch(&mut self, action: SequenceAction) {
        tracing::trace!(?action, "sequence action");
        reduce(&mut self.state, action);
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    pub fn steps(&self) -> &[SequenceStep] {
        &self.state.steps
    }

    pub fn is_modified(&self) -> bool {
        self.state.is_modified
    }

    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    pub fn step(&self, id: &str) -> Option<&SequenceStep> {
        self.state.steps.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.state.steps.iter().position(|s| s.id == id)
    }

    pub fn selected_step(&self) -> Option<&SequenceStep> {
        self.state
            .selected_step_id
            .as_deref()
            .and_then(|id| self.step(id))
    }

    pub fn invalid_count(&self) -> usize {
        self.state.steps.iter().filter(|s| !s.is_valid).count()
    }

    pub fn set_steps(&mut self, steps: Vec<SequenceStep>) {
        self.dispatch(SequenceAction::SetSteps(steps));
    }

    /// Reset to the seed sequence: a single empty email step
    pub fn reset_to_empty(&mut self) {
        self.set_steps(vec![SequenceStep::new(StepType::Email, 0)]);
    }

    /// Insert a new step after `after_position` and select it
    pub fn add_step(&mut self, step_type: StepType, after_position: i64) -> StepId {
        let id = new_step_id();
        self.dispatch(SequenceAction::AddStep {
            id: id.clone(),
            step_type,
            after_position,
        });
        id
    }

    /// Append a new step at the end of the sequence
    pub fn push_step(&mut self, step_type: StepType) -> StepId {
        let last = self.state.steps.len() as i64 - 1;
        self.add_step(step_type, last)
    }

    pub fn update_step(&mut self, id: &str, patch: StepPatch) {
        self.dispatch(SequenceAction::UpdateStep {
            id: id.to_string(),
            patch,
        });
    }

    pub fn delete_step(&mut self, id: &str) {
        self.dispatch(SequenceAction::DeleteStep(id.to_string()));
    }

    pub fn reorder_steps(&mut self, old_index: usize, new_index: usize) {
        self.dispatch(SequenceAction::ReorderSteps {
            old_index,
            new_index,
        });
    }

    /// Move the step `from` to where `to` currently sits.
    ///
    /// Returns true if the order changed.
    pub fn reorder_by_id(&mut self, from: &str, to: &str) -> bool {
        self.handle_drag_end(&DragEnd::new(from, Some(to.to_string())))
    }

    /// Apply a finished drag; no-op when there is nothing to move
    pub fn handle_drag_end(&mut self, drag: &DragEnd) -> bool {
        match resolve_drag(&self.state.steps, drag) {
            Some((old_index, new_index)) => {
                self.reorder_steps(old_index, new_index);
                true
            }
            None => false,
        }
    }

    pub fn select_step(&mut self, id: Option<&str>) {
        self.dispatch(SequenceAction::SelectStep(id.map(str::to_string)));
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.dispatch(SequenceAction::SetLoading(loading));
    }

    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.dispatch(SequenceAction::MarkSaved(at));
    }

    pub fn mark_modified(&mut self) {
        self.dispatch(SequenceAction::MarkModified);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::validation::SUBJECT_REQUIRED;
    use std::collections::HashSet;

    fn ids(store: &SequenceStore) -> Vec<String> {
        store.steps().iter().map(|s| s.id.clone()).collect()
    }

    fn positions(store: &SequenceStore) -> Vec<u32> {
        store.steps().iter().map(|s| s.position).collect()
    }

    fn store_with(types: &[StepType]) -> SequenceStore {
        let mut store = SequenceStore::new();
        for t in types {
            store.push_step(*t);
        }
        store
    }

    #[test]
    fn test_add_step_to_empty_sequence() {
        let mut store = SequenceStore::new();
        let id = store.add_step(StepType::Email, -1);

        assert_eq!(store.steps().len(), 1);
        let step = &store.steps()[0];
        assert_eq!(step.id, id);
        assert_eq!(step.position, 0);
        assert!(!step.is_valid);
        assert_eq!(step.errors, vec![CONTENT_REQUIRED]);
        assert_eq!(store.state().selected_step_id.as_deref(), Some(id.as_str()));
        assert!(store.is_modified());
    }

    #[test]
    fn test_add_step_grows_list_with_unique_ids() {
        let mut store = store_with(&[StepType::Email, StepType::Wait, StepType::Email]);
        let before: HashSet<String> = ids(&store).into_iter().collect();

        let id = store.add_step(StepType::Wait, 0);

        assert_eq!(store.steps().len(), 4);
        assert!(!before.contains(&id));
        assert_eq!(store.selected_step().map(|s| s.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn test_add_step_inserts_after_position() {
        let mut store = store_with(&[StepType::Email, StepType::Email]);
        let id = store.add_step(StepType::Wait, 0);

        assert_eq!(store.index_of(&id), Some(1));
        assert_eq!(positions(&store), vec![0, 1, 2]);
    }

    #[test]
    fn test_add_wait_step_starts_valid() {
        let mut store = SequenceStore::new();
        let id = store.add_step(StepType::Wait, -1);
        let step = store.step(&id).unwrap();
        assert!(step.is_valid);
        assert!(step.errors.is_empty());
    }

    #[test]
    fn test_add_step_clamps_position() {
        let mut store = store_with(&[StepType::Email]);
        let id = store.add_step(StepType::Wait, 99);
        assert_eq!(store.step(&id).unwrap().position, 1);
        assert_eq!(positions(&store), vec![0, 1]);
    }

    #[test]
    fn test_first_edit_replaces_placeholder_error() {
        let mut store = SequenceStore::new();
        let id = store.add_step(StepType::Email, -1);

        store.update_step(&id, StepPatch::default().body("Hello").sender("s1"));

        assert_eq!(store.step(&id).unwrap().errors, vec![SUBJECT_REQUIRED]);
    }

    #[test]
    fn test_update_step_revalidates() {
        let mut store = SequenceStore::new();
        let id = store.add_step(StepType::Email, -1);

        store.update_step(
            &id,
            StepPatch::default().subject("Hi").body("Hello").sender("s1"),
        );

        let step = store.step(&id).unwrap();
        assert!(step.is_valid);
        assert!(step.errors.is_empty());
        assert!(store.is_modified());
    }

    #[test]
    fn test_empty_update_is_a_touch() {
        let mut store = SequenceStore::with_steps(vec![SequenceStep::new(StepType::Email, 0)]);
        assert!(!store.is_modified());
        let before = store.steps().to_vec();
        let id = before[0].id.clone();

        store.update_step(&id, StepPatch::default());

        assert_eq!(store.steps(), before.as_slice());
        assert!(store.is_modified());
    }

    #[test]
    fn test_update_unknown_id_is_ignored() {
        let mut store = SequenceStore::with_steps(vec![SequenceStep::new(StepType::Email, 0)]);
        let before = store.state().clone();

        store.update_step("missing", StepPatch::default().subject("x"));

        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut store = store_with(&[StepType::Email, StepType::Wait]);
        let id = store.steps()[1].id.clone();
        store.select_step(Some(&id));

        store.delete_step(&id);

        assert_eq!(store.state().selected_step_id, None);
        assert_eq!(store.steps().len(), 1);
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut store = store_with(&[StepType::Email, StepType::Wait, StepType::Email]);
        let keep = store.steps()[2].id.clone();
        let drop = store.steps()[0].id.clone();
        store.select_step(Some(&keep));

        store.delete_step(&drop);

        assert_eq!(store.state().selected_step_id.as_deref(), Some(keep.as_str()));
    }

    #[test]
    fn test_delete_compacts_positions() {
        let mut store = store_with(&[
            StepType::Email,
            StepType::Wait,
            StepType::Email,
            StepType::Wait,
        ]);
        let middle = store.steps()[1].id.clone();
        store.delete_step(&middle);
        assert_eq!(positions(&store), vec![0, 1, 2]);

        let first = store.steps()[0].id.clone();
        store.delete_step(&first);
        assert_eq!(positions(&store), vec![0, 1]);
    }

    #[test]
    fn test_reorder_round_trip() {
        let mut store = store_with(&[
            StepType::Email,
            StepType::Wait,
            StepType::Email,
            StepType::Manual,
        ]);
        let original = ids(&store);

        store.reorder_steps(0, 3);
        assert_ne!(ids(&store), original);
        assert_eq!(positions(&store), vec![0, 1, 2, 3]);

        store.reorder_steps(3, 0);
        assert_eq!(ids(&store), original);
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let mut store = store_with(&[StepType::Email, StepType::Wait, StepType::Email]);
        let mut original = ids(&store);

        store.reorder_steps(2, 0);

        let mut reordered = ids(&store);
        assert_eq!(reordered[0], original[2]);
        original.sort();
        reordered.sort();
        assert_eq!(reordered, original);
    }

    #[test]
    fn test_reorder_out_of_range_is_ignored() {
        let mut store = SequenceStore::with_steps(vec![SequenceStep::new(StepType::Email, 0)]);
        store.reorder_steps(0, 4);
        assert!(!store.is_modified());
    }

    #[test]
    fn test_reorder_to_same_index_is_not_an_edit() {
        let mut store = SequenceStore::with_steps(vec![
            SequenceStep::new(StepType::Email, 0),
            SequenceStep::new(StepType::Wait, 1),
        ]);
        let revision = store.revision();
        store.reorder_steps(1, 1);
        assert!(!store.is_modified());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_drag_end_moves_step() {
        let mut store = store_with(&[StepType::Email, StepType::Wait, StepType::Email]);
        let original = ids(&store);

        let moved = store.handle_drag_end(&DragEnd::new(
            original[0].clone(),
            Some(original[2].clone()),
        ));

        assert!(moved);
        assert_eq!(
            ids(&store),
            vec![original[1].clone(), original[2].clone(), original[0].clone()]
        );
    }

    #[test]
    fn test_drag_end_without_target_changes_nothing() {
        let mut store = SequenceStore::with_steps(vec![
            SequenceStep::new(StepType::Email, 0),
            SequenceStep::new(StepType::Wait, 1),
        ]);
        let before = store.state().clone();
        let active = store.steps()[0].id.clone();

        assert!(!store.handle_drag_end(&DragEnd::new(active.clone(), None)));
        assert!(!store.reorder_by_id(&active, &active));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_select_has_no_side_effects() {
        let mut store = SequenceStore::with_steps(vec![SequenceStep::new(StepType::Email, 0)]);
        let revision = store.revision();
        let id = store.steps()[0].id.clone();

        store.select_step(Some(&id));

        assert!(!store.is_modified());
        assert_eq!(store.revision(), revision);
        assert_eq!(store.selected_step().map(|s| s.id.clone()), Some(id));
    }

    #[test]
    fn test_set_steps_resets_modified_and_validates() {
        let mut store = store_with(&[StepType::Email]);
        assert!(store.is_modified());

        let mut loaded = SequenceStep::new(StepType::Wait, 5);
        loaded.apply(StepPatch::default().wait_days(Some(0)));
        store.set_steps(vec![loaded]);

        assert!(!store.is_modified());
        let step = &store.steps()[0];
        assert_eq!(step.position, 0);
        assert!(!step.is_valid);
        assert_eq!(store.state().selected_step_id, None);
    }

    #[test]
    fn test_set_steps_sorts_by_position() {
        let mut a = SequenceStep::new(StepType::Email, 2);
        a.id = "a".to_string();
        let mut b = SequenceStep::new(StepType::Wait, 0);
        b.id = "b".to_string();

        let store = SequenceStore::with_steps(vec![a, b]);
        assert_eq!(ids(&store), vec!["b", "a"]);
    }

    #[test]
    fn test_mark_saved_records_timestamp() {
        let mut store = store_with(&[StepType::Wait]);
        let now = Utc::now();
        store.mark_saved(now);
        assert!(!store.is_modified());
        assert_eq!(store.state().last_saved, Some(now));

        store.mark_modified();
        assert!(store.is_modified());
    }

    #[test]
    fn test_reset_to_empty_seed() {
        let mut store = store_with(&[StepType::Wait, StepType::Wait]);
        store.reset_to_empty();
        assert_eq!(store.steps().len(), 1);
        assert_eq!(store.steps()[0].step_type(), StepType::Email);
        assert!(!store.is_modified());
    }
}
