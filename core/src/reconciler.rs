//! Optimistic list reconciliation.
//!
//! [`apply`] is the whole algorithm: a total, pure function from the
//! current list and one action to the list that should be rendered next.
//! [`Reconciler`] wraps it with the authoritative snapshot: dispatching
//! folds actions into the derived view, re-seeding throws the derived view
//! away and starts over from a fresh server read.

use crate::action::OptimisticAction;
use crate::record::{Identified, Record, RecordId, RowStatus};

/// Produces the list to render after `action`, without waiting for persistence
///
/// - `Create`: appends a provisional row with id `"optimistic"`, its parent
///   resolved by linear lookup in `references`
/// - `Update`: shallow-merges the patch over the matching row, in place,
///   re-resolving the parent when the patch moves the row to another one
/// - `Delete`: renames the matching row's id to `"delete"`, in place
/// - `Unrecognized`: returns the list unchanged
///
/// Update and delete against an id that is not in the list leave the list
/// unchanged. The input is never modified.
#[must_use]
pub fn apply<R: Record>(
    current: &[R],
    action: &OptimisticAction<R>,
    references: &[R::Parent],
) -> Vec<R> {
    match action {
        OptimisticAction::Create(draft) => {
            let mut row = R::provisional(draft.clone());
            row.set_id(RecordId::optimistic());
            if let Some(parent) = R::parent_id(draft)
                .and_then(|parent_id| references.iter().find(|p| p.id() == parent_id))
            {
                row.attach_parent(parent.clone());
            }

            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend_from_slice(current);
            next.push(row);
            next
        }
        OptimisticAction::Update { id, patch } => current
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if item.id() == id {
                    item.merge(patch.clone());
                    if let Some(parent) = R::patch_parent_id(patch)
                        .and_then(|parent_id| references.iter().find(|p| p.id() == parent_id))
                    {
                        item.attach_parent(parent.clone());
                    }
                }
                item
            })
            .collect(),
        OptimisticAction::Delete { id } => current
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if item.id() == id {
                    item.set_id(RecordId::deleting());
                }
                item
            })
            .collect(),
        OptimisticAction::Unrecognized { .. } => current.to_vec(),
    }
}

/// Authoritative snapshot plus the derived view rendered from it
#[derive(Clone, Debug)]
pub struct Reconciler<R: Record> {
    authoritative: Vec<R>,
    derived: Vec<R>,
    references: Vec<R::Parent>,
}

impl<R: Record> Reconciler<R> {
    /// Seeds the reconciler with an authoritative snapshot
    #[must_use]
    pub fn new(snapshot: Vec<R>) -> Self {
        Self {
            derived: snapshot.clone(),
            authoritative: snapshot,
            references: Vec::new(),
        }
    }

    /// Sets the side-loaded reference list used to resolve parents on create
    #[must_use]
    pub fn with_references(mut self, references: Vec<R::Parent>) -> Self {
        self.references = references;
        self
    }

    /// Folds one action into the derived view
    pub fn dispatch(&mut self, action: &OptimisticAction<R>) {
        self.derived = apply(&self.derived, action, &self.references);
    }

    /// Replaces the authoritative snapshot and discards every speculative edit
    pub fn reseed(&mut self, snapshot: Vec<R>) {
        self.derived.clone_from(&snapshot);
        self.authoritative = snapshot;
    }

    /// Replaces the reference list
    pub fn set_references(&mut self, references: Vec<R::Parent>) {
        self.references = references;
    }

    /// The list to render
    #[must_use]
    pub fn derived(&self) -> &[R] {
        &self.derived
    }

    /// The last server-confirmed list
    #[must_use]
    pub fn authoritative(&self) -> &[R] {
        &self.authoritative
    }

    /// The side-loaded reference list
    #[must_use]
    pub fn references(&self) -> &[R::Parent] {
        &self.references
    }

    /// Rows of the derived view with their rendering status
    pub fn rows(&self) -> impl Iterator<Item = (&R, RowStatus)> {
        self.derived.iter().map(|row| (row, row.status()))
    }

    /// Number of rows carrying a sentinel id
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.derived.iter().filter(|row| row.status().is_pending()).count()
    }

    /// Whether the derived view equals the authoritative snapshot
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.derived == self.authoritative
    }
}

impl<R: Record> Default for Reconciler<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Group {
        id: RecordId,
        title: String,
    }

    impl Identified for Group {
        fn id(&self) -> &RecordId {
            &self.id
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: RecordId,
        name: String,
        seats: u32,
        group_id: RecordId,
        group: Option<Group>,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct NewRow {
        name: String,
        seats: u32,
        group_id: RecordId,
    }

    #[derive(Clone, Debug, PartialEq, Default)]
    struct RowPatch {
        name: Option<String>,
        seats: Option<u32>,
        group_id: Option<RecordId>,
    }

    impl Identified for Row {
        fn id(&self) -> &RecordId {
            &self.id
        }
    }

    impl Record for Row {
        type Draft = NewRow;
        type Patch = RowPatch;
        type Parent = Group;

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn provisional(draft: NewRow) -> Self {
            Self {
                id: RecordId::new(""),
                name: draft.name,
                seats: draft.seats,
                group_id: draft.group_id,
                group: None,
            }
        }

        fn merge(&mut self, patch: RowPatch) {
            if let Some(name) = patch.name {
                self.name = name;
            }
            if let Some(seats) = patch.seats {
                self.seats = seats;
            }
            if let Some(group_id) = patch.group_id {
                self.group_id = group_id;
            }
        }

        fn parent_id(draft: &NewRow) -> Option<&RecordId> {
            Some(&draft.group_id)
        }

        fn patch_parent_id(patch: &RowPatch) -> Option<&RecordId> {
            patch.group_id.as_ref()
        }

        fn attach_parent(&mut self, parent: Group) {
            self.group = Some(parent);
        }
    }

    fn row(id: &str, name: &str) -> Row {
        Row {
            id: RecordId::new(id),
            name: name.to_string(),
            seats: 10,
            group_id: RecordId::new("g1"),
            group: None,
        }
    }

    fn draft(name: &str) -> NewRow {
        NewRow {
            name: name.to_string(),
            seats: 3,
            group_id: RecordId::new("g1"),
        }
    }

    fn create(draft: NewRow) -> OptimisticAction<Row> {
        OptimisticAction::Create(draft)
    }

    fn groups() -> Vec<Group> {
        vec![
            Group { id: RecordId::new("g0"), title: "Balcony".to_string() },
            Group { id: RecordId::new("g1"), title: "Floor".to_string() },
        ]
    }

    #[test]
    fn create_on_empty_list_yields_singleton() {
        let next = apply(&[], &create(draft("Gate A")), &groups());

        assert_eq!(next.len(), 1);
        assert!(next[0].id.is_optimistic());
        assert_eq!(next[0].name, "Gate A");
        assert_eq!(next[0].seats, 3);
        assert_eq!(next[0].group.as_ref().map(|g| g.title.as_str()), Some("Floor"));
    }

    #[test]
    fn create_appends_and_preserves_order() {
        let current = vec![row("1", "a"), row("2", "b")];
        let next = apply(&current, &create(draft("c")), &groups());

        assert_eq!(next.len(), 3);
        assert_eq!(&next[..2], &current[..]);
        assert!(next[2].id.is_optimistic());
    }

    #[test]
    fn create_without_matching_reference_leaves_parent_empty() {
        let next = apply(&[], &create(draft("c")), &[]);
        assert_eq!(next[0].group, None);
    }

    #[test]
    fn update_merges_new_fields_over_old() {
        let current = vec![row("5", "old"), row("6", "other")];
        let action = OptimisticAction::Update {
            id: RecordId::new("5"),
            patch: RowPatch { name: Some("X".to_string()), seats: None, group_id: None },
        };
        let next = apply(&current, &action, &[]);

        assert_eq!(next[0].id, RecordId::new("5"));
        assert_eq!(next[0].name, "X");
        assert_eq!(next[0].seats, 10);
        assert_eq!(next[1], current[1]);
    }

    #[test]
    fn update_moving_parent_re_resolves_join() {
        let mut current = row("5", "old");
        current.group = Some(groups()[1].clone());
        let action = OptimisticAction::Update {
            id: RecordId::new("5"),
            patch: RowPatch { group_id: Some(RecordId::new("g0")), ..RowPatch::default() },
        };
        let next = apply(&[current], &action, &groups());

        assert_eq!(next[0].group_id, RecordId::new("g0"));
        assert_eq!(next[0].group.as_ref().map(|g| g.title.as_str()), Some("Balcony"));
    }

    #[test]
    fn update_without_parent_change_keeps_join() {
        let mut current = row("5", "old");
        current.group = Some(groups()[1].clone());
        let action = OptimisticAction::Update {
            id: RecordId::new("5"),
            patch: RowPatch { name: Some("new".to_string()), ..RowPatch::default() },
        };
        let next = apply(&[current], &action, &groups());

        assert_eq!(next[0].group.as_ref().map(|g| g.title.as_str()), Some("Floor"));
    }

    #[test]
    fn update_of_missing_id_is_noop() {
        let current = vec![row("5", "old")];
        let action = OptimisticAction::Update {
            id: RecordId::new("9"),
            patch: RowPatch { name: Some("X".to_string()), seats: Some(1), group_id: None },
        };
        assert_eq!(apply(&current, &action, &[]), current);
    }

    #[test]
    fn delete_marks_without_removing() {
        let current = vec![row("4", "keep"), row("5", "gone")];
        let next = apply(&current, &OptimisticAction::Delete { id: RecordId::new("5") }, &[]);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0], current[0]);
        assert!(next[1].id.is_deleting());
        assert_eq!(next[1].name, "gone");
    }

    #[test]
    fn delete_of_missing_id_is_noop() {
        let current = vec![row("5", "a")];
        let next = apply(&current, &OptimisticAction::Delete { id: RecordId::new("7") }, &[]);
        assert_eq!(next, current);
    }

    #[test]
    fn unrecognized_action_is_noop() {
        let current = vec![row("5", "a")];
        let action = OptimisticAction::Unrecognized { tag: "noop".to_string() };
        assert_eq!(apply(&current, &action, &groups()), current);
    }

    #[test]
    fn reseed_drops_deleted_rows() {
        let mut reconciler = Reconciler::new(vec![row("5", "a"), row("6", "b")]);
        reconciler.dispatch(&OptimisticAction::Delete { id: RecordId::new("5") });
        assert_eq!(reconciler.pending_count(), 1);
        assert!(!reconciler.is_settled());

        reconciler.reseed(vec![row("6", "b")]);

        assert_eq!(reconciler.derived(), &[row("6", "b")]);
        assert!(reconciler.derived().iter().all(|r| !r.id.is_deleting()));
        assert!(reconciler.is_settled());
    }

    #[test]
    fn reseed_discards_every_speculative_edit() {
        let mut reconciler = Reconciler::new(vec![row("1", "a")]).with_references(groups());
        reconciler.dispatch(&OptimisticAction::Create(draft("new")));
        reconciler.dispatch(&OptimisticAction::Update {
            id: RecordId::new("1"),
            patch: RowPatch { name: Some("renamed".to_string()), seats: None, group_id: None },
        });
        assert_eq!(reconciler.derived().len(), 2);

        reconciler.reseed(vec![row("1", "a")]);

        assert_eq!(reconciler.derived(), reconciler.authoritative());
        assert_eq!(reconciler.references().len(), 2);
    }

    #[test]
    fn rows_report_status() {
        let mut reconciler = Reconciler::new(vec![row("1", "a")]);
        reconciler.dispatch(&OptimisticAction::Create(draft("b")));

        let statuses: Vec<RowStatus> = reconciler.rows().map(|(_, s)| s).collect();
        assert_eq!(statuses, vec![RowStatus::Confirmed, RowStatus::Creating]);
    }

    proptest::proptest! {
        #[test]
        fn update_touches_only_its_target(
            names in proptest::collection::vec("[a-z]{1,8}", 1..6),
            pick in proptest::prelude::any::<proptest::sample::Index>(),
            new_name in "[a-z]{1,8}",
        ) {
            let current: Vec<Row> = names
                .iter()
                .enumerate()
                .map(|(n, name)| row(&n.to_string(), name))
                .collect();
            let target = pick.get(&current).id.clone();
            let action = OptimisticAction::Update {
                id: target.clone(),
                patch: RowPatch { name: Some(new_name.clone()), seats: None, group_id: None },
            };

            let next = apply(&current, &action, &[]);

            proptest::prop_assert_eq!(next.len(), current.len());
            for (before, after) in current.iter().zip(&next) {
                if before.id == target {
                    proptest::prop_assert_eq!(&after.name, &new_name);
                    proptest::prop_assert_eq!(after.seats, before.seats);
                } else {
                    proptest::prop_assert_eq!(after, before);
                }
            }
        }
    }
}
