use crate::common::error::{AppError, ServiceResult};
use crate::models::matches::Side;
use crate::models::overlay::{Draft, EditKey, Region};
use crate::usecases::match_state::{MatchState, PendingCommit};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    /// `original` is what the region showed when editing began.
    Editing { draft: Draft, original: Draft },
}

/// View/edit state machine for one [`Region`].
///
/// The draft is owned here, so nothing that writes the [`MatchState`]
/// mirror can reach it.
#[derive(Debug)]
pub struct EditableField {
    region: Region,
    state: EditState,
}

impl EditableField {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            state: EditState::Viewing,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// Enters edit mode with a draft copied from the mirror. A region already
    /// under edit keeps its draft.
    pub fn begin_edit(&mut self, match_state: &mut MatchState) {
        if self.is_editing() {
            return;
        }
        let original = self.region.capture(match_state.snapshot());
        match_state.set_editing(self.region.fields(), true);
        self.state = EditState::Editing {
            draft: original.clone(),
            original,
        };
        debug!(region = self.region.as_str(), "Entered edit mode");
    }

    pub fn set_draft(&mut self, draft: Draft) -> ServiceResult<()> {
        if !self.region.accepts(&draft) {
            return Err(AppError::OverlayDraftMismatch);
        }
        match &mut self.state {
            EditState::Editing { draft: current, .. } => {
                *current = draft;
                Ok(())
            }
            EditState::Viewing => Err(AppError::OverlayRegionNotEditing),
        }
    }

    /// Steps one side of a staged match score. Nothing is committed.
    pub fn step_draft_score(&mut self, side: Side, delta: i64) -> ServiceResult<()> {
        let EditState::Editing { draft, .. } = &mut self.state else {
            return Err(AppError::OverlayRegionNotEditing);
        };
        if !draft.step_score(side, delta) {
            return Err(AppError::OverlayDraftMismatch);
        }
        Ok(())
    }

    /// Leaves edit mode and commits every field of the region in one go.
    ///
    /// Returns `None` when not editing or when the draft was discarded.
    pub fn save(&mut self, match_state: &mut MatchState) -> Option<PendingCommit> {
        let EditState::Editing { draft, original } =
            std::mem::replace(&mut self.state, EditState::Viewing)
        else {
            return None;
        };
        match_state.set_editing(self.region.fields(), false);
        match draft.into_commit(self.region, &original) {
            Some(commit) => Some(match_state.apply_local_commit(commit)),
            None => {
                debug!(region = self.region.as_str(), "Discarded empty draft");
                None
            }
        }
    }

    pub fn cancel(&mut self, match_state: &mut MatchState) {
        if let EditState::Editing { .. } = std::mem::replace(&mut self.state, EditState::Viewing) {
            match_state.set_editing(self.region.fields(), false);
            debug!(region = self.region.as_str(), "Cancelled edit");
        }
    }

    /// Enter saves and Escape cancels, for text regions under edit.
    pub fn handle_key(&mut self, key: EditKey, match_state: &mut MatchState) -> Option<PendingCommit> {
        if !self.region.is_text() || !self.is_editing() {
            return None;
        }
        match key {
            EditKey::Enter => self.save(match_state),
            EditKey::Escape => {
                self.cancel(match_state);
                None
            }
            EditKey::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches::{DEFAULT_MATCH_TYPE, MatchCommit, MatchFields, PlayerInfo};
    use crate::testing::InMemoryMatchStore;
    use std::sync::Arc;

    fn remote_state() -> (Arc<InMemoryMatchStore>, MatchState) {
        let store = InMemoryMatchStore::new();
        let snapshot = store.seed();
        (store.clone(), MatchState::remote(snapshot, store))
    }

    #[tokio::test]
    async fn cancel_leaves_committed_fields_untouched() {
        let mut state = MatchState::local();
        let _ = state.apply_local_commit(MatchCommit::MatchScore {
            score_a: 2,
            score_b: 1,
        });
        let before = state.snapshot().clone();

        let mut field = EditableField::new(Region::MatchScore);
        field.begin_edit(&mut state);
        field
            .set_draft(Draft::MatchScore {
                score_a: 5,
                score_b: 1,
            })
            .unwrap();
        field.cancel(&mut state);

        assert!(!field.is_editing());
        assert_eq!(state.snapshot(), &before);
        assert_eq!(state.snapshot().match_score(), (2, 1));
        assert!(state.editing().is_empty());
    }

    #[tokio::test]
    async fn empty_match_type_saves_default() {
        let (store, mut state) = remote_state();
        let mut field = EditableField::new(Region::MatchType);
        field.begin_edit(&mut state);
        field
            .set_draft(Draft::MatchType {
                match_type: String::new(),
            })
            .unwrap();

        let pending = field.save(&mut state).expect("match type always commits");
        assert!(pending.outcome().await.is_ok());
        assert_eq!(state.snapshot().match_type, DEFAULT_MATCH_TYPE);
        assert_eq!(
            store.commits(),
            vec![MatchCommit::MatchType {
                match_type: DEFAULT_MATCH_TYPE.to_owned()
            }]
        );
    }

    #[tokio::test]
    async fn player_save_commits_whole_block() {
        let (store, mut state) = remote_state();
        let before = state.snapshot().player_a.clone();

        let mut field = EditableField::new(Region::PlayerA);
        field.begin_edit(&mut state);
        let mut draft = before.clone();
        draft.team = "Corner Pocket".to_owned();
        field.set_draft(Draft::Player(draft)).unwrap();

        let pending = field.save(&mut state).unwrap();
        assert!(pending.outcome().await.is_ok());

        let expected = PlayerInfo {
            name: before.name.clone(),
            team: "Corner Pocket".to_owned(),
            skill: before.skill.clone(),
        };
        assert_eq!(
            store.commits(),
            vec![MatchCommit::PlayerInfo {
                side: Side::A,
                info: expected.clone()
            }]
        );
        assert_eq!(state.snapshot().player_a, expected);
    }

    #[tokio::test]
    async fn blank_player_draft_is_discarded() {
        let (store, mut state) = remote_state();
        let before = state.snapshot().clone();

        let mut field = EditableField::new(Region::PlayerB);
        field.begin_edit(&mut state);
        field.set_draft(Draft::Player(PlayerInfo::default())).unwrap();

        assert!(field.save(&mut state).is_none());
        assert!(!field.is_editing());
        assert_eq!(state.snapshot(), &before);
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn blank_player_fields_keep_previous_values() {
        let (store, mut state) = remote_state();
        let before = state.snapshot().player_a.clone();

        let mut field = EditableField::new(Region::PlayerA);
        field.begin_edit(&mut state);
        field
            .set_draft(Draft::Player(PlayerInfo {
                name: "  ".to_owned(),
                team: "Sharks".to_owned(),
                skill: "SL5".to_owned(),
            }))
            .unwrap();

        let pending = field.save(&mut state).unwrap();
        assert!(pending.outcome().await.is_ok());

        let stored = store.get(state.match_id()).unwrap();
        assert_eq!(stored.player_a.name, before.name);
        assert_eq!(stored.player_a.team, "Sharks");
        assert_eq!(stored.player_a.skill, "SL5");
        assert_eq!(state.snapshot().player_a, stored.player_a);
    }

    #[tokio::test]
    async fn remote_push_does_not_touch_draft() {
        let mut state = MatchState::local();
        let mut field = EditableField::new(Region::MatchType);
        field.begin_edit(&mut state);
        field
            .set_draft(Draft::MatchType {
                match_type: "Straight Pool".to_owned(),
            })
            .unwrap();

        let mut snapshot = state.snapshot().clone();
        snapshot.match_type = "Bank Pool".to_owned();
        snapshot.player_b_score = 6;
        state.apply_remote_update(&snapshot);

        assert_eq!(
            field.draft(),
            Some(&Draft::MatchType {
                match_type: "Straight Pool".to_owned()
            })
        );
        assert_eq!(state.snapshot().player_b_score, 6);
        assert_eq!(state.snapshot().match_type, DEFAULT_MATCH_TYPE);
    }

    #[tokio::test]
    async fn keys_drive_text_regions_only() {
        let mut state = MatchState::local();

        let mut match_type = EditableField::new(Region::MatchType);
        match_type.begin_edit(&mut state);
        match_type
            .set_draft(Draft::MatchType {
                match_type: "9-Ball".to_owned(),
            })
            .unwrap();
        assert!(match_type.handle_key(EditKey::Other, &mut state).is_none());
        assert!(match_type.is_editing());
        let pending = match_type.handle_key(EditKey::Enter, &mut state);
        assert!(pending.is_some());
        assert!(!match_type.is_editing());
        assert_eq!(state.snapshot().match_type, "9-Ball");

        let mut player = EditableField::new(Region::PlayerB);
        player.begin_edit(&mut state);
        assert!(player.handle_key(EditKey::Escape, &mut state).is_none());
        assert!(!player.is_editing());
        assert!(!state.editing().intersects(MatchFields::PlayerBInfo));

        let mut score = EditableField::new(Region::MatchScore);
        score.begin_edit(&mut state);
        assert!(score.handle_key(EditKey::Escape, &mut state).is_none());
        assert!(score.is_editing());
    }

    #[tokio::test]
    async fn draft_score_steps_clamp_without_committing() {
        let mut state = MatchState::local();
        let mut field = EditableField::new(Region::MatchScore);
        field.begin_edit(&mut state);

        field.step_draft_score(Side::A, -1).unwrap();
        field.step_draft_score(Side::B, 1).unwrap();
        assert_eq!(
            field.draft(),
            Some(&Draft::MatchScore {
                score_a: 0,
                score_b: 1
            })
        );
        assert_eq!(state.snapshot().match_score(), (0, 0));
    }

    #[test]
    fn drafts_are_checked_against_region() {
        let mut field = EditableField::new(Region::MatchType);
        let draft = Draft::MatchType {
            match_type: "x".to_owned(),
        };
        assert_eq!(
            field.set_draft(draft),
            Err(AppError::OverlayRegionNotEditing)
        );
        assert_eq!(
            field.set_draft(Draft::Player(PlayerInfo::default())),
            Err(AppError::OverlayDraftMismatch)
        );
        assert_eq!(
            field.step_draft_score(Side::A, 1),
            Err(AppError::OverlayRegionNotEditing)
        );
    }

    #[test]
    fn begin_edit_twice_keeps_draft() {
        let mut state = MatchState::local();
        let mut field = EditableField::new(Region::MatchType);
        field.begin_edit(&mut state);
        field
            .set_draft(Draft::MatchType {
                match_type: "Rotation".to_owned(),
            })
            .unwrap();
        field.begin_edit(&mut state);
        assert_eq!(
            field.draft(),
            Some(&Draft::MatchType {
                match_type: "Rotation".to_owned()
            })
        );
    }
}
