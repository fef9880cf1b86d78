use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FrontendError;

#[derive(Hash, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = FrontendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(PostId)
            .map_err(|_err| FrontendError::InvalidPostId(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    pub old_content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    Display,
    Editing(EditSession),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub view: ViewState,
}

/// What a Save click amounts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Unchanged,
    Changed { content: String },
}

/// Every post rendered on the page, keyed by id.
#[derive(Debug, Default)]
pub struct PostRepository {
    posts: BTreeMap<PostId, Post>,
}

impl PostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a post in Display state. Re-inserting replaces the content
    /// and resets the view.
    pub fn insert(&mut self, id: PostId, content: String) {
        self.posts.insert(
            id,
            Post {
                id,
                content,
                view: ViewState::Display,
            },
        );
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_editing(&self, id: PostId) -> bool {
        matches!(
            self.get(id).map(|post| &post.view),
            Some(ViewState::Editing(_))
        )
    }

    /// Display -> Editing, capturing `old_content`. Clicking edit on a post
    /// already being edited restarts the session with the new capture.
    pub fn begin_edit(&mut self, id: PostId, old_content: String) -> Result<&Post, FrontendError> {
        let post = self
            .posts
            .get_mut(&id)
            .ok_or(FrontendError::UnknownPost(id))?;
        post.view = ViewState::Editing(EditSession { old_content });
        Ok(post)
    }

    /// Editing -> Display, dropping the session.
    pub fn discard(&mut self, id: PostId) -> Result<EditSession, FrontendError> {
        let post = self
            .posts
            .get_mut(&id)
            .ok_or(FrontendError::UnknownPost(id))?;

        match std::mem::replace(&mut post.view, ViewState::Display) {
            ViewState::Editing(session) => Ok(session),
            ViewState::Display => Err(FrontendError::NotEditing(id)),
        }
    }

    /// Compares `current` with the captured content. Unchanged text closes
    /// the editor; changed text leaves it open until the page reloads.
    pub fn save(&mut self, id: PostId, current: &str) -> Result<SaveOutcome, FrontendError> {
        let post = self.posts.get(&id).ok_or(FrontendError::UnknownPost(id))?;

        let unchanged = match &post.view {
            ViewState::Editing(session) => session.old_content == current,
            ViewState::Display => return Err(FrontendError::NotEditing(id)),
        };

        if unchanged {
            self.discard(id)?;
            Ok(SaveOutcome::Unchanged)
        } else {
            Ok(SaveOutcome::Changed {
                content: current.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> PostRepository {
        let mut repo = PostRepository::new();
        repo.insert(PostId(1), "hello".into());
        repo.insert(PostId(2), "world".into());
        repo
    }

    #[test]
    fn parses_ids() {
        assert_eq!("42".parse::<PostId>().unwrap(), PostId(42));
        assert_eq!(" 7 ".parse::<PostId>().unwrap(), PostId(7));
        assert!(matches!(
            "abc".parse::<PostId>(),
            Err(FrontendError::InvalidPostId(raw)) if raw == "abc"
        ));
        assert!("-1".parse::<PostId>().is_err());
    }

    #[test]
    fn edit_then_discard() {
        let mut repo = repo();

        repo.begin_edit(PostId(1), "hello".into()).unwrap();
        assert!(repo.is_editing(PostId(1)));
        assert!(!repo.is_editing(PostId(2)));

        let session = repo.discard(PostId(1)).unwrap();
        assert_eq!(session.old_content, "hello");
        assert_eq!(repo.get(PostId(1)).unwrap().view, ViewState::Display);
    }

    #[test]
    fn unchanged_save_closes_editor() {
        let mut repo = repo();
        repo.begin_edit(PostId(1), "hello".into()).unwrap();

        assert_eq!(repo.save(PostId(1), "hello").unwrap(), SaveOutcome::Unchanged);
        assert!(!repo.is_editing(PostId(1)));
    }

    #[test]
    fn changed_save_keeps_editor_open() {
        let mut repo = repo();
        repo.begin_edit(PostId(1), "hello".into()).unwrap();

        assert_eq!(
            repo.save(PostId(1), "hello there").unwrap(),
            SaveOutcome::Changed {
                content: "hello there".into()
            }
        );
        assert!(repo.is_editing(PostId(1)));
        assert_eq!(repo.get(PostId(1)).unwrap().content, "hello");
    }

    #[test]
    fn reopening_recaptures() {
        let mut repo = repo();
        repo.begin_edit(PostId(1), "first".into()).unwrap();
        repo.begin_edit(PostId(1), "second".into()).unwrap();

        assert_eq!(repo.save(PostId(1), "second").unwrap(), SaveOutcome::Unchanged);
    }

    #[test]
    fn errors_for_bad_transitions() {
        let mut repo = repo();

        assert!(matches!(
            repo.begin_edit(PostId(9), String::new()),
            Err(FrontendError::UnknownPost(PostId(9)))
        ));
        assert!(matches!(
            repo.discard(PostId(1)),
            Err(FrontendError::NotEditing(PostId(1)))
        ));
        assert!(matches!(
            repo.save(PostId(2), "world"),
            Err(FrontendError::NotEditing(PostId(2)))
        ));
    }

    #[test]
    fn reinsert_resets_view() {
        let mut repo = repo();
        repo.begin_edit(PostId(1), "hello".into()).unwrap();
        repo.insert(PostId(1), "fresh".into());

        assert_eq!(repo.get(PostId(1)).unwrap().view, ViewState::Display);
        assert_eq!(repo.get(PostId(1)).unwrap().content, "fresh");
        assert_eq!(repo.len(), 2);
    }
}
