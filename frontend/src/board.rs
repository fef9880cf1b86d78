use crate::dispatcher::{Dispatcher, Transport};
use crate::error::FrontendError;
use crate::posts::{PostId, PostRepository, SaveOutcome, ViewState};
use crate::request::{ActionRequest, FollowRelation};
use crate::textarea::{RowPolicy, Sizing};

/// The page's post list and the actions a user can take on it.
///
/// Handlers never touch the DOM. They update the repository and send
/// requests; callers render the resulting `ViewState`.
pub struct Board<T: Transport> {
    posts: PostRepository,
    dispatcher: Dispatcher<T>,
    rows: RowPolicy,
}

impl<T: Transport> Board<T> {
    pub fn new(posts: PostRepository, dispatcher: Dispatcher<T>, rows: RowPolicy) -> Self {
        Board {
            posts,
            dispatcher,
            rows,
        }
    }

    pub fn posts(&self) -> &PostRepository {
        &self.posts
    }

    pub fn view(&self, id: PostId) -> Option<&ViewState> {
        self.posts.get(id).map(|post| &post.view)
    }

    /// Opens the editor. Returns the initial textarea sizing for `current`,
    /// the text the editor starts with.
    pub fn edit(&mut self, id: PostId, old_content: String, current: &str) -> Result<Sizing, FrontendError> {
        self.posts.begin_edit(id, old_content)?;
        Ok(self.rows.for_text(current))
    }

    pub fn back(&mut self, id: PostId) -> Result<(), FrontendError> {
        self.posts.discard(id)?;
        Ok(())
    }

    /// Unchanged text behaves like Back. Changed text is sent as an edit;
    /// the reload that follows brings the post back to Display.
    pub fn save(&mut self, id: PostId, current: &str) -> Result<SaveOutcome, FrontendError> {
        let outcome = self.posts.save(id, current)?;

        if let SaveOutcome::Changed { content } = &outcome {
            self.dispatcher.dispatch(ActionRequest::Edit {
                post_id: id,
                content: content.clone(),
            })?;
        }

        Ok(outcome)
    }

    pub fn delete(&self, id: PostId) -> Result<(), FrontendError> {
        self.dispatcher.dispatch(ActionRequest::Delete { post_id: id })
    }

    pub fn react(&self, action: &str, id: PostId) -> Result<(), FrontendError> {
        if action.is_empty() {
            return Err(FrontendError::MissingAttribute(crate::config::attributes::ACTION));
        }

        log::info!("{} post {}", action, id);
        self.dispatcher.dispatch(ActionRequest::React {
            action: action.to_owned(),
            post_id: id,
        })
    }

    pub fn follow(&self, relation: FollowRelation) -> Result<(), FrontendError> {
        log::info!("{} follows", relation);
        self.dispatcher.dispatch(ActionRequest::Follow(relation))
    }

    pub fn unfollow(&self, relation: FollowRelation) -> Result<(), FrontendError> {
        log::info!("{} unfollows", relation);
        self.dispatcher.dispatch(ActionRequest::Unfollow(relation))
    }
}
