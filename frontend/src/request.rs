use std::fmt;

use crate::posts::PostId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `follower -> followee`. Only the followee goes on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowRelation {
    pub follower: Option<String>,
    pub followee: String,
}

impl fmt::Display for FollowRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.follower {
            Some(follower) => write!(f, "{} -> {}", follower, self.followee),
            None => write!(f, "? -> {}", self.followee),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct EditBody {
    pub edited: bool,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRequest {
    Follow(FollowRelation),
    Unfollow(FollowRelation),
    /// `action` is whatever verb the server put on the control, e.g. `like`.
    React { action: String, post_id: PostId },
    Edit { post_id: PostId, content: String },
    Delete { post_id: PostId },
}

impl ActionRequest {
    pub fn method(&self) -> Method {
        match self {
            ActionRequest::Follow(_) | ActionRequest::Unfollow(_) => Method::Post,
            ActionRequest::React { .. } => Method::Get,
            ActionRequest::Edit { .. } => Method::Put,
            ActionRequest::Delete { .. } => Method::Delete,
        }
    }

    pub fn path(&self) -> String {
        match self {
            ActionRequest::Follow(relation) => {
                format!("/follow/{}", urlencoding::encode(&relation.followee))
            }
            ActionRequest::Unfollow(relation) => {
                format!("/unfollow/{}", urlencoding::encode(&relation.followee))
            }
            ActionRequest::React { action, post_id } => {
                format!("/{}/{}", urlencoding::encode(action), post_id)
            }
            ActionRequest::Edit { post_id, .. } | ActionRequest::Delete { post_id } => {
                format!("/posts/{}", post_id)
            }
        }
    }

    /// Mutations of a post must carry the page's csrf token.
    pub fn needs_csrf(&self) -> bool {
        matches!(self, ActionRequest::Edit { .. } | ActionRequest::Delete { .. })
    }

    pub fn body(&self) -> Result<Option<String>, serde_json::Error> {
        match self {
            ActionRequest::Edit { content, .. } => serde_json::to_string(&EditBody {
                edited: true,
                content: content.clone(),
            })
            .map(Some),
            _ => Ok(None),
        }
    }

    /// Headers other than the csrf token.
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        match self {
            ActionRequest::Follow(_) | ActionRequest::Unfollow(_) => {
                vec![("Content-Type", "application/json")]
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation() -> FollowRelation {
        FollowRelation {
            follower: Some("ana".into()),
            followee: "marko".into(),
        }
    }

    #[test]
    fn follow_shapes() {
        let follow = ActionRequest::Follow(relation());
        assert_eq!(follow.to_string(), "POST /follow/marko");
        assert_eq!(follow.headers(), vec![("Content-Type", "application/json")]);
        assert!(!follow.needs_csrf());
        assert_eq!(follow.body().unwrap(), None);

        let unfollow = ActionRequest::Unfollow(relation());
        assert_eq!(unfollow.to_string(), "POST /unfollow/marko");
    }

    #[test]
    fn react_uses_server_verb() {
        let like = ActionRequest::React {
            action: "like".into(),
            post_id: PostId(7),
        };
        assert_eq!(like.method(), Method::Get);
        assert_eq!(like.path(), "/like/7");
        assert!(like.headers().is_empty());
        assert!(!like.needs_csrf());
    }

    #[test]
    fn edit_body() {
        let edit = ActionRequest::Edit {
            post_id: PostId(3),
            content: "new \"text\"".into(),
        };
        assert_eq!(edit.to_string(), "PUT /posts/3");
        assert!(edit.needs_csrf());

        let body: serde_json::Value = serde_json::from_str(&edit.body().unwrap().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "edited": true, "content": "new \"text\"" })
        );
    }

    #[test]
    fn delete_has_no_body() {
        let delete = ActionRequest::Delete { post_id: PostId(42) };
        assert_eq!(delete.to_string(), "DELETE /posts/42");
        assert!(delete.needs_csrf());
        assert_eq!(delete.body().unwrap(), None);
    }

    #[test]
    fn path_segments_are_encoded() {
        let follow = ActionRequest::Follow(FollowRelation {
            follower: None,
            followee: "john doe/x".into(),
        });
        assert_eq!(follow.path(), "/follow/john%20doe%2Fx");
    }

    #[test]
    fn relation_display() {
        assert_eq!(relation().to_string(), "ana -> marko");

        let anonymous = FollowRelation {
            follower: None,
            followee: "marko".into(),
        };
        assert_eq!(anonymous.to_string(), "? -> marko");
    }
}
