use log::LevelFilter;
use web_sys::Document;

use crate::error::FrontendError;

/// Ids and classes the server-rendered markup is expected to carry.
pub mod selectors {
    pub const CONFIG_SCRIPT: &'static str = "#network-config";

    pub const CREATE_POST_BUTTON: &'static str = ".create-post-btn";
    pub const CREATE_POST_BUTTON_SECONDARY: &'static str = "#create-post-btn-2";
    pub const CREATE_POST_SECTION: &'static str = ".create-post";
    pub const HIDE_CREATE_POST_BUTTON: &'static str = ".hide1";

    pub const ALL_POSTS_BUTTON: &'static str = "#all-posts-btn";
    pub const ALL_POSTS_SECTION: &'static str = "#all-posts";
    pub const HIDE_ALL_POSTS_BUTTON: &'static str = "#hide2";

    pub const EDIT_POST_BUTTON: &'static str = "#edit-post";
    pub const DELETE_POST_BUTTON: &'static str = "#delete-post";
    pub const BACK_BUTTON: &'static str = "#back-btn";
    pub const SAVE_BUTTON: &'static str = "#save-btn";

    pub const BACK_TO_TOP_BUTTON: &'static str = "#btn-back-to-top";

    pub const FOLLOW_BUTTON: &'static str = ".follow-btn";
    pub const UNFOLLOW_BUTTON: &'static str = ".unfollow-btn";
    pub const HEART_BUTTON: &'static str = ".heart";

    pub fn post_display(post_id: u64) -> String {
        format!("#post-display{}", post_id)
    }

    pub fn post_edit(post_id: u64) -> String {
        format!("#post-edit{}", post_id)
    }

    pub fn edit_area(post_id: u64) -> String {
        format!("#edit-area{}", post_id)
    }
}

/// Attribute names read off the markup (without the `data-` prefix where
/// they are read through `dataset`-style lookups).
pub mod attributes {
    pub const POST_ID: &'static str = "data-post_id";
    pub const CONTENT: &'static str = "data-content";
    pub const ACTION: &'static str = "data-action";
    pub const FOLLOWEE: &'static str = "data-followee_username";
    pub const FOLLOWER: &'static str = "data-follower_username";
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub hidden_class: String,
    pub visible_class: String,
    pub max_rows: u32,
    pub csrf_header: String,
    pub csrf_field_selector: String,
    pub back_to_top_threshold: i32,
    pub fallback_line_height: f64,
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            hidden_class: "hidden".into(),
            visible_class: "visible".into(),
            max_rows: 7,
            csrf_header: "X-CSRF-Token".into(),
            csrf_field_selector: "[name=csrfmiddlewaretoken]".into(),
            back_to_top_threshold: 20,
            fallback_line_height: 20.0,
            log_level: "info".into(),
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, FrontendError> {
        let config: PageConfig = serde_json::from_str(json)
            .map_err(|err| FrontendError::Config(err.to_string()))?;

        if config.max_rows == 0 {
            return Err(FrontendError::Config("max_rows must be at least 1".into()));
        }

        Ok(config)
    }

    /// Config from the page's `<script id="network-config">` text, if any.
    /// Absent or blank text means the defaults.
    pub fn resolve(text: Option<&str>) -> Result<Self, FrontendError> {
        match text {
            Some(text) if !text.trim().is_empty() => PageConfig::from_json(text),
            _ => Ok(PageConfig::default()),
        }
    }

    pub fn load(document: &Document) -> Result<Self, FrontendError> {
        let text = match document.query_selector(selectors::CONFIG_SCRIPT) {
            Ok(Some(script)) => script.text_content(),
            _ => None,
        };

        PageConfig::resolve(text.as_deref())
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
