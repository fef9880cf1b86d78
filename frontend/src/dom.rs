use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, HtmlTextAreaElement, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::board::Board;
use crate::config::{attributes, selectors, PageConfig};
use crate::dispatcher::{Dispatcher, Transport};
use crate::error::FrontendError;
use crate::http::{LocationReload, XhrTransport};
use crate::posts::{PostId, PostRepository, ViewState};
use crate::request::FollowRelation;
use crate::textarea::{AutoGrow, RowPolicy};
use crate::visibility::Toggler;

pub type SharedBoard<T> = Rc<RefCell<Board<T>>>;

pub fn query(root: &Document, selector: &str) -> Option<Element> {
    match root.query_selector(selector) {
        Ok(found) => found,
        Err(err) => {
            log::error!("bad selector {}: {:?}", selector, err);
            None
        }
    }
}

pub fn require(root: &Document, selector: &str) -> Result<Element, FrontendError> {
    query(root, selector).ok_or_else(|| FrontendError::MissingElement(selector.to_owned()))
}

/// Every match under `root`. Duplicate ids are matched too.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    collect_elements(root.query_selector_all(selector), selector)
}

pub fn query_all_in(document: &Document, selector: &str) -> Vec<Element> {
    collect_elements(document.query_selector_all(selector), selector)
}

fn collect_elements(list: Result<web_sys::NodeList, JsValue>, selector: &str) -> Vec<Element> {
    let list = match list {
        Ok(list) => list,
        Err(err) => {
            log::error!("bad selector {}: {:?}", selector, err);
            return Vec::new();
        }
    };

    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn attribute(element: &Element, name: &'static str) -> Result<String, FrontendError> {
    element
        .get_attribute(name)
        .ok_or(FrontendError::MissingAttribute(name))
}

pub fn post_id_of(element: &Element) -> Result<PostId, FrontendError> {
    attribute(element, attributes::POST_ID)?.parse()
}

/// A heart sits in a `div` whose parent is the post container.
pub fn heart_post_id(button: &Element) -> Result<PostId, FrontendError> {
    let container = button
        .closest("div")?
        .and_then(|div| div.parent_element())
        .ok_or_else(|| FrontendError::MissingElement("post container".into()))?;
    post_id_of(&container)
}

pub fn csrf_token(document: &Document, selector: &str) -> Option<String> {
    query(document, selector)
        .and_then(|field| field.dyn_into::<HtmlInputElement>().ok())
        .map(|field| field.value())
}

pub fn on_click<F>(element: &Element, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let handler = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(err) =
        element.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
    {
        log::error!("could not listen for clicks: {:?}", err);
    }
    handler.forget();
}

fn report(context: &str, result: Result<(), FrontendError>) {
    if let Err(err) = result {
        log::error!("{}: {}", context, err);
    }
}

/// List open, create-post form closed.
pub fn initial_view(document: &Document, toggler: &Toggler) {
    if let Some(all_posts) = query(document, selectors::ALL_POSTS_SECTION) {
        if let Some(button) = query(document, selectors::ALL_POSTS_BUTTON) {
            toggler.hide(&button);
        }
        toggler.show(&all_posts);
    }

    if let Some(form) = query(document, selectors::CREATE_POST_SECTION) {
        toggler.hide(&form);
        if let Some(button) = query(document, selectors::CREATE_POST_BUTTON) {
            toggler.show(&button);
        }
    }
}

/// Wires `open` to reveal `panel` and `close` to hide it again.
fn wire_panel(toggler: &Toggler, open: &Element, close: Option<Element>, panel: &Element) {
    let (t, button, target) = (toggler.clone(), open.clone(), panel.clone());
    on_click(open, move |_event| t.swap(&button, &target));

    if let Some(close) = close {
        let (t, button, target) = (toggler.clone(), open.clone(), panel.clone());
        on_click(&close, move |_event| t.swap(&target, &button));
    }
}

pub fn wire_panels(window: &Window, document: &Document, toggler: &Toggler) {
    if let (Some(open), Some(form)) = (
        query(document, selectors::CREATE_POST_BUTTON),
        query(document, selectors::CREATE_POST_SECTION),
    ) {
        wire_panel(toggler, &open, query(document, selectors::HIDE_CREATE_POST_BUTTON), &form);

        if let Some(secondary) = query(document, selectors::CREATE_POST_BUTTON_SECONDARY) {
            let (t, window) = (toggler.clone(), window.clone());
            on_click(&secondary, move |event| {
                event.prevent_default();
                t.swap(&open, &form);

                let options = ScrollToOptions::new();
                options.set_top(0.0);
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            });
        }
    }

    if let (Some(open), Some(list)) = (
        query(document, selectors::ALL_POSTS_BUTTON),
        query(document, selectors::ALL_POSTS_SECTION),
    ) {
        wire_panel(toggler, &open, query(document, selectors::HIDE_ALL_POSTS_BUTTON), &list);
    }
}

pub fn back_to_top_display(body_top: i32, document_top: i32, threshold: i32) -> &'static str {
    if body_top > threshold || document_top > threshold {
        "block"
    } else {
        "none"
    }
}

pub fn wire_back_to_top(window: &Window, document: &Document, threshold: i32) {
    let button = match query(document, selectors::BACK_TO_TOP_BUTTON)
        .and_then(|button| button.dyn_into::<HtmlElement>().ok())
    {
        Some(button) => button,
        None => return,
    };

    let (doc, shown) = (document.clone(), button.clone());
    let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let body_top = doc.body().map(|body| body.scroll_top()).unwrap_or(0);
        let document_top = doc.document_element().map(|el| el.scroll_top()).unwrap_or(0);
        let display = back_to_top_display(body_top, document_top, threshold);
        if let Err(err) = shown.style().set_property("display", display) {
            log::error!("could not toggle back-to-top: {:?}", err);
        }
    });
    if let Err(err) =
        window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
    {
        log::error!("could not listen for scroll: {:?}", err);
    }
    on_scroll.forget();

    let doc = document.clone();
    on_click(&button, move |_event| {
        if let Some(body) = doc.body() {
            body.set_scroll_top(0);
        }
        if let Some(root) = doc.document_element() {
            root.set_scroll_top(0);
        }
    });
}

/// Posts the current user may edit, read off their edit controls.
pub fn collect_posts(document: &Document) -> PostRepository {
    let mut posts = PostRepository::new();

    for button in query_all_in(document, selectors::EDIT_POST_BUTTON) {
        match post_id_of(&button) {
            Ok(id) => {
                let content = button.get_attribute(attributes::CONTENT).unwrap_or_default();
                posts.insert(id, content);
            }
            Err(err) => log::warn!("skipping edit control: {}", err),
        }
    }

    posts
}

struct PostViews {
    display: Element,
    edit: Element,
    area: AutoGrow,
}

impl PostViews {
    fn find(document: &Document, id: PostId, config: &PageConfig) -> Result<Self, FrontendError> {
        let display = require(document, &selectors::post_display(id.0))?;
        let edit = require(document, &selectors::post_edit(id.0))?;
        let area = require(document, &selectors::edit_area(id.0))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_el| FrontendError::MissingElement(selectors::edit_area(id.0)))?;

        Ok(PostViews {
            display,
            edit,
            area: AutoGrow::attach(area, RowPolicy::new(config.max_rows), config.fallback_line_height),
        })
    }

    fn render(&self, toggler: &Toggler, view: Option<&ViewState>) {
        match view {
            Some(ViewState::Editing(_)) => toggler.swap(&self.display, &self.edit),
            _ => toggler.swap(&self.edit, &self.display),
        }
    }
}

/// Edit, Back and Save for every editable post. Back and Save are looked
/// up inside the post's own edit view and registered once.
pub fn wire_editing<T: Transport + 'static>(
    document: &Document,
    board: &SharedBoard<T>,
    toggler: &Toggler,
    config: &PageConfig,
) {
    for button in query_all_in(document, selectors::EDIT_POST_BUTTON) {
        let id = match post_id_of(&button) {
            Ok(id) => id,
            Err(_) => continue,
        };

        let views = match PostViews::find(document, id, config) {
            Ok(views) => Rc::new(views),
            Err(err) => {
                log::warn!("post {} cannot be edited: {}", id, err);
                continue;
            }
        };

        let (b, t, v, edit_button) = (board.clone(), toggler.clone(), views.clone(), button.clone());
        on_click(&button, move |_event| {
            let old_content = edit_button.get_attribute(attributes::CONTENT).unwrap_or_default();
            let opened = b.borrow_mut().edit(id, old_content, &v.area.value());
            report(
                "edit",
                opened.and_then(|sizing| {
                    v.render(&t, b.borrow().view(id));
                    v.area.resize(sizing)
                }),
            );
        });

        for back in query_all(&views.edit, selectors::BACK_BUTTON) {
            let (b, t, v) = (board.clone(), toggler.clone(), views.clone());
            on_click(&back, move |_event| {
                report("back", b.borrow_mut().back(id));
                v.render(&t, b.borrow().view(id));
            });
        }

        for save in query_all(&views.edit, selectors::SAVE_BUTTON) {
            let (b, t, v) = (board.clone(), toggler.clone(), views.clone());
            on_click(&save, move |_event| {
                let saved = b.borrow_mut().save(id, &v.area.value()).map(|_outcome| ());
                report("save", saved);
                v.render(&t, b.borrow().view(id));
            });
        }
    }
}

pub fn wire_deleting<T: Transport + 'static>(document: &Document, board: &SharedBoard<T>) {
    for button in query_all_in(document, selectors::DELETE_POST_BUTTON) {
        let (b, delete_button) = (board.clone(), button.clone());
        on_click(&button, move |_event| {
            report(
                "delete",
                post_id_of(&delete_button).and_then(|id| b.borrow().delete(id)),
            );
        });
    }
}

pub fn wire_reactions<T: Transport + 'static>(document: &Document, board: &SharedBoard<T>) {
    for button in query_all_in(document, selectors::HEART_BUTTON) {
        let (b, heart) = (board.clone(), button.clone());
        on_click(&button, move |_event| {
            let reacted = heart_post_id(&heart).and_then(|id| {
                let action = attribute(&heart, attributes::ACTION)?;
                b.borrow().react(&action, id)
            });
            report("react", reacted);
        });
    }
}

pub fn follow_relation(button: &Element) -> Result<FollowRelation, FrontendError> {
    Ok(FollowRelation {
        follower: button.get_attribute(attributes::FOLLOWER),
        followee: attribute(button, attributes::FOLLOWEE)?,
    })
}

pub fn wire_following<T: Transport + 'static>(document: &Document, board: &SharedBoard<T>) {
    if let Some(button) = query(document, selectors::FOLLOW_BUTTON) {
        let (b, follow) = (board.clone(), button.clone());
        on_click(&button, move |_event| {
            report(
                "follow",
                follow_relation(&follow).and_then(|relation| b.borrow().follow(relation)),
            );
        });
    }

    if let Some(button) = query(document, selectors::UNFOLLOW_BUTTON) {
        let (b, unfollow) = (board.clone(), button.clone());
        on_click(&button, move |_event| {
            report(
                "unfollow",
                follow_relation(&unfollow).and_then(|relation| b.borrow().unfollow(relation)),
            );
        });
    }
}

/// Wires every control on the page to `board`.
pub fn wire_board<T: Transport + 'static>(
    document: &Document,
    board: &SharedBoard<T>,
    toggler: &Toggler,
    config: &PageConfig,
) {
    wire_editing(document, board, toggler, config);
    wire_deleting(document, board);
    wire_reactions(document, board);
    wire_following(document, board);
}

pub fn wire_page(window: &Window, document: &Document, config: &PageConfig) -> SharedBoard<XhrTransport> {
    let toggler = Toggler::new(config);

    initial_view(document, &toggler);
    wire_panels(window, document, &toggler);
    wire_back_to_top(window, document, config.back_to_top_threshold);

    let token = csrf_token(document, &config.csrf_field_selector);
    if token.is_none() {
        log::debug!("no csrf token on page, edit and delete are disabled");
    }

    let dispatcher = Dispatcher::new(
        XhrTransport,
        Rc::new(LocationReload),
        config.csrf_header.clone(),
        token,
    );
    let posts = collect_posts(document);
    log::debug!("{} editable posts on page", posts.len());

    let board = Rc::new(RefCell::new(Board::new(
        posts,
        dispatcher,
        RowPolicy::new(config.max_rows),
    )));
    wire_board(document, &board, &toggler, config);

    board
}
