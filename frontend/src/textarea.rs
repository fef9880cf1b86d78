use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlTextAreaElement};

use crate::error::FrontendError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    Hidden,
    Scroll,
}

impl Overflow {
    pub fn as_css(&self) -> &'static str {
        match self {
            Overflow::Hidden => "hidden",
            Overflow::Scroll => "scroll",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sizing {
    pub rows: u32,
    pub overflow: Overflow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowPolicy {
    pub max_rows: u32,
}

impl RowPolicy {
    pub fn new(max_rows: u32) -> Self {
        RowPolicy {
            max_rows: max_rows.max(1),
        }
    }

    /// Rows are capped at `max_rows`; past the cap the area scrolls.
    pub fn sizing(&self, wanted_rows: u32) -> Sizing {
        if wanted_rows > self.max_rows {
            Sizing {
                rows: self.max_rows,
                overflow: Overflow::Scroll,
            }
        } else {
            Sizing {
                rows: wanted_rows.max(1),
                overflow: Overflow::Hidden,
            }
        }
    }

    /// Sizing when the editor opens: one spare row below the text.
    pub fn for_text(&self, text: &str) -> Sizing {
        self.sizing(line_count(text).saturating_add(1))
    }

    /// Sizing after input, from the natural height at `rows = 1`.
    pub fn for_height(&self, scroll_height: i32, line_height: f64) -> Sizing {
        self.sizing(rows_for_height(scroll_height, line_height))
    }
}

/// Lines split on `\r\n`, `\r` or `\n`; empty text is one line.
pub fn line_count(text: &str) -> u32 {
    let breaks = text.replace("\r\n", "\n").matches(|c: char| c == '\n' || c == '\r').count();
    (breaks as u32).saturating_add(1)
}

pub fn rows_for_height(scroll_height: i32, line_height: f64) -> u32 {
    if !line_height.is_finite() || line_height <= 0.0 || scroll_height <= 0 {
        return 1;
    }

    (scroll_height as f64 / line_height).ceil() as u32
}

/// Parses a CSS pixel length such as `"18.5px"`.
pub fn parse_px(value: &str) -> Option<f64> {
    let number = value.trim().strip_suffix("px")?.trim();
    number.parse::<f64>().ok().filter(|px| px.is_finite() && *px > 0.0)
}

pub fn apply(textarea: &HtmlTextAreaElement, sizing: Sizing) -> Result<(), FrontendError> {
    textarea.set_rows(sizing.rows);
    textarea
        .style()
        .set_property("overflow-y", sizing.overflow.as_css())?;
    Ok(())
}

/// Line height of the textarea in px, from its computed style.
pub fn line_height(textarea: &HtmlTextAreaElement, fallback: f64) -> f64 {
    let style = web_sys::window().and_then(|window| window.get_computed_style(textarea).ok().flatten());

    let style = match style {
        Some(style) => style,
        None => return fallback,
    };

    if let Some(px) = style
        .get_property_value("line-height")
        .ok()
        .as_deref()
        .and_then(parse_px)
    {
        return px;
    }

    style
        .get_property_value("font-size")
        .ok()
        .as_deref()
        .and_then(parse_px)
        .map(|font_size| font_size * 1.2)
        .unwrap_or(fallback)
}

/// Textarea that grows with its content, up to the policy's row cap.
pub struct AutoGrow {
    textarea: HtmlTextAreaElement,
}

impl AutoGrow {
    /// Attaches the input listener. Call once per textarea.
    pub fn attach(textarea: HtmlTextAreaElement, policy: RowPolicy, fallback_line_height: f64) -> Self {
        let target = textarea.clone();

        let on_input = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            target.set_rows(1);
            let sizing = policy.for_height(target.scroll_height(), line_height(&target, fallback_line_height));
            if let Err(err) = apply(&target, sizing) {
                log::error!("could not resize textarea: {}", err);
            }
        });

        if let Err(err) =
            textarea.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())
        {
            log::error!("could not listen for textarea input: {:?}", err);
        }
        on_input.forget();

        AutoGrow { textarea }
    }

    pub fn resize(&self, sizing: Sizing) -> Result<(), FrontendError> {
        apply(&self.textarea, sizing)
    }

    pub fn value(&self) -> String {
        self.textarea.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("one"), 1);
        assert_eq!(line_count("one\ntwo"), 2);
        assert_eq!(line_count("one\r\ntwo\rthree"), 3);
        assert_eq!(line_count("trailing\n"), 2);
    }

    #[test]
    fn open_adds_spare_row() {
        let policy = RowPolicy::new(7);
        assert_eq!(
            policy.for_text("a\nb"),
            Sizing {
                rows: 3,
                overflow: Overflow::Hidden
            }
        );
    }

    #[test]
    fn cap_boundary() {
        let policy = RowPolicy::new(7);

        // six lines + 1 = 7, still fits
        let six = "1\n2\n3\n4\n5\n6";
        assert_eq!(policy.for_text(six).rows, 7);
        assert_eq!(policy.for_text(six).overflow, Overflow::Hidden);

        let seven = "1\n2\n3\n4\n5\n6\n7";
        assert_eq!(policy.for_text(seven).rows, 7);
        assert_eq!(policy.for_text(seven).overflow, Overflow::Scroll);
    }

    #[test]
    fn rows_never_exceed_cap() {
        let policy = RowPolicy::new(7);
        for lines in 0..40 {
            let text = vec!["x"; lines].join("\n");
            let sizing = policy.for_text(&text);
            assert!(sizing.rows <= 7);
            assert_eq!(sizing.overflow == Overflow::Scroll, line_count(&text) + 1 > 7);
        }
    }

    #[test]
    fn height_rounds_up() {
        let policy = RowPolicy::new(7);
        assert_eq!(policy.for_height(41, 20.0).rows, 3);
        assert_eq!(policy.for_height(40, 20.0).rows, 2);
        assert_eq!(policy.for_height(400, 20.0).overflow, Overflow::Scroll);
        assert_eq!(policy.for_height(400, 20.0).rows, 7);
    }

    #[test]
    fn degenerate_line_height() {
        assert_eq!(rows_for_height(100, 0.0), 1);
        assert_eq!(rows_for_height(100, f64::NAN), 1);
        assert_eq!(rows_for_height(0, 20.0), 1);
    }

    #[test]
    fn parses_pixels() {
        assert_eq!(parse_px("20px"), Some(20.0));
        assert_eq!(parse_px(" 18.5px "), Some(18.5));
        assert_eq!(parse_px("normal"), None);
        assert_eq!(parse_px("1.5em"), None);
        assert_eq!(parse_px("0px"), None);
    }

    #[test]
    fn zero_cap_is_one_row() {
        assert_eq!(RowPolicy::new(0).max_rows, 1);
    }
}
