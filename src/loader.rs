//! Content loading: strategy dispatch and the completion protocol.

use crate::options::LoadOptions;
use crate::source::ContentSource;
use crate::surface::{RenderSurface, SourceDocument};

/// Load `source` into `surface`, replacing whatever it held.
///
/// The returned future resolves when the surface signals completion for the
/// payload's strategy. Callers must not start a second load on the same
/// surface while one is pending.
pub async fn load<S: RenderSurface>(
    surface: &mut S,
    source: &ContentSource<S::Node, S::Document>,
    options: LoadOptions,
) {
    log::debug!("load: strategy={}", source.strategy());
    match source {
        ContentSource::Markup(markup) => {
            let prepared = prepare_markup(markup, options);
            surface.insert_markup(&prepared).await;
        }
        ContentSource::Resource(resource) => {
            surface.navigate_to(resource).await;
        }
        ContentSource::Nodes(nodes) => {
            surface.replace_body_nodes(nodes);
        }
        ContentSource::Document(doc) => {
            surface.replace_document_root(doc);
            if let Some(base) = doc.base_href() {
                surface.set_base_href(base);
            }
            // Some engines need a tick to settle a replaced tree.
            tokio::task::yield_now().await;
        }
    }
}

/// Apply the inline-markup normalizations selected by `options`.
pub fn prepare_markup(markup: &str, options: LoadOptions) -> String {
    let mut out = if options.collapse_whitespace {
        collapse_whitespace(markup)
    } else {
        markup.to_string()
    };
    if options.strip_doctype {
        strip_first_doctype(&mut out);
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn strip_first_doctype(markup: &mut String) {
    const NEEDLE: &[u8] = b"<!doctype";
    let Some(start) = markup
        .as_bytes()
        .windows(NEEDLE.len())
        .position(|window| window.eq_ignore_ascii_case(NEEDLE))
    else {
        return;
    };
    let Some(len) = markup[start..].find('>') else {
        return;
    };
    markup.replace_range(start..start + len + 1, "");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeDocument, ScriptedSurface};

    type Source = ContentSource<String, FakeDocument>;

    #[test]
    fn whitespace_runs_collapse_to_single_spaces() {
        let prepared = prepare_markup("<p>one\n\n   two</p>\t<p>three</p>", LoadOptions::default());
        assert_eq!(prepared, "<p>one two</p> <p>three</p>");
    }

    #[test]
    fn collapse_can_be_disabled() {
        let opts = LoadOptions {
            collapse_whitespace: false,
            ..LoadOptions::default()
        };
        assert_eq!(prepare_markup("a\n\nb", opts), "a\n\nb");
    }

    #[test]
    fn doctype_is_stripped_only_when_requested() {
        let markup = "<!DOCTYPE html PUBLIC \"x\"><html><body/></html>";
        assert_eq!(prepare_markup(markup, LoadOptions::default()), markup);
        assert_eq!(
            prepare_markup(markup, LoadOptions::without_doctype()),
            "<html><body/></html>"
        );
        assert_eq!(
            prepare_markup("<p>no doctype</p>", LoadOptions::without_doctype()),
            "<p>no doctype</p>"
        );
    }

    #[tokio::test]
    async fn markup_strategy_inserts_normalized_markup() {
        let mut surface = ScriptedSurface::new(320, 480, 320);
        surface.body_nodes = vec!["stale".to_string()];
        let source = Source::Markup("<p>a \n b</p>".to_string());
        load(&mut surface, &source, LoadOptions::default()).await;
        assert_eq!(surface.markup.as_deref(), Some("<p>a b</p>"));
        assert!(surface.body_nodes.is_empty());
    }

    #[tokio::test]
    async fn resource_strategy_navigates() {
        let mut surface = ScriptedSurface::new(320, 480, 320);
        let source = Source::Resource("text/ch1.xhtml".to_string());
        load(&mut surface, &source, LoadOptions::default()).await;
        assert_eq!(surface.navigated.as_deref(), Some("text/ch1.xhtml"));
    }

    #[tokio::test]
    async fn node_strategy_replaces_body_in_order() {
        let mut surface = ScriptedSurface::new(320, 480, 320);
        surface.markup = Some("<p>old</p>".to_string());
        let source = Source::Nodes(vec!["h1".to_string(), "p".to_string()]);
        load(&mut surface, &source, LoadOptions::default()).await;
        assert_eq!(surface.body_nodes, vec!["h1".to_string(), "p".to_string()]);
        assert_eq!(surface.markup, None);
    }

    #[tokio::test]
    async fn document_strategy_carries_base_reference() {
        let mut surface = ScriptedSurface::new(320, 480, 320);
        let doc = FakeDocument {
            root: "<html/>".to_string(),
            base: Some("https://example.org/book/".to_string()),
        };
        load(&mut surface, &Source::Document(doc.clone()), LoadOptions::default()).await;
        assert_eq!(surface.document, Some(doc));
        assert_eq!(
            surface.base_href.as_deref(),
            Some("https://example.org/book/")
        );
    }

    #[tokio::test]
    async fn document_without_base_leaves_base_untouched() {
        let mut surface = ScriptedSurface::new(320, 480, 320);
        let doc = FakeDocument {
            root: "<html/>".to_string(),
            base: None,
        };
        load(&mut surface, &Source::Document(doc), LoadOptions::default()).await;
        assert_eq!(surface.base_href, None);
    }
}
