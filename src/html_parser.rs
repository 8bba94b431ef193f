use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::io;

/// A parsed page that can be edited in place and written back out.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self { dom }
    }

    /// Every element with the given tag name, in document order.
    pub fn elements_named(&self, tag: &str) -> Vec<Element> {
        self.elements_where(|element| element.name() == tag)
    }

    /// Every element carrying `attr`, in document order.
    pub fn elements_with_attr(&self, attr: &str) -> Vec<Element> {
        self.elements_where(|element| element.attr(attr).is_some())
    }

    fn elements_where(&self, predicate: impl Fn(&Element) -> bool) -> Vec<Element> {
        let mut found = Vec::new();
        let mut stack = vec![self.dom.document.clone()];

        // Depth first, children pushed in reverse so they pop in order
        while let Some(node) = stack.pop() {
            if matches!(node.data, NodeData::Element { .. }) {
                let element = Element(node.clone());
                if predicate(&element) {
                    found.push(element);
                }
            }
            for child in node.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
        }

        found
    }

    pub fn serialize(&self) -> io::Result<String> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };

        let mut out = Vec::new();
        serialize(&mut out, &document, opts)?;
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// A handle to one element of an [`HtmlDocument`].
#[derive(Clone)]
pub struct Element(Handle);

impl Element {
    pub fn name(&self) -> &str {
        match &self.0.data {
            NodeData::Element { name, .. } => &*name.local,
            _ => "",
        }
    }

    pub fn attr(&self, attr: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == attr)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    /// Replaces the value of an existing attribute. Missing attributes are
    /// left missing.
    pub fn set_attr(&self, attr: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &self.0.data {
            if let Some(existing) = attrs.borrow_mut().iter_mut().find(|a| &*a.name.local == attr) {
                existing.value = StrTendril::from_slice(value);
            }
        }
    }

    /// Whether a space separated attribute such as `rel` holds `token`.
    pub fn has_token(&self, attr: &str, token: &str) -> bool {
        self.attr(attr)
            .is_some_and(|value| value.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in self.0.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                text.push_str(&contents.borrow());
            }
        }
        text
    }

    /// Puts `text` into the first text child and empties the rest.
    pub fn set_text(&self, text: &str) {
        let children = self.0.children.borrow();
        let mut remaining = Some(text);
        for child in children.iter() {
            if let NodeData::Text { contents } = &child.data {
                *contents.borrow_mut() = StrTendril::from_slice(remaining.take().unwrap_or(""));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_elements_in_document_order() {
        let doc = HtmlDocument::parse(
            r#"<html><body><img src="a.png"><div><img src="b.png"></div><img src="c.png"></body></html>"#,
        );

        let srcs: Vec<String> = doc
            .elements_named("img")
            .iter()
            .filter_map(|img| img.attr("src"))
            .collect();

        assert_eq!(srcs, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_set_attr_and_serialize() {
        let doc = HtmlDocument::parse(r#"<html><body><img src="logo.png" alt="Logo"></body></html>"#);

        for img in doc.elements_named("img") {
            img.set_attr("src", "/assets/logo.png");
        }

        let html = doc.serialize().unwrap();
        assert!(html.contains(r#"<img src="/assets/logo.png" alt="Logo">"#), "{}", html);
    }

    #[test]
    fn test_set_attr_does_not_add_missing_attribute() {
        let doc = HtmlDocument::parse("<html><body><script>var x;</script></body></html>");
        let script = &doc.elements_named("script")[0];

        script.set_attr("src", "/assets/app.js");

        assert_eq!(script.attr("src"), None);
    }

    #[test]
    fn test_elements_with_attr() {
        let doc = HtmlDocument::parse(
            r#"<html><body><div style="color: red">x</div><p>y</p><span style="">z</span></body></html>"#,
        );

        let names: Vec<String> = doc
            .elements_with_attr("style")
            .iter()
            .map(|e| e.name().to_string())
            .collect();

        assert_eq!(names, vec!["div", "span"]);
    }

    #[test]
    fn test_rel_tokens() {
        let doc = HtmlDocument::parse(
            r#"<html><head><link rel="alternate Stylesheet" href="a.css"><link rel="icon" href="f.ico"></head></html>"#,
        );
        let links = doc.elements_named("link");

        assert!(links[0].has_token("rel", "stylesheet"));
        assert!(!links[1].has_token("rel", "stylesheet"));
        assert!(!links[1].has_token("type", "stylesheet"));
    }

    #[test]
    fn test_style_text_round_trip() {
        let doc = HtmlDocument::parse(
            "<html><head><style>body { background: url(bg.png); }</style></head><body></body></html>",
        );
        let style = &doc.elements_named("style")[0];
        assert_eq!(style.text(), "body { background: url(bg.png); }");

        style.set_text("body { background: url('/assets/bg.png'); }");

        let html = doc.serialize().unwrap();
        assert!(html.contains("<style>body { background: url('/assets/bg.png'); }</style>"), "{}", html);
    }

    #[test]
    fn test_serialize_keeps_doctype() {
        let doc = HtmlDocument::parse("<!DOCTYPE html><html><head></head><body><p>hi</p></body></html>");
        let html = doc.serialize().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"), "{}", html);
        assert!(html.contains("<p>hi</p>"));
    }
}
