//! SVG group extraction: raw SVG text → envelope + identified groups.
//!
//! Parsing is best-effort and never raises an error. When the XML breaks
//! partway through, the text is cut at the failing tag, the elements still
//! open there are closed, and the groups that were complete before the cut
//! are kept. Input with nothing salvageable yields an empty `Extraction`.

use crate::id::GroupId;
use crate::model::{Extraction, GroupFragment, Markup, SvgEnvelope};
use roxmltree::{Document, Node, ParsingOptions, TextPos};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Upper bound on cut-and-close attempts for one document.
const MAX_REPAIRS: usize = 8;

/// Extract the root `<svg>` envelope and every `<g>` carrying a non-empty
/// `id`, in document order, regardless of nesting depth.
#[must_use]
pub fn extract_groups(source: &str) -> Extraction {
    match read_document(source, source.len()) {
        Ok(extraction) => extraction,
        Err(e) => recover(source, e),
    }
}

fn read_document(text: &str, complete_before: usize) -> Result<Extraction, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;

    let envelope = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")
        .map(|svg| SvgEnvelope {
            view_box: non_empty_attr(svg, "viewBox"),
            width: non_empty_attr(svg, "width"),
            height: non_empty_attr(svg, "height"),
        })
        .unwrap_or_default();

    let groups: Vec<GroupFragment> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "g")
        .filter(|g| g.range().end <= complete_before)
        .filter_map(|g| {
            let id = g.attribute("id").filter(|id| !id.is_empty())?;
            Some(GroupFragment {
                id: GroupId::intern(id),
                inner: Markup::with_namespaces(inner_markup(text, g), prefixed_namespaces(g)),
            })
        })
        .collect();

    log::debug!(
        "extracted {} identified groups (viewBox: {:?})",
        groups.len(),
        envelope.view_box
    );

    Ok(Extraction { envelope, groups })
}

/// Re-read a broken document from its well-formed prefix.
fn recover(source: &str, mut err: roxmltree::Error) -> Extraction {
    let mut limit = source.len() + 1;
    for _ in 0..MAX_REPAIRS {
        let cut = match cut_point(source, &err) {
            Some(cut) if cut < limit => cut,
            // No progress; back off to the previous tag.
            _ => match source[..limit.min(source.len())].rfind('<') {
                Some(cut) if cut < limit => cut,
                _ => break,
            },
        };
        if cut == 0 {
            break;
        }
        limit = cut;

        let mut repaired = source[..cut].to_string();
        for name in open_elements(&source[..cut]).iter().rev() {
            repaired.push_str("</");
            repaired.push_str(name);
            repaired.push('>');
        }
        match read_document(&repaired, cut) {
            Ok(extraction) => {
                log::warn!(
                    "svg parse failed ({err}), recovered {} groups from the first {cut} bytes",
                    extraction.groups.len()
                );
                return extraction;
            }
            Err(next) => err = next,
        }
    }
    log::warn!("svg parse failed, treating document as empty: {err}");
    Extraction::default()
}

/// Byte offset of the tag that the error points into. Running out of input
/// keeps the whole text.
fn cut_point(source: &str, err: &roxmltree::Error) -> Option<usize> {
    let offset = match err {
        roxmltree::Error::UnclosedRootNode | roxmltree::Error::UnexpectedEndOfStream => {
            return Some(source.len());
        }
        roxmltree::Error::NoRootNode
        | roxmltree::Error::DtdDetected
        | roxmltree::Error::NodesLimitReached
        | roxmltree::Error::AttributesLimitReached
        | roxmltree::Error::NamespacesLimitReached => return None,
        _ => byte_offset(source, err.pos()),
    };
    if source[offset..].starts_with('<') {
        Some(offset)
    } else {
        source[..offset].rfind('<')
    }
}

/// Convert a 1-based row/column (columns count chars) into a byte offset.
fn byte_offset(text: &str, pos: TextPos) -> usize {
    let line_start = match pos.row {
        0 | 1 => 0,
        row => match text.match_indices('\n').nth(row as usize - 2) {
            Some((i, _)) => i + 1,
            None => return text.len(),
        },
    };
    let line = &text[line_start..];
    line.char_indices()
        .nth(pos.col.saturating_sub(1) as usize)
        .map_or(text.len(), |(i, _)| line_start + i)
}

/// Names of the elements left open at the end of `text`, outermost first.
fn open_elements(text: &str) -> Vec<&str> {
    let mut stack: Vec<&str> = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        rest = &rest[start..];
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = skip_past(after, "-->");
        } else if let Some(after) = rest.strip_prefix("<![CDATA[") {
            rest = skip_past(after, "]]>");
        } else if let Some(after) = rest.strip_prefix("<?") {
            rest = skip_past(after, "?>");
        } else if let Some(after) = rest.strip_prefix("<!") {
            rest = match (after.find('['), after.find('>')) {
                (Some(open), Some(close)) if open < close => skip_past(after, "]>"),
                _ => skip_past(after, ">"),
            };
        } else {
            let Some(end) = tag_end(rest) else { break };
            let tag = &rest[1..end];
            rest = &rest[end + 1..];
            if let Some(closing) = tag.strip_prefix('/') {
                let name = closing.trim();
                if let Some(i) = stack.iter().rposition(|open| *open == name) {
                    stack.truncate(i);
                }
            } else if !tag.ends_with('/') {
                let name = tag
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or_default();
                if !name.is_empty() {
                    stack.push(name);
                }
            }
        }
    }
    stack
}

fn skip_past<'a>(text: &'a str, marker: &str) -> &'a str {
    text.find(marker).map_or("", |i| &text[i + marker.len()..])
}

/// Index of the `>` closing the tag at the start of `tag`, skipping quoted
/// attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn non_empty_attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Prefixed namespaces in scope at `element`, minus the ones every composed
/// document already declares.
fn prefixed_namespaces(element: Node<'_, '_>) -> Vec<(String, String)> {
    element
        .namespaces()
        .filter_map(|ns| {
            let prefix = ns.name()?;
            let implied = prefix == "xml" || (prefix == "xlink" && ns.uri() == XLINK_NS);
            (!implied).then(|| (prefix.to_string(), ns.uri().to_string()))
        })
        .collect()
}

/// Source text between the element's opening and closing tags.
fn inner_markup<'a>(source: &'a str, element: Node<'_, '_>) -> &'a str {
    match (element.first_child(), element.last_child()) {
        (Some(first), Some(last)) => source
            .get(first.range().start..last.range().end)
            .unwrap_or_default(),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_envelope_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 20" width="10"><g id="a"/></svg>"#;
        let ex = extract_groups(svg);
        assert_eq!(ex.envelope.view_box.as_deref(), Some("0 0 10 20"));
        assert_eq!(ex.envelope.width.as_deref(), Some("10"));
        assert_eq!(ex.envelope.height, None);
    }

    #[test]
    fn empty_attribute_counts_as_absent() {
        let ex = extract_groups(r#"<svg viewBox=""><g id="a"/></svg>"#);
        assert_eq!(ex.envelope.view_box, None);
    }

    #[test]
    fn captures_inner_markup_only() {
        let svg = r#"<svg><g id="card" transform="translate(1 2)"><rect width="5"/><path d="M0 0"/></g></svg>"#;
        let ex = extract_groups(svg);
        assert_eq!(ex.groups.len(), 1);
        assert_eq!(ex.groups[0].id.as_str(), "card");
        assert_eq!(
            ex.groups[0].inner.as_str(),
            r#"<rect width="5"/><path d="M0 0"/>"#
        );
    }

    #[test]
    fn self_closing_group_has_empty_markup() {
        let ex = extract_groups(r#"<svg><g id="empty"/></svg>"#);
        assert!(ex.groups[0].inner.is_empty());
    }

    #[test]
    fn skips_groups_without_identifier() {
        let svg = r#"<svg><g><rect/></g><g id=""><rect/></g><g id="kept"><rect/></g></svg>"#;
        let ids: Vec<_> = extract_groups(svg)
            .groups
            .iter()
            .map(|g| g.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["kept".to_string()]);
    }

    #[test]
    fn nested_groups_follow_document_order() {
        let svg = r#"<svg><g id="outer"><g id="inner"><rect/></g></g><g id="last"/></svg>"#;
        let ids: Vec<_> = extract_groups(svg)
            .groups
            .iter()
            .map(|g| g.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["outer", "inner", "last"]);
    }

    #[test]
    fn preserves_text_and_whitespace() {
        let svg = "<svg><g id=\"label\">\n  <text>Hi &amp; bye</text>\n</g></svg>";
        let ex = extract_groups(svg);
        assert_eq!(ex.groups[0].inner.as_str(), "\n  <text>Hi &amp; bye</text>\n");
    }

    #[test]
    fn malformed_input_is_empty_not_error() {
        let ex = extract_groups("<svg><g id=\"a\"><rect></svg>");
        assert_eq!(ex, Extraction::default());
        assert_eq!(extract_groups(""), Extraction::default());
        assert_eq!(extract_groups("not svg at all"), Extraction::default());
    }

    #[test]
    fn late_error_keeps_groups_closed_before_it() {
        let ex = extract_groups(r#"<svg viewBox="0 0 9 9"><g id="a"><rect/></g><g id="b"><rect></svg>"#);
        assert_eq!(ex.envelope.view_box.as_deref(), Some("0 0 9 9"));
        let ids: Vec<&str> = ex.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(ex.groups[0].inner.as_str(), "<rect/>");
    }

    #[test]
    fn error_on_a_later_line_is_located() {
        let svg = "<svg width=\"4\">\n  <!-- <g id=\"hidden\"> -->\n  <g id=\"a\"><text>é &amp; ü</text></g>\n  <g id=\"b\"><rect x=\"1 /></g>\n</svg>";
        let ex = extract_groups(svg);
        assert_eq!(ex.envelope.width.as_deref(), Some("4"));
        let ids: Vec<&str> = ex.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(ex.groups[0].inner.as_str(), "<text>é &amp; ü</text>");
    }

    #[test]
    fn truncated_document_keeps_finished_groups() {
        let ex = extract_groups(r#"<svg><g id="a"><circle r="1"/></g><g id="b"><g id="c"/>"#);
        let ids: Vec<&str> = ex.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn open_elements_skip_comments_and_quoted_brackets() {
        let text = r#"<?xml version="1.0"?><svg a="x>y"><!-- <g> --><g id="a"><rect/></g><g><![CDATA[</g>]]>"#;
        assert_eq!(open_elements(text), vec!["svg", "g"]);
    }

    #[test]
    fn in_scope_prefixes_travel_with_markup() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><g id="layer"><g id="a" xmlns:i="urn:ai"><rect inkscape:label="r"/></g></g></svg>"#;
        let ex = extract_groups(svg);
        assert_eq!(
            ex.groups[0].inner.namespaces(),
            &[("inkscape".to_string(), "http://www.inkscape.org/namespaces/inkscape".to_string())]
        );
        let mut inner: Vec<&str> = ex.groups[1].inner.namespaces().iter().map(|(p, _)| p.as_str()).collect();
        inner.sort_unstable();
        assert_eq!(inner, vec!["i", "inkscape"]);
    }

    #[test]
    fn accepts_doctype() {
        let svg = r#"<?xml version="1.0"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg viewBox="0 0 1 1"><g id="a"><circle r="1"/></g></svg>"#;
        let ex = extract_groups(svg);
        assert_eq!(ex.groups.len(), 1);
    }
}
