// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Artifact post-processing applied before an artifact becomes visible.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Declarations forced onto the root `<svg>` so it composites against the host theme.
const ROOT_STYLE: [(&str, &str); 6] = [
    ("display", "block"),
    ("margin", "0"),
    ("padding", "0"),
    ("width", "100%"),
    ("height", "auto"),
    ("background", "transparent"),
];

fn svg_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<svg\b[^>]*>").expect("svg regex"))
}

fn rect_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<rect\b[^>]*>").expect("rect regex"))
}

/// Attributes rewritten on start tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attr {
    Style,
    Class,
    Fill,
    Stroke,
}

impl Attr {
    fn name(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Class => "class",
            Self::Fill => "fill",
            Self::Stroke => "stroke",
        }
    }

    fn re(self) -> &'static Regex {
        static RES: [OnceLock<Regex>; 4] =
            [OnceLock::new(), OnceLock::new(), OnceLock::new(), OnceLock::new()];
        RES[self as usize].get_or_init(|| {
            Regex::new(&format!(r#"\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#, self.name()))
                .expect("attribute regex")
        })
    }
}

/// Neutralizes any explicit background on the artifact's root element.
///
/// Markup without an `<svg>` root is returned unchanged.
pub fn neutralize_background(markup: &str) -> String {
    let located = match parse(markup) {
        Ok(doc) => locate_in_document(&doc, markup),
        Err(err) => {
            tracing::debug!(error = %err, "artifact is not well-formed XML; scanning start tags");
            locate_by_scan(markup)
        }
    };
    let Some((root, rect)) = located else {
        return markup.to_owned();
    };

    let mut out = String::with_capacity(markup.len() + 160);
    out.push_str(&markup[..root.start]);
    out.push_str(&restyle_root(&markup[root.clone()]));
    match rect {
        Some(rect) => {
            let transparent = set_attr(&markup[rect.clone()], Attr::Fill, "transparent");
            out.push_str(&markup[root.end..rect.start]);
            out.push_str(&set_attr(&transparent, Attr::Stroke, "transparent"));
            out.push_str(&markup[rect.end..]);
        }
        None => out.push_str(&markup[root.end..]),
    }
    out
}

fn parse(markup: &str) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
    let options =
        roxmltree::ParsingOptions { allow_dtd: true, ..roxmltree::ParsingOptions::default() };
    roxmltree::Document::parse_with_options(markup, options)
}

/// Byte ranges of the root `<svg>` start tag and of the background rect's start tag.
type Located = (Range<usize>, Option<Range<usize>>);

/// `rect.background`, then any rect whose class mentions `background`, then the first rect
/// whose parent is an `<svg>` element.
fn locate_in_document(doc: &roxmltree::Document<'_>, markup: &str) -> Option<Located> {
    let root = doc.root_element();
    if !root.has_tag_name("svg") {
        return None;
    }
    let root_tag = start_tag_at(svg_open_re(), markup, root.range().start)?;

    let rects = || root.descendants().filter(|node| node.has_tag_name("rect"));
    let by_class = |pred: &dyn Fn(&str) -> bool| {
        rects().find(|rect| rect.attribute("class").is_some_and(|class| pred(class)))
    };
    let rect = by_class(&|class| class.split_whitespace().any(|c| c == "background"))
        .or_else(|| by_class(&|class| class.contains("background")))
        .or_else(|| {
            rects().find(|rect| rect.parent_element().is_some_and(|p| p.has_tag_name("svg")))
        })
        .and_then(|rect| start_tag_at(rect_re(), markup, rect.range().start));

    Some((root_tag, rect))
}

/// Start-tag scan for markup the XML parser rejects. Without a tree, "child of an svg" narrows to
/// a rect that directly follows the root's start tag.
fn locate_by_scan(markup: &str) -> Option<Located> {
    let root = svg_open_re().find(markup)?;
    let rest = &markup[root.end()..];
    let rects = || rect_re().find_iter(rest);

    let by_class = |pred: &dyn Fn(&str) -> bool| {
        rects().find(|rect| {
            attr_value(rect.as_str(), Attr::Class).is_some_and(|class| pred(class))
        })
    };
    let rect = by_class(&|class| class.split_whitespace().any(|c| c == "background"))
        .or_else(|| by_class(&|class| class.contains("background")))
        .or_else(|| {
            let first_child = rest.len() - rest.trim_start().len();
            rects().next().filter(|rect| rect.start() == first_child)
        })
        .map(|rect| root.end() + rect.start()..root.end() + rect.end());

    Some((root.range(), rect))
}

fn start_tag_at(re: &Regex, markup: &str, start: usize) -> Option<Range<usize>> {
    re.find_at(markup, start).filter(|tag| tag.start() == start).map(|tag| tag.range())
}

fn restyle_root(tag: &str) -> String {
    let existing = attr_value(tag, Attr::Style).unwrap_or_default();
    let mut declarations = existing
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let key = decl.split(':').next().unwrap_or_default().trim();
            !ROOT_STYLE.iter().any(|(forced, _)| key.eq_ignore_ascii_case(forced))
        })
        .map(str::to_owned)
        .collect::<Vec<_>>();
    declarations.extend(ROOT_STYLE.iter().map(|(key, value)| format!("{key}:{value}")));
    set_attr(tag, Attr::Style, &declarations.join(";"))
}

fn attr_value(tag: &str, attr: Attr) -> Option<&str> {
    let caps = attr.re().captures(tag)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Sets `name="value"` on a start tag, replacing an existing attribute of the same name.
fn set_attr(tag: &str, attr: Attr, value: &str) -> String {
    let replacement = format!(r#" {}="{value}""#, attr.name());
    let re = attr.re();
    if re.is_match(tag) {
        return re.replace(tag, regex::NoExpand(&replacement)).into_owned();
    }

    let close = if tag.ends_with("/>") { tag.len() - 2 } else { tag.len() - 1 };
    format!("{}{replacement}{}", tag[..close].trim_end(), &tag[close..])
}
