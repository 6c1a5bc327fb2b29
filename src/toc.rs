//! GitHub-flavored markdown anchors, TOC items and `@see` links.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").unwrap());

static RE_INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"^\{@link(?:code|plain)?\s+([^\s|}]+)(?:\s*\|\s*|\s+)?([^}]*)\}$").unwrap()
    });

static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?|ftp)://\S+").unwrap());

/// Render a `@see` target as a markdown link.
///
/// Existing markdown links pass through, `{@link target label}` becomes
/// `[label](target)`, bare URLs are wrapped in place, and anything else is
/// treated as the name of a heading in the same document.
pub fn see_link(target: &str) -> String {
    let target = target.trim();
    if RE_MARKDOWN_LINK.is_match(target) {
        return target.to_string();
    }
    if let Some(caps) = RE_INLINE_LINK.captures(target) {
        let dest = &caps[1];
        let label = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|label| !label.is_empty())
            .unwrap_or(dest);
        return format!("[{}]({})", label, link_destination(dest));
    }
    if RE_BARE_URL.is_match(target) {
        return RE_BARE_URL.replace_all(target, "[$0]($0)").into_owned();
    }
    format!("[{}]({})", target, link_destination(target))
}

fn link_destination(dest: &str) -> String {
    let external = RE_BARE_URL.is_match(dest)
        || dest.starts_with('/')
        || dest.starts_with("./")
        || dest.starts_with("../");
    if external {
        dest.to_string()
    } else {
        format!("#{}", github_slug(dest))
    }
}

/// Generate a TOC list item, indented two spaces per nesting level.
pub fn render_toc_item(title: &str, slug: &str, depth: usize) -> String {
    format!("{}* [{}](#{})", "  ".repeat(depth), title, slug)
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Hands out unique anchors the way GitHub does for repeated headings:
/// `foo`, `foo-1`, `foo-2`, ...
#[derive(Debug, Default)]
pub struct Slugs {
    seen: HashMap<String, usize>,
}

impl Slugs {
    pub fn assign(&mut self, heading: &str) -> String {
        let base = github_slug(heading);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple() {
        assert_eq!(github_slug("hello world"), "hello-world");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(github_slug("Foo.create"), "foocreate");
        assert_eq!(github_slug("Foo#event:change"), "fooeventchange");
        assert_eq!(github_slug("@default"), "default");
    }

    #[test]
    fn slug_uppercase() {
        assert_eq!(github_slug("Hello World"), "hello-world");
    }

    #[test]
    fn repeated_headings_get_suffixes() {
        let mut slugs = Slugs::default();
        assert_eq!(slugs.assign("run"), "run");
        assert_eq!(slugs.assign("run"), "run-1");
        assert_eq!(slugs.assign("Run"), "run-2");
        assert_eq!(slugs.assign("stop"), "stop");
    }

    #[test]
    fn see_heading_name() {
        assert_eq!(see_link("Foo.create"), "[Foo.create](#foocreate)");
    }

    #[test]
    fn see_relative_path() {
        assert_eq!(see_link("./other.md"), "[./other.md](./other.md)");
    }

    #[test]
    fn see_bare_url_is_wrapped() {
        assert_eq!(
            see_link("see https://example.com"),
            "see [https://example.com](https://example.com)"
        );
        assert_eq!(see_link("[x](y)"), "[x](y)");
    }

    #[test]
    fn see_inline_link_tag() {
        assert_eq!(see_link("{@link Foo#run}"), "[Foo#run](#foorun)");
        assert_eq!(
            see_link("{@link https://example.com|the docs}"),
            "[the docs](https://example.com)"
        );
        assert_eq!(see_link("{@link Shape shapes}"), "[shapes](#shape)");
    }

    #[test]
    fn toc_item_indents() {
        assert_eq!(render_toc_item("a", "a", 0), "* [a](#a)");
        assert_eq!(render_toc_item("a.b", "ab", 2), "    * [a.b](#ab)");
    }
}
