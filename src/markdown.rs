//! Converts a post's markdown body into a classed HTML fragment. The
//! conversion is a single pass over [`pulldown_cmark`]'s event stream
//! through a custom renderer (modeled after [`pulldown_cmark`]'s private
//! `HtmlWriter`); while each start tag is written, the semantic class for
//! that element kind is injected as the first class token. Raw HTML embedded
//! in the body is passed through untouched, so the step never fails on
//! content and never re-classes markup that already carries classes.

use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag,
};
use std::fmt::{self, Display};
use std::io;

/// Maps an HTML tag name to the semantic class its elements carry in the
/// output. Tags absent from the table (`ol`, `img`, tables, ...) render
/// unclassed. The `inlineCode` row matches no tag the renderer emits; inline
/// code spans are `<code>` and take `codeBlock` through the `code` row. The
/// row is part of the published class contract and is kept as-is.
pub fn semantic_class(tag: &str) -> Option<&'static str> {
    match tag {
        "h1" => Some("heading1"),
        "h2" => Some("heading2"),
        "h3" => Some("heading3"),
        "h4" => Some("heading4"),
        "h5" => Some("heading5"),
        "h6" => Some("heading6"),
        "p" => Some("paragraph"),
        "blockquote" => Some("blockquote"),
        "code" => Some("codeBlock"),
        "ul" => Some("list"),
        "li" => Some("listItem"),
        "hr" => Some("hr"),
        "pre" => Some("codeBlock"),
        "strong" => Some("bold"),
        "em" => Some("italic"),
        "a" => Some("link"),
        "inlineCode" => Some("inlineCode"),
        _ => None,
    }
}

/// Converts `markdown` to classed HTML, writing the result into `w`.
pub fn push_html<W: StrWrite>(w: &mut W, markdown: &str) -> io::Result<()> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = HtmlRenderer::new();
    for event in Parser::new_ext(markdown, options) {
        renderer.on_event(w, event)?;
    }
    Ok(())
}

/// Writes the `class` attribute for `name`, if the table maps it.
fn write_class<W: StrWrite>(w: &mut W, name: &str) -> io::Result<()> {
    if let Some(class) = semantic_class(name) {
        write!(w, r#" class="{}""#, class)?;
    }
    Ok(())
}

/// Writes a complete start tag for an element with no further attributes.
fn simple_tag<W: StrWrite>(w: &mut W, name: &str) -> io::Result<()> {
    w.write_str("<")?;
    w.write_str(name)?;
    write_class(w, name)?;
    w.write_str(">")
}

/// Opens a code block. The semantic class stays the first token; a fenced
/// block's `language-*` token is appended after it.
fn code_block_open<W: StrWrite>(w: &mut W, lang: &str) -> io::Result<()> {
    w.write_str("<pre")?;
    write_class(w, "pre")?;
    w.write_str("><code")?;
    match (semantic_class("code"), lang.is_empty()) {
        (Some(class), false) => {
            write!(w, r#" class="{} language-{}""#, class, lang)?
        }
        (Some(class), true) => write!(w, r#" class="{}""#, class)?,
        (None, false) => write!(w, r#" class="language-{}""#, lang)?,
        (None, true) => {}
    }
    w.write_str(">")
}

fn heading_name(level: u32) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

struct EscapeHref<'a>(CowStr<'a>);

impl<'a> Display for EscapeHref<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, &self.0);
        adaptor.result
    }
}

struct EscapeHtml<'a>(CowStr<'a>);

impl<'a> Display for EscapeHtml<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_html(&mut adaptor, &self.0);
        adaptor.result
    }
}

enum TableState {
    Head,
    Body,
}

/// Renders markdown [`Event`]s into classed HTML.
struct HtmlRenderer {
    table_alignments: Vec<Alignment>,
    table_state: TableState,
    table_cell_index: usize,
}

impl<'a> HtmlRenderer {
    fn new() -> Self {
        HtmlRenderer {
            table_alignments: Vec::default(),
            table_state: TableState::Head,
            table_cell_index: usize::default(),
        }
    }

    fn on_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        match event {
            Event::Start(tag) => self.on_start(w, tag),
            Event::End(tag) => self.on_end(w, tag),
            Event::Code(code) => self.on_code(w, code),
            Event::FootnoteReference(name) => {
                let name = EscapeHtml(name);
                write!(
                    w,
                    r##"<sup class="footnote-reference"><a href="#{}">{}</a></sup>"##,
                    name, name,
                )
            }
            Event::HardBreak => w.write_str("<br />"),
            Event::Html(html) => w.write_str(&html),
            Event::Rule => self.on_rule(w),
            Event::SoftBreak => w.write_str("\n"),
            Event::TaskListMarker(checked) => {
                self.on_task_list_marker(w, checked)
            }
            Event::Text(text) => escape_html(w, &text),
        }
    }

    fn on_start<W: StrWrite>(
        &mut self,
        w: &mut W,
        tag: Tag<'a>,
    ) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => simple_tag(w, "blockquote"),
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => {
                    code_block_open(w, info.split(' ').next().unwrap_or(""))
                }
                CodeBlockKind::Indented => code_block_open(w, ""),
            },
            Tag::Emphasis => simple_tag(w, "em"),
            Tag::FootnoteDefinition(name) => {
                let name = EscapeHtml(name);
                write!(
                    w,
                    r#"<div class="footnote-definition" id="{}">{}. &nbsp;"#,
                    &name, &name,
                )
            }
            Tag::Heading(level) => simple_tag(w, heading_name(level)),
            Tag::Image(_link_type, dest, title) => write!(
                w,
                r#"<img src="{}" alt="" title="{}">"#,
                EscapeHref(dest),
                EscapeHtml(title),
            ),
            Tag::Item => simple_tag(w, "li"),
            Tag::Link(LinkType::Email, dest, title) => {
                w.write_str("<a")?;
                write_class(w, "a")?;
                write!(w, r#" href="mailto:{}""#, EscapeHref(dest))?;
                if !title.is_empty() {
                    write!(w, r#" title="{}""#, EscapeHtml(title))?;
                }
                w.write_str(">")
            }
            Tag::Link(_link_type, dest, title) => {
                w.write_str("<a")?;
                write_class(w, "a")?;
                write!(w, r#" href="{}""#, EscapeHref(dest))?;
                if !title.is_empty() {
                    write!(w, r#" title="{}""#, EscapeHtml(title))?;
                }
                w.write_str(">")
            }
            Tag::List(None) => simple_tag(w, "ul"),
            Tag::List(Some(1)) => w.write_str("<ol>"),
            Tag::List(Some(start)) => write!(w, r#"<ol start="{}">"#, start),
            Tag::Paragraph => simple_tag(w, "p"),
            Tag::Strikethrough => w.write_str("<del>"),
            Tag::Strong => simple_tag(w, "strong"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                w.write_str("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                w.write_str("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                w.write_str("<tr>")
            }
            Tag::TableCell => write!(
                w,
                "<{}{}>",
                match self.table_state {
                    TableState::Head => "th",
                    TableState::Body => "td",
                },
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => r#" align="left""#,
                    Some(Alignment::Right) => r#" align="right""#,
                    Some(Alignment::Center) => r#" align="center""#,
                    _ => "",
                }
            ),
        }
    }

    fn on_end<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("</blockquote>"),
            Tag::CodeBlock(_) => w.write_str("</code></pre>"),
            Tag::Emphasis => w.write_str("</em>"),
            Tag::FootnoteDefinition(_) => w.write_str("</div>"),
            Tag::Heading(level) => write!(w, "</{}>", heading_name(level)),
            Tag::Image(_, _, _) => Ok(()), /* shouldn't happen, handled in
                                            * start */
            Tag::Item => w.write_str("</li>"),
            Tag::Link(_, _, _) => w.write_str("</a>"),
            Tag::List(Some(_)) => w.write_str("</ol>"),
            Tag::List(None) => w.write_str("</ul>"),
            Tag::Paragraph => w.write_str("</p>"),
            Tag::Strikethrough => w.write_str("</del>"),
            Tag::Strong => w.write_str("</strong>"),
            Tag::Table(_) => w.write_str("</tbody></table>"),
            Tag::TableHead => {
                self.table_state = TableState::Body;
                w.write_str("</tr></thead><tbody>")
            }
            Tag::TableRow => w.write_str("</tr>"),
            Tag::TableCell => {
                self.table_cell_index += 1;
                w.write_str(match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                })
            }
        }
    }

    fn on_code<W: StrWrite>(
        &mut self,
        w: &mut W,
        s: CowStr,
    ) -> io::Result<()> {
        w.write_str("<code")?;
        write_class(w, "code")?;
        write!(w, ">{}</code>", EscapeHtml(s))
    }

    fn on_rule<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<hr")?;
        write_class(w, "hr")?;
        w.write_str(" />")
    }

    fn on_task_list_marker<W: StrWrite>(
        &mut self,
        w: &mut W,
        checked: bool,
    ) -> io::Result<()> {
        write!(
            w,
            r#"<input disabled="" type="checkbox" {}/>"#,
            match checked {
                true => r#"checked="" "#,
                false => "",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn to_html(markdown: &str) -> String {
        let mut out = String::new();
        push_html(&mut out, markdown).unwrap();
        out
    }

    #[test]
    fn test_class_table() {
        let wanted = [
            ("h1", "heading1"),
            ("h2", "heading2"),
            ("h3", "heading3"),
            ("h4", "heading4"),
            ("h5", "heading5"),
            ("h6", "heading6"),
            ("p", "paragraph"),
            ("blockquote", "blockquote"),
            ("code", "codeBlock"),
            ("ul", "list"),
            ("li", "listItem"),
            ("hr", "hr"),
            ("pre", "codeBlock"),
            ("strong", "bold"),
            ("em", "italic"),
            ("a", "link"),
            ("inlineCode", "inlineCode"),
        ];
        for (tag, class) in wanted {
            assert_eq!(semantic_class(tag), Some(class), "tag `{}`", tag);
        }
        assert_eq!(semantic_class("ol"), None);
        assert_eq!(semantic_class("img"), None);
        assert_eq!(semantic_class("del"), None);
    }

    #[test]
    fn test_heading_and_emphasis() {
        assert_eq!(
            to_html("# Hi\n\nSome *text*."),
            "<h1 class=\"heading1\">Hi</h1>\
             <p class=\"paragraph\">Some <em class=\"italic\">text</em>.</p>",
        );
    }

    #[test]
    fn test_all_heading_levels() {
        assert_eq!(
            to_html("# a\n## b\n### c\n#### d\n##### e\n###### f"),
            "<h1 class=\"heading1\">a</h1>\
             <h2 class=\"heading2\">b</h2>\
             <h3 class=\"heading3\">c</h3>\
             <h4 class=\"heading4\">d</h4>\
             <h5 class=\"heading5\">e</h5>\
             <h6 class=\"heading6\">f</h6>",
        );
    }

    #[test]
    fn test_nested_classing() {
        assert_eq!(
            to_html("## A *b* c"),
            "<h2 class=\"heading2\">A <em class=\"italic\">b</em> c</h2>",
        );
    }

    #[test]
    fn test_strong() {
        assert_eq!(
            to_html("a **bold** move"),
            "<p class=\"paragraph\">a \
             <strong class=\"bold\">bold</strong> move</p>",
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            to_html("[here](https://example.org)"),
            "<p class=\"paragraph\">\
             <a class=\"link\" href=\"https://example.org\">here</a></p>",
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            to_html("- one\n- two"),
            "<ul class=\"list\">\
             <li class=\"listItem\">one</li>\
             <li class=\"listItem\">two</li>\
             </ul>",
        );
    }

    #[test]
    fn test_ordered_list_unclassed() {
        assert_eq!(
            to_html("1. one\n2. two"),
            "<ol><li class=\"listItem\">one</li>\
             <li class=\"listItem\">two</li></ol>",
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            to_html("> words"),
            "<blockquote class=\"blockquote\">\
             <p class=\"paragraph\">words</p>\
             </blockquote>",
        );
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        assert_eq!(
            to_html("```rust\nlet x = 1;\n```\n"),
            "<pre class=\"codeBlock\">\
             <code class=\"codeBlock language-rust\">let x = 1;\n</code>\
             </pre>",
        );
    }

    #[test]
    fn test_indented_code() {
        assert_eq!(
            to_html("    let x = 1;\n"),
            "<pre class=\"codeBlock\">\
             <code class=\"codeBlock\">let x = 1;\n</code>\
             </pre>",
        );
    }

    #[test]
    fn test_inline_code_takes_code_class() {
        assert_eq!(
            to_html("run `go build` first"),
            "<p class=\"paragraph\">run \
             <code class=\"codeBlock\">go build</code> first</p>",
        );
    }

    #[test]
    fn test_rule() {
        assert_eq!(
            to_html("one\n\n---\n\ntwo"),
            "<p class=\"paragraph\">one</p>\
             <hr class=\"hr\" />\
             <p class=\"paragraph\">two</p>",
        );
    }

    #[test]
    fn test_raw_html_passes_through() {
        let source = "<div class=\"promo\">\n  <b>raw</b>\n</div>\n";
        assert_eq!(to_html(source), source);
    }

    #[test]
    fn test_classed_output_is_not_reclassed() {
        let first = to_html("# Hi\n\nSome *text*.");
        let second = to_html(&first);
        assert_eq!(second, first);
    }
}
