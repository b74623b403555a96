// SPDX-License-Identifier: AGPL-3.0-or-later
//! Example lists to backend markup

use crate::ast::{Block, ListNumberStyle, Rewriter};
use crate::backend::{Backend, Example};
use crate::gloss::{extract, is_gloss_list, GlossEntry};
use crate::text::smallcapify;
use tracing::{debug, warn};

/// Replaces every example list made of glosses with one raw block
pub struct GlossRenderer<'a> {
    backend: &'a dyn Backend,
    lists: usize,
    examples: usize,
    skipped: usize,
    ignored: usize,
}

impl<'a> GlossRenderer<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            lists: 0,
            examples: 0,
            skipped: 0,
            ignored: 0,
        }
    }

    /// Lists replaced so far
    pub fn lists(&self) -> usize {
        self.lists
    }

    /// Examples rendered so far
    pub fn examples(&self) -> usize {
        self.examples
    }

    /// Malformed entries dropped from rendered lists
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Example lists left alone because not every item is a gloss
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Render the items of an example list, or `None` if it is not a gloss list
    pub fn render_list(&mut self, items: &[Vec<Block>]) -> Option<Block> {
        if !is_gloss_list(items) {
            debug!(items = items.len(), "example list is not a gloss list, leaving it");
            self.ignored += 1;
            return None;
        }

        let mut examples = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match extract(item, self.backend.format().accepted_raw_formats()) {
                Ok(entry) => examples.push(self.prepare(entry)),
                Err(err) => {
                    warn!(index, "skipping gloss: {err}");
                    self.skipped += 1;
                }
            }
        }

        self.lists += 1;
        self.examples += examples.len();
        Some(self.backend.fragment(&examples).into_block())
    }

    fn prepare(&self, entry: GlossEntry) -> Example {
        let backend = self.backend;
        let escape = |text: &str| backend.escape(text).into_owned();
        let mut translation = entry.translation;
        let label = translation.take_label();

        Example {
            orig: entry.orig.render(escape),
            gloss: entry
                .gloss
                .render(|text| smallcapify(&backend.escape(text), |word| backend.small_caps(word))),
            translation: translation.render(escape),
            label,
        }
    }
}

impl Rewriter for GlossRenderer<'_> {
    fn rewrite_block(&mut self, block: &Block) -> Option<Block> {
        match block {
            Block::OrderedList((_, ListNumberStyle::Example, _), items) => self.render_list(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Inline, ListNumberDelim, Pandoc};
    use crate::backend::{Gb4eBackend, LeipzigBackend};
    use pretty_assertions::assert_eq;

    fn item(lines: &[&str]) -> Vec<Block> {
        let mut inlines = Vec::new();
        for (i, text) in lines.iter().enumerate() {
            if i > 0 {
                inlines.push(Inline::SoftBreak);
            }
            for (j, word) in text.split(' ').enumerate() {
                if j > 0 {
                    inlines.push(Inline::Space);
                }
                inlines.push(Inline::Str(word.to_string()));
            }
        }
        vec![Block::Plain(inlines)]
    }

    fn list(style: ListNumberStyle, items: Vec<Vec<Block>>) -> Block {
        Block::OrderedList((1, style, ListNumberDelim::TwoParens), items)
    }

    #[test]
    fn test_renders_gloss_list_as_latex() {
        let mut doc = Pandoc::new(vec![list(
            ListNumberStyle::Example,
            vec![item(&["ni-ta-kwenda", "1sg-FUT-go", "I will go {#ex:go}"])],
        )]);

        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        doc.walk(&mut renderer);

        let expected = "\\begin{exe}\n\
\\ex\\label{ex:go}\n\
\\gll ni-ta-kwenda \\\\\n\
1sg-\\textsc{fut}-go \\\\\n\
\\trans `I will go' \\\\\n\
\\end{exe}";
        assert_eq!(
            doc.blocks,
            vec![Block::RawBlock("latex".into(), expected.into())]
        );
        assert_eq!(renderer.lists(), 1);
        assert_eq!(renderer.examples(), 1);
    }

    #[test]
    fn test_smallcaps_only_on_gloss_line() {
        let mut renderer = GlossRenderer::new(&LeipzigBackend);
        let block = renderer
            .render_list(&[item(&["NASA DEF", "NASA DEF", "NASA DEF"])])
            .unwrap();

        let Block::RawBlock(format, html) = block else {
            panic!("Expected raw block");
        };
        assert_eq!(format, "html");
        assert!(html.contains("<p>NASA DEF</p>\n<p><abbr>NASA</abbr> <abbr>DEF</abbr></p>"));
        assert!(html.contains("<p>\u{2018}NASA DEF\u{2019}</p>"));
    }

    #[test]
    fn test_unlabelled_translation_unchanged() {
        let mut renderer = GlossRenderer::new(&LeipzigBackend);
        let Some(Block::RawBlock(_, html)) = renderer.render_list(&[item(&["a", "b", "a {b} c"])]) else {
            panic!("Expected raw block");
        };
        assert!(html.starts_with("<div data-gloss>\n"));
        assert!(html.contains("\u{2018}a {b} c\u{2019}"));
    }

    #[test]
    fn test_html_text_is_escaped_before_smallcaps() {
        let mut renderer = GlossRenderer::new(&LeipzigBackend);
        let Some(Block::RawBlock(_, html)) = renderer.render_list(&[item(&["a<b", "A&B", "x"])]) else {
            panic!("Expected raw block");
        };
        assert!(html.contains("<p>a&lt;b</p>"));
        assert!(html.contains("<p><abbr>A</abbr>&amp;<abbr>B</abbr></p>"));
    }

    fn raw_item(format: &str, markup: &str) -> Vec<Block> {
        let mut inlines = vec![
            Inline::Str("the".into()),
            Inline::Space,
            Inline::RawInline(format.into(), markup.into()),
            Inline::Space,
            Inline::Str("dog".into()),
        ];
        for line in ["the big dog", "a big dog"] {
            inlines.push(Inline::SoftBreak);
            inlines.extend(
                line.split(' ')
                    .flat_map(|word| [Inline::Space, Inline::Str(word.into())])
                    .skip(1),
            );
        }
        vec![Block::Plain(inlines)]
    }

    #[test]
    fn test_raw_latex_kept_in_gloss_lines() {
        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        let Some(Block::RawBlock(_, latex)) = renderer.render_list(&[raw_item("tex", "\\textit{big}")]) else {
            panic!("Expected raw block");
        };
        assert!(latex.contains("\\gll the \\textit{big} dog \\\\\n"));
    }

    #[test]
    fn test_raw_markup_of_other_formats_dropped() {
        let mut renderer = GlossRenderer::new(&LeipzigBackend);
        let Some(Block::RawBlock(_, html)) = renderer.render_list(&[raw_item("tex", "\\textit{big}")]) else {
            panic!("Expected raw block");
        };
        assert!(!html.contains("textit"));

        let Some(Block::RawBlock(_, html)) = renderer.render_list(&[raw_item("html", "<i>big</i>")]) else {
            panic!("Expected raw block");
        };
        assert!(html.contains("<p>the <i>big</i> dog</p>"));
    }

    #[test]
    fn test_latex_text_is_escaped() {
        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        let Some(Block::RawBlock(_, latex)) =
            renderer.render_list(&[item(&["#kitab_ı", "book-ACC", "paid 50% of it {#ex:paid}"])])
        else {
            panic!("Expected raw block");
        };
        assert!(latex.contains("\\ex\\label{ex:paid}\n"));
        assert!(latex.contains("\\gll \\#kitab\\_ı \\\\\n"));
        assert!(latex.contains("book-\\textsc{acc} \\\\\n"));
        assert!(latex.contains("\\trans `paid 50\\% of it' \\\\\n"));
    }

    #[test]
    fn test_partial_gloss_list_left_untouched() {
        let original = list(
            ListNumberStyle::Example,
            vec![
                item(&["a", "b", "c"]),
                item(&["d", "e", "f"]),
                item(&["only", "two"]),
            ],
        );
        let mut doc = Pandoc::new(vec![original.clone()]);

        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        doc.walk(&mut renderer);

        assert_eq!(doc.blocks, vec![original]);
        assert_eq!(renderer.ignored(), 1);
        assert_eq!(renderer.lists(), 0);
    }

    #[test]
    fn test_other_list_styles_ignored() {
        let original = list(ListNumberStyle::Decimal, vec![item(&["a", "b", "c"])]);
        let mut doc = Pandoc::new(vec![original.clone()]);

        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        doc.walk(&mut renderer);

        assert_eq!(doc.blocks, vec![original]);
        assert_eq!(renderer.ignored(), 0);
    }

    #[test]
    fn test_nested_gloss_list_in_blockquote() {
        let mut doc = Pandoc::new(vec![Block::BlockQuote(vec![list(
            ListNumberStyle::Example,
            vec![item(&["a", "b", "c"])],
        )])]);

        let mut renderer = GlossRenderer::new(&Gb4eBackend);
        doc.walk(&mut renderer);

        let Block::BlockQuote(children) = &doc.blocks[0] else {
            panic!("Expected block quote");
        };
        assert!(matches!(&children[0], Block::RawBlock(format, _) if format == "latex"));
    }
}
