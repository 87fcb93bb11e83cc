//! Markdown to PDF export
//!
//! Text is parsed into a flat list of blocks (headings, paragraphs, list
//! items, code, tables) and laid out on A4 pages with the built-in Helvetica and
//! Courier fonts. Lines are wrapped by an estimated character width.

use crate::error::{FinanceError, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
/// Millimetres per typographic point
const PT_TO_MM: f32 = 0.3528;
const MONO_SIZE: f32 = 9.5;
const MONO_INDENT: f32 = 4.0;

/// Layout unit of an exported document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Item text with its marker (`- ` or `3. `) and nesting depth
    ListItem { marker: String, depth: usize, text: String },
    /// Later paragraphs of an item, aligned under its first line
    ItemText { marker_width: usize, depth: usize, text: String },
    Code(String),
    /// Cell text per row, header row first
    Table(Vec<Vec<String>>),
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Open {
    #[default]
    None,
    Heading(u8),
    Paragraph,
    Code,
}

struct Item {
    marker: String,
    depth: usize,
    started: bool,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    buffer: String,
    open: Open,
    /// Next number of each open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    items: Vec<Item>,
    row: Vec<String>,
    table: Vec<Vec<String>>,
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl BlockBuilder {
    fn flush(&mut self) {
        let open = self.open;
        let text = if open == Open::Code {
            self.buffer.trim_end().to_string()
        } else {
            collapse(&self.buffer)
        };
        self.buffer.clear();
        if text.is_empty() {
            return;
        }

        let block = match open {
            Open::Heading(level) => Block::Heading { level, text },
            Open::Code => Block::Code(text),
            Open::Paragraph | Open::None => match self.items.last_mut() {
                Some(item) if item.started => Block::ItemText {
                    marker_width: item.marker.chars().count(),
                    depth: item.depth,
                    text,
                },
                Some(item) => {
                    item.started = true;
                    Block::ListItem {
                        marker: item.marker.clone(),
                        depth: item.depth,
                        text,
                    }
                }
                None => Block::Paragraph(text),
            },
        };
        self.blocks.push(block);
    }

    /// Flush pending text and switch to `open`
    fn begin(&mut self, open: Open) {
        self.flush();
        self.open = open;
    }

    fn start_item(&mut self) {
        self.begin(Open::None);
        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            _ => "- ".to_string(),
        };
        self.items.push(Item {
            marker,
            depth: self.lists.len().saturating_sub(1),
            started: false,
        });
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => self.begin(Open::Heading(level as u8)),
            Event::Start(Tag::Paragraph) => self.begin(Open::Paragraph),
            Event::Start(Tag::CodeBlock(_)) => self.begin(Open::Code),
            Event::Start(Tag::List(start)) => {
                self.begin(Open::None);
                self.lists.push(start);
            }
            Event::Start(Tag::Item) => self.start_item(),
            Event::Start(Tag::Table(_)) => {
                self.begin(Open::None);
                self.table.clear();
            }
            Event::End(TagEnd::List(_)) => {
                self.begin(Open::None);
                self.lists.pop();
            }
            Event::End(TagEnd::Item) => {
                self.begin(Open::None);
                self.items.pop();
            }
            Event::End(TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::CodeBlock) => {
                self.begin(Open::None)
            }
            Event::End(TagEnd::TableCell) => {
                let cell = collapse(&self.buffer);
                self.buffer.clear();
                self.row.push(cell);
            }
            Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
                let row = std::mem::take(&mut self.row);
                self.table.push(row);
            }
            Event::End(TagEnd::Table) => {
                let table = std::mem::take(&mut self.table);
                if !table.is_empty() {
                    self.blocks.push(Block::Table(table));
                }
            }
            Event::Text(t) | Event::Code(t) => self.buffer.push_str(&t),
            Event::SoftBreak => self
                .buffer
                .push(if self.open == Open::Code { '\n' } else { ' ' }),
            Event::HardBreak => self.buffer.push('\n'),
            Event::Rule => {
                self.begin(Open::None);
                self.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }
}

/// Parse Markdown (plain text is a single paragraph per blank-line block)
pub fn parse_markdown(text: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(text, Options::ENABLE_TABLES) {
        builder.event(event);
    }
    builder.flush();
    builder.blocks
}

/// Fixed-width table lines: padded cells joined by `|`, a rule under the header
pub fn table_lines(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |row: &[String]| {
        widths
            .iter()
            .enumerate()
            .map(|(c, &width)| {
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}")
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        lines.push(render(row));
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
            lines.push(rule.join("-+-"));
        }
    }
    lines
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Built-in PDF fonts only cover Latin-1
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

/// Writes lines top to bottom, starting new pages as needed
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size: f32, indent: f32, font: &IndirectFontRef) {
        let height = size * PT_TO_MM * 1.4;
        if self.y - height < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
            self.pages += 1;
        }
        self.y -= height;
        self.layer
            .use_text(latin1(text), size, Mm(MARGIN + indent), Mm(self.y), font);
    }

    /// One source line in Courier, split into chunks that fit the page
    fn mono(&mut self, text: &str, font: &IndirectFontRef) {
        let width = columns(MONO_SIZE, 0.6, MONO_INDENT).max(1);
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            self.line("", MONO_SIZE, MONO_INDENT, font);
        }
        for chunk in chars.chunks(width) {
            self.line(&chunk.iter().collect::<String>(), MONO_SIZE, MONO_INDENT, font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Characters per line for a font size and average glyph width (in em)
fn columns(size: f32, glyph_em: f32, indent: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;
    (usable / (size * glyph_em * PT_TO_MM)).floor() as usize
}

/// Render `text` as a PDF at `path`; returns the page count
pub fn write_pdf(text: &str, title: &str, path: &Path) -> Result<usize> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = |f| doc.add_builtin_font(f).map_err(pdf_error);
    let fonts = Fonts {
        regular: font(BuiltinFont::Helvetica)?,
        bold: font(BuiltinFont::HelveticaBold)?,
        mono: font(BuiltinFont::Courier)?,
    };

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
        pages: 1,
    };

    for block in parse_markdown(text) {
        match block {
            Block::Heading { level, text } => {
                let size = match level {
                    1 => 20.0,
                    2 => 16.0,
                    3 => 14.0,
                    _ => 12.0,
                };
                writer.gap(2.0);
                for line in wrap(&text, columns(size, 0.55, 0.0)) {
                    writer.line(&line, size, 0.0, &fonts.bold);
                }
                writer.gap(1.5);
            }
            Block::Paragraph(text) => {
                for line in wrap(&text, columns(11.0, 0.5, 0.0)) {
                    writer.line(&line, 11.0, 0.0, &fonts.regular);
                }
                writer.gap(2.0);
            }
            Block::ListItem {
                marker,
                depth,
                text,
            } => {
                let indent = 6.0 * (depth as f32 + 1.0);
                let lines = wrap(&text, columns(11.0, 0.5, indent));
                for (i, line) in lines.iter().enumerate() {
                    let line = if i == 0 {
                        format!("{marker}{line}")
                    } else {
                        format!("{}{line}", " ".repeat(marker.len()))
                    };
                    writer.line(&line, 11.0, indent, &fonts.regular);
                }
                writer.gap(1.0);
            }
            Block::ItemText {
                marker_width,
                depth,
                text,
            } => {
                let indent = 6.0 * (depth as f32 + 1.0);
                let pad = " ".repeat(marker_width);
                for line in wrap(&text, columns(11.0, 0.5, indent)) {
                    writer.line(&format!("{pad}{line}"), 11.0, indent, &fonts.regular);
                }
                writer.gap(1.0);
            }
            Block::Code(code) => {
                for source_line in code.lines() {
                    writer.mono(source_line, &fonts.mono);
                }
                writer.gap(2.0);
            }
            Block::Table(rows) => {
                for line in table_lines(&rows) {
                    writer.mono(&line, &fonts.mono);
                }
                writer.gap(2.0);
            }
            Block::Rule => {
                writer.line(&"_".repeat(columns(11.0, 0.5, 0.0)), 11.0, 0.0, &fonts.regular);
                writer.gap(2.0);
            }
        }
    }

    let pages = writer.pages;
    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;
    Ok(pages)
}

fn pdf_error<E: std::fmt::Debug>(err: E) -> FinanceError {
    FinanceError::PdfError(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markdown_blocks() {
        let blocks = parse_markdown(
            "# Report\n\nSTI rose\ntoday.\n\n- banks\n- telcos\n\n1. first\n2. second\n\n```\nlet x = 1;\n```\n\n---\n",
        );

        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Report".to_string()
                },
                Block::Paragraph("STI rose today.".to_string()),
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 0,
                    text: "banks".to_string()
                },
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 0,
                    text: "telcos".to_string()
                },
                Block::ListItem {
                    marker: "1. ".to_string(),
                    depth: 0,
                    text: "first".to_string()
                },
                Block::ListItem {
                    marker: "2. ".to_string(),
                    depth: 0,
                    text: "second".to_string()
                },
                Block::Code("let x = 1;".to_string()),
                Block::Rule,
            ]
        );
    }

    #[test]
    fn test_plain_text_is_paragraphs() {
        let blocks = parse_markdown("first para\n\nsecond para");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("first para".to_string()),
                Block::Paragraph("second para".to_string()),
            ]
        );
    }

    #[test]
    fn test_item_paragraphs_stay_in_their_item() {
        let blocks = parse_markdown("- first para\n\n  second para\n");
        assert_eq!(
            blocks,
            vec![
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 0,
                    text: "first para".to_string()
                },
                Block::ItemText {
                    marker_width: 2,
                    depth: 0,
                    text: "second para".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_text_after_nested_list_continues_parent() {
        let blocks = parse_markdown("- outer\n  - inner\n\n  tail text\n- next\n");
        assert_eq!(
            blocks,
            vec![
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 0,
                    text: "outer".to_string()
                },
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 1,
                    text: "inner".to_string()
                },
                Block::ItemText {
                    marker_width: 2,
                    depth: 0,
                    text: "tail text".to_string()
                },
                Block::ListItem {
                    marker: "- ".to_string(),
                    depth: 0,
                    text: "next".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_tables_keep_rows_and_cells() {
        let blocks = parse_markdown(
            "Ratios:\n\n| Ticker | CurrentRatio |\n|---|---|\n| AAPL | 0.99 |\n| META | 2.67 |\n",
        );
        let rows = vec![
            vec!["Ticker".to_string(), "CurrentRatio".to_string()],
            vec!["AAPL".to_string(), "0.99".to_string()],
            vec!["META".to_string(), "2.67".to_string()],
        ];
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("Ratios:".to_string()),
                Block::Table(rows.clone()),
            ]
        );

        assert_eq!(
            table_lines(&rows),
            vec![
                "Ticker | CurrentRatio",
                "-------+-------------",
                "AAPL   | 0.99",
                "META   | 2.67",
            ]
        );
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_latin1_replacement() {
        assert_eq!(latin1("café 股票"), "café ??");
    }

    #[test]
    fn test_write_pdf_paginates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("long.pdf");
        let body = (0..200)
            .map(|i| format!("Paragraph number {i} of the market summary."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let text = format!("| Ticker | QuickRatio |\n|---|---|\n| DBS | 1.2 |\n\n{body}");

        let pages = write_pdf(&text, "long", &path).unwrap();
        assert!(pages > 1);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
