// SPDX-License-Identifier: MIT
//
// Markup event source — drive a handler from an XML byte stream.
//
// `quick-xml` does the tokenizing, entity resolution and end-tag matching.
// This module adds the document-level rules a streaming tokenizer leaves to
// its caller: exactly one root element, nothing but whitespace outside it,
// and every element closed by end of input.
//
// Events are delivered synchronously, in document order, as soon as they
// are read, so output appears while input is still arriving. The first
// error stops everything; there is no recovery.

use std::io::{self, BufRead, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// Receiver of markup events.
pub trait MarkupHandler {
    /// An element opened. `attributes` are in document order, values
    /// unescaped.
    ///
    /// # Errors
    ///
    /// An error aborts parsing and is returned from [`parse`].
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) -> io::Result<()>;

    /// An element closed. Self-closing elements get a start then an end.
    ///
    /// # Errors
    ///
    /// An error aborts parsing and is returned from [`parse`].
    fn end_element(&mut self, name: &str) -> io::Result<()>;

    /// Text inside the root element, entities resolved. One run of text
    /// may arrive in several pieces.
    ///
    /// # Errors
    ///
    /// An error aborts parsing and is returned from [`parse`].
    fn character_data(&mut self, text: &str) -> io::Result<()>;
}

impl<H: MarkupHandler + ?Sized> MarkupHandler for &mut H {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) -> io::Result<()> {
        (**self).start_element(name, attributes)
    }

    fn end_element(&mut self, name: &str) -> io::Result<()> {
        (**self).end_element(name)
    }

    fn character_data(&mut self, text: &str) -> io::Result<()> {
        (**self).character_data(text)
    }
}

// ─── Root Wrapping ───────────────────────────────────────────────────────────

const ROOT_OPEN: &[u8] = b"<tml>";
const ROOT_CLOSE: &[u8] = b"</tml>";

/// Surround `input` with an implicit `<tml>` root element.
///
/// Lets a document body (a sequence of elements and text with no single
/// root) be parsed as a whole document. Error positions count the five
/// bytes of the opening tag.
pub fn wrap_in_root<R: BufRead>(input: R) -> impl BufRead {
    ROOT_OPEN.chain(input).chain(ROOT_CLOSE)
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn utf8<'a>(bytes: &'a [u8], position: u64) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| Error::markup(position, e.to_string()))
}

// quick-xml tokenizes more leniently than the XML grammar allows. These
// checks restore the rules a document is most likely to break.

/// Element and attribute names start with a letter, `_`, `:` or any
/// non-ASCII character.
fn check_name(name: &str, position: u64) -> Result<()> {
    match name.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' || !c.is_ascii() => Ok(()),
        _ => Err(Error::markup(position, format!("not well-formed (invalid name {name:?})"))),
    }
}

/// Control characters other than tab, line feed and carriage return are
/// not XML characters.
fn check_chars(raw: &[u8], position: u64) -> Result<()> {
    match raw.iter().find(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')) {
        Some(b) => Err(Error::markup(position, format!("not well-formed (invalid character 0x{b:02x})"))),
        None => Ok(()),
    }
}

fn check_text(raw: &[u8], position: u64) -> Result<()> {
    check_chars(raw, position)?;
    if raw.windows(3).any(|w| w == b"]]>") {
        return Err(Error::markup(position, "not well-formed (']]>' in text)"));
    }
    Ok(())
}

fn attributes_of(start: &BytesStart<'_>, position: u64) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::markup(position, e.to_string()))?;
        let key = utf8(attr.key.as_ref(), position)?.to_owned();
        check_name(&key, position)?;
        if attr.value.contains(&b'<') {
            return Err(Error::markup(position, "not well-formed ('<' in attribute value)"));
        }
        check_chars(&attr.value, position)?;
        let value = attr
            .unescape_value()
            .map_err(|e| Error::markup(position, e.to_string()))?;
        out.push((key, value.into_owned()));
    }
    Ok(out)
}

/// Where the parser is relative to the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeRoot,
    InRoot { depth: usize },
    AfterRoot,
}

/// Parse `input` to the end, delivering events to `handler`.
///
/// # Errors
///
/// - [`Error::Markup`] for anything that is not a well-formed document:
///   tokenizer errors, mismatched or unmatched end tags, unknown entities,
///   bad attributes, text or a second element outside the root, unclosed
///   elements at end of input, or no element at all.
/// - [`Error::Io`] if reading `input` fails or the handler returns an error.
pub fn parse<R: BufRead, H: MarkupHandler>(input: R, mut handler: H) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;

    let mut phase = Phase::BeforeRoot;
    let mut buf = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(quick_xml::Error::Io(e)) => {
                return Err(Error::Io(io::Error::new(e.kind(), e.to_string())));
            }
            Err(e) => return Err(Error::markup(reader.error_position(), e.to_string())),
        };
        let position = reader.buffer_position();

        match event {
            Event::Start(start) => {
                let depth = match phase {
                    Phase::BeforeRoot => 0,
                    Phase::InRoot { depth } => depth,
                    Phase::AfterRoot => {
                        return Err(Error::markup(position, "junk after document element"));
                    }
                };
                let name = utf8(start.name().as_ref(), position)?.to_owned();
                check_name(&name, position)?;
                let attributes = attributes_of(&start, position)?;
                handler.start_element(&name, &attributes)?;
                phase = Phase::InRoot { depth: depth + 1 };
            }
            Event::End(end) => {
                let Phase::InRoot { depth } = phase else {
                    return Err(Error::markup(position, "unmatched end tag"));
                };
                handler.end_element(utf8(end.name().as_ref(), position)?)?;
                phase = if depth == 1 {
                    Phase::AfterRoot
                } else {
                    Phase::InRoot { depth: depth - 1 }
                };
            }
            Event::Text(text) => {
                check_text(&text, position)?;
                let text = text
                    .unescape()
                    .map_err(|e| Error::markup(position, e.to_string()))?;
                deliver_text(&mut handler, phase, &text, position)?;
            }
            Event::CData(cdata) => {
                check_chars(&cdata, position)?;
                let text = utf8(&cdata, position)?;
                deliver_text(&mut handler, phase, text, position)?;
            }
            Event::Eof => {
                return match phase {
                    Phase::AfterRoot => Ok(()),
                    Phase::InRoot { depth } => Err(Error::markup(
                        position,
                        format!("unclosed token ({depth} element(s) still open)"),
                    )),
                    Phase::BeforeRoot => Err(Error::markup(position, "no element found")),
                };
            }
            Event::Empty(_) | Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn deliver_text<H: MarkupHandler>(handler: &mut H, phase: Phase, text: &str, position: u64) -> Result<()> {
    match phase {
        Phase::InRoot { .. } => {
            if !text.is_empty() {
                handler.character_data(text)?;
            }
            Ok(())
        }
        _ if text.chars().all(char::is_whitespace) => Ok(()),
        Phase::BeforeRoot => Err(Error::markup(position, "text before document element")),
        Phase::AfterRoot => Err(Error::markup(position, "junk after document element")),
    }
}

/// Parse markup already held in memory, such as an inline expression.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_str<H: MarkupHandler>(input: &str, handler: H) -> Result<()> {
    parse(input.as_bytes(), handler)
}

/// Parse `input` as a document body, inside an implicit root.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_body<R: Read, H: MarkupHandler>(input: R, handler: H) -> Result<()> {
    parse(wrap_in_root(io::BufReader::new(input)), handler)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
