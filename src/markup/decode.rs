//! Indentation-driven decoder for receipt front matter.
//!
//! The decoder walks the markup line by line, keeping an explicit stack of
//! open containers. Each mapping frame remembers its most recently assigned
//! key ("pending key") so an indented block on the following lines can be
//! attached under it.
//!
//! Decoding never fails. Lines that are neither `key: value` nor `- item`
//! lines are ignored, and a sequence marker with nothing to hang from is
//! collected under [`SENTINEL_KEY`].

use super::scalar::coerce;
use super::value::{Mapping, Value};

/// Key used for sequence items that appear under a mapping with no pending key.
pub const SENTINEL_KEY: &str = "__items";

/// Tabs are expanded to this many spaces before indentation is measured.
pub const TAB_WIDTH: usize = 4;

/// Decode a markup block into a value tree.
///
/// The root is always a [`Value::Mapping`]; an empty input yields an empty
/// mapping.
pub fn decode(markup: &str) -> Value {
    Decoder::default().run(markup)
}

/// Where a finished frame is attached in its parent.
#[derive(Debug)]
enum Slot {
    Root,
    Key(String),
    Item,
}

#[derive(Debug)]
enum Node {
    Mapping {
        map: Mapping,
        pending: Option<String>,
    },
    Sequence(Vec<Value>),
    /// The body of a `key:` or bare `-` line nothing has attached to yet.
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Mapping,
    Sequence,
    Open,
}

impl Node {
    fn kind(&self) -> Kind {
        match self {
            Node::Mapping { .. } => Kind::Mapping,
            Node::Sequence(_) => Kind::Sequence,
            Node::Open => Kind::Open,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Mapping { map, .. } => Value::Mapping(map),
            Node::Sequence(items) => Value::Sequence(items),
            Node::Open => Value::Null,
        }
    }
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    slot: Slot,
    node: Node,
}

impl Frame {
    fn mapping(indent: usize, slot: Slot) -> Self {
        Self {
            indent,
            slot,
            node: Node::Mapping {
                map: Mapping::new(),
                pending: None,
            },
        }
    }
}

/// Literal block chomping, from the indicator after the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    /// `|-`: no trailing newline.
    Strip,
    /// `|`: exactly one trailing newline.
    Clip,
    /// `|+`: trailing blank lines kept.
    Keep,
}

/// A literal block header: `|`, then an optional indentation digit and an
/// optional chomping indicator, in either order (`|-`, `|2`, `|2+`, `|-2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    chomp: Chomp,
    /// Content indentation relative to the owning key or marker column.
    indent: Option<usize>,
}

impl BlockHeader {
    fn parse(token: &str) -> Option<Self> {
        let rest = token.strip_prefix('|')?;
        let mut chomp = None;
        let mut indent = None;

        for c in rest.chars() {
            match c {
                '-' if chomp.is_none() => chomp = Some(Chomp::Strip),
                '+' if chomp.is_none() => chomp = Some(Chomp::Keep),
                '1'..='9' if indent.is_none() => indent = c.to_digit(10).map(|d| d as usize),
                _ => return None,
            }
        }

        Some(Self {
            chomp: chomp.unwrap_or(Chomp::Clip),
            indent,
        })
    }
}

/// Whether a bare token would open a literal block.
pub(super) fn is_block_indicator(token: &str) -> bool {
    BlockHeader::parse(token).is_some()
}

#[derive(Debug)]
struct Decoder {
    stack: Vec<Frame>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            stack: vec![Frame::mapping(0, Slot::Root)],
        }
    }
}

impl Decoder {
    fn run(mut self, markup: &str) -> Value {
        let lines: Vec<String> = markup
            .split('\n')
            .map(|line| expand_tabs(line.strip_suffix('\r').unwrap_or(line)))
            .collect();

        let mut next = 0;
        while next < lines.len() {
            let line = lines[next].trim_end();
            next += 1;
            if line.is_empty() {
                continue;
            }

            let indent = leading_spaces(line);
            let content = &line[indent..];

            self.dedent(indent);

            if let Some(item) = sequence_item(content) {
                next = self.sequence_item(indent, item, &lines, next);
            } else if let Some((key, raw)) = split_entry(content) {
                self.ensure_mapping(indent);
                next = self.entry(indent, key, raw, &lines, next);
            }
        }

        self.finish()
    }

    fn dedent(&mut self, indent: usize) {
        while self.stack.len() > 1 && self.stack.last().is_some_and(|f| f.indent > indent) {
            self.pop();
        }
    }

    fn top_kind(&self) -> Kind {
        self.stack.last().map_or(Kind::Mapping, |f| f.node.kind())
    }

    /// Pop the top frame and attach its container to the new top.
    fn pop(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let value = frame.node.into_value();

        match (frame.slot, self.stack.last_mut().map(|f| &mut f.node)) {
            (Slot::Key(key), Some(Node::Mapping { map, .. })) => map.insert(key, value),
            (Slot::Item, Some(Node::Sequence(items))) => items.push(value),
            _ => {}
        }
    }

    fn finish(mut self) -> Value {
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop() {
            Some(frame) => frame.node.into_value(),
            None => Value::Mapping(Mapping::new()),
        }
    }

    /// Make the top frame a sequence that a `- ` line at `indent` can append to.
    fn open_sequence(&mut self, indent: usize) {
        match self.top_kind() {
            Kind::Sequence => {}
            Kind::Open => {
                if let Some(top) = self.stack.last_mut() {
                    top.node = Node::Sequence(Vec::new());
                    top.indent = indent;
                }
            }
            Kind::Mapping => {
                let key = self.claim_pending();
                self.stack.push(Frame {
                    indent,
                    slot: Slot::Key(key),
                    node: Node::Sequence(Vec::new()),
                });
            }
        }
    }

    /// The key a new sequence hangs from in the top mapping.
    fn claim_pending(&mut self) -> String {
        let Some(Frame {
            node: Node::Mapping { map, pending },
            ..
        }) = self.stack.last_mut()
        else {
            return SENTINEL_KEY.to_string();
        };

        let key = pending
            .get_or_insert_with(|| SENTINEL_KEY.to_string())
            .clone();
        map.insert(key.clone(), Value::Null);
        key
    }

    /// Make the top frame a mapping that a key line at `indent` can assign into.
    fn ensure_mapping(&mut self, indent: usize) {
        loop {
            match self.top_kind() {
                Kind::Mapping => return,
                Kind::Open => {
                    if let Some(top) = self.stack.last_mut() {
                        top.node = Node::Mapping {
                            map: Mapping::new(),
                            pending: None,
                        };
                    }
                    return;
                }
                Kind::Sequence => {
                    // A key in the marker column of a keyed sequence belongs to
                    // the sequence's owner, not to the sequence.
                    let sibling = self.stack.len() > 1
                        && self
                            .stack
                            .last()
                            .is_some_and(|f| f.indent == indent && matches!(f.slot, Slot::Key(_)));
                    if sibling {
                        self.pop();
                        continue;
                    }
                    self.stack.push(Frame::mapping(indent, Slot::Item));
                    return;
                }
            }
        }
    }

    fn sequence_item(&mut self, indent: usize, item: &str, lines: &[String], next: usize) -> usize {
        self.open_sequence(indent);

        // A bare marker owns whatever is nested under it, like a bare `key:`.
        if item.is_empty() {
            self.stack.push(Frame {
                indent: indent + 2,
                slot: Slot::Item,
                node: Node::Open,
            });
            return next;
        }

        match split_entry(item) {
            Some((key, raw)) => {
                let column = indent + 2;
                self.stack.push(Frame::mapping(column, Slot::Item));
                self.entry(column, key, raw, lines, next)
            }
            None => {
                let (value, next) = scalar(item, indent, lines, next);
                if let Some(Frame {
                    node: Node::Sequence(items),
                    ..
                }) = self.stack.last_mut()
                {
                    items.push(value);
                }
                next
            }
        }
    }

    /// Assign `key` in the top mapping. `column` is where the key starts.
    fn entry(&mut self, column: usize, key: &str, raw: &str, lines: &[String], next: usize) -> usize {
        if raw.is_empty() {
            self.assign(key, Value::Null);
            self.stack.push(Frame {
                indent: column + 2,
                slot: Slot::Key(key.to_string()),
                node: Node::Open,
            });
            return next;
        }

        let (value, next) = scalar(raw, column, lines, next);
        self.assign(key, value);
        next
    }

    fn assign(&mut self, key: &str, value: Value) {
        if let Some(Frame {
            node: Node::Mapping { map, pending },
            ..
        }) = self.stack.last_mut()
        {
            map.insert(key, value);
            *pending = Some(key.to_string());
        }
    }
}

/// Resolve a raw value token, reading a literal block when it is an indicator.
fn scalar(raw: &str, column: usize, lines: &[String], next: usize) -> (Value, usize) {
    match BlockHeader::parse(raw) {
        Some(header) => {
            let (text, next) = read_block(column, header, lines, next);
            (Value::Text(text), next)
        }
        None => (coerce(raw), next),
    }
}

/// Read literal block lines indented past `column`, starting at `start`.
///
/// Without an indentation digit the content indent is taken from the first
/// line that is not blank. Whitespace-only lines keep whatever lies past the
/// content indent.
fn read_block(column: usize, header: BlockHeader, lines: &[String], start: usize) -> (String, usize) {
    let end = lines[start..]
        .iter()
        .position(|line| !line.trim().is_empty() && leading_spaces(line) <= column)
        .map_or(lines.len(), |offset| start + offset);
    let region = &lines[start..end];

    let block_indent = match header.indent {
        Some(indent) => column + indent,
        None => region
            .iter()
            .find(|line| !line.trim().is_empty())
            .map_or(column + 2, |line| leading_spaces(line)),
    };

    let mut body: Vec<&str> = region
        .iter()
        .map(|line| &line[leading_spaces(line).min(block_indent)..])
        .collect();

    let mut trailing = 0;
    while body.last() == Some(&"") {
        body.pop();
        trailing += 1;
    }

    let mut text = body.join("\n");
    match header.chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if !body.is_empty() {
                text.push('\n');
            }
        }
        Chomp::Keep => text.push_str(&"\n".repeat(trailing + 1)),
    }

    (text, end)
}

/// The item text after a `- ` marker, or `None` for other lines.
fn sequence_item(content: &str) -> Option<&str> {
    if content == "-" {
        return Some("");
    }
    content.strip_prefix("- ").map(str::trim)
}

/// Split `key: value` on the first `": "`, or `key:` with an empty value.
pub(super) fn split_entry(content: &str) -> Option<(&str, &str)> {
    let (key, value) = match content.split_once(": ") {
        Some((key, value)) => (key.trim_end(), value.trim()),
        None => (content.strip_suffix(':')?.trim_end(), ""),
    };

    if key.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Expand tabs in the leading whitespace. Tabs after the first other
/// character are content and stay as they are.
fn expand_tabs(line: &str) -> String {
    let content = line.trim_start_matches([' ', '\t']);
    let lead = &line[..line.len() - content.len()];

    let mut out = String::with_capacity(line.len() + 3 * lead.len());
    for c in lead.chars() {
        match c {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            _ => out.push(c),
        }
    }
    out.push_str(content);
    out
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
