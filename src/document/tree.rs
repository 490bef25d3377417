//! Arena-backed XML tree with parent links.
//!
//! Parsing is recoverable: mismatched end tags are tolerated, unclosed
//! elements are closed at end of input, and a syntax error stops the parse
//! while keeping every node built up to that point.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Index of a node within its [`Document`].
pub type NodeId = usize;

/// An element of the document.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Direct text appearing before the first child element, comment or
    /// processing instruction.
    text: Option<String>,
    text_closed: bool,
}

impl Node {
    /// Value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Leading direct text of the element. Text of descendants and text
    /// following a child element are not included.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Resolves the predefined XML entities. Undeclared entities expand to
/// nothing.
fn resolve_entity(entity: &str) -> Option<&'static str> {
    Some(match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ => "",
    })
}

/// A parsed XML document.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    truncated: bool,
}

impl Document {
    /// Parses a document, building as much of the tree as the input allows.
    pub fn parse(input: &[u8]) -> Self {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.trim_text(false);

        let mut doc = Document::default();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if open.is_empty() && doc.root.is_some() {
                        debug!("Ignoring content after the root element");
                        break;
                    }
                    let id = doc.push_element(&start, open.last().copied());
                    open.push(id);
                }
                Ok(Event::Empty(start)) => {
                    if open.is_empty() && doc.root.is_some() {
                        debug!("Ignoring content after the root element");
                        break;
                    }
                    doc.push_element(&start, open.last().copied());
                }
                Ok(Event::End(end)) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    match open.iter().rposition(|&id| doc.nodes[id].name == name) {
                        Some(position) => open.truncate(position),
                        None => debug!("Ignoring unmatched end tag </{}>", name),
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(&current) = open.last() {
                        let content = text
                            .unescape_with(resolve_entity)
                            .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned().into());
                        doc.append_text(current, &content);
                    }
                }
                Ok(Event::CData(cdata)) => {
                    if let Some(&current) = open.last() {
                        let raw = cdata.into_inner();
                        doc.append_text(current, &String::from_utf8_lossy(&raw));
                    }
                }
                Ok(Event::Comment(_)) | Ok(Event::PI(_)) => {
                    if let Some(&current) = open.last() {
                        doc.nodes[current].text_closed = true;
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "XML parse stopped at byte {}: {}",
                        reader.buffer_position(),
                        e
                    );
                    doc.truncated = true;
                    break;
                }
            }
        }

        if !open.is_empty() {
            debug!("Closing {} unterminated element(s) at end of input", open.len());
        }

        doc
    }

    fn push_element(&mut self, start: &BytesStart<'_>, parent: Option<NodeId>) -> NodeId {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes().with_checks(false) {
            let Ok(attribute) = attribute else {
                break;
            };
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attribute.value).into_owned());
            attributes.push((key, value));
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            attributes,
            parent,
            children: Vec::new(),
            text: None,
            text_closed: false,
        });

        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.root = Some(id),
        }

        id
    }

    fn append_text(&mut self, id: NodeId, content: &str) {
        let node = &mut self.nodes[id];
        if node.text_closed || !node.children.is_empty() || content.is_empty() {
            return;
        }
        node.text.get_or_insert_with(String::new).push_str(content);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether parsing stopped on a syntax error before the end of input.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Proper ancestors of a node, nearest first.
    ///
    /// The walk takes at most as many steps as there are nodes.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.nodes[id].parent,
            remaining: self.nodes.len(),
        }
    }

    /// Descendants of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self.nodes[id].children.iter().rev().copied().collect(),
        }
    }

    /// Descendants of a node with the given tag name, in document order.
    pub fn descendants_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(id)
            .filter(move |&descendant| self.nodes[descendant].name == name)
    }

    /// First direct child with the given tag name.
    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].name == name)
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.doc.nodes[current].parent;
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[current].children.iter().rev().copied());
        Some(current)
    }
}
