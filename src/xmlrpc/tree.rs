// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! In-memory element tree built from the xml-rs event stream.
//!
//! The decoder needs to look at parents, siblings and descendants, which a
//! pull parser cannot give it, so every document is first materialised into
//! this small tree. Comments and processing instructions are dropped; text,
//! whitespace and CDATA are all kept as text.

use std::io::Read;

use xml::name::OwnedName;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::xmlrpc::decoding::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

#[derive(Debug)]
pub struct Document {
    root: Element,
}

fn qualified_name(name: &OwnedName) -> String {
    match name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, name.local_name),
        None => name.local_name.clone(),
    }
}

impl Document {
    /// Parses `text` into a tree, refusing to nest elements deeper than
    /// `max_depth`.
    pub fn parse(text: &str, max_depth: usize) -> Result<Document, DecodeError> {
        let config = ParserConfig::new().cdata_to_characters(true).ignore_comments(true);
        Builder::new(config.create_reader(text.as_bytes()), max_depth).build()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element named `name` in document order, the root included.
    pub fn elements_by_name<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        if self.root.name == name {
            found.push(&self.root);
        }
        self.root.collect_descendants(name, &mut found);
        found
    }

    /// Every element whose direct parent is named `parent`, paired with
    /// that parent, in document order.
    pub fn elements_with_parent<'a>(
        &'a self,
        name: &str,
        parent: &str,
    ) -> Vec<(&'a Element, &'a Element)> {
        let mut found = Vec::new();
        let mut stack: Vec<(&Element, &Element)> =
            self.root.child_elements().rev().map(|child| (&self.root, child)).collect();
        while let Some((up, element)) = stack.pop() {
            if element.name == name && up.name == parent {
                found.push((up, element));
            }
            // Reversed so the pop order stays in document order.
            stack.extend(element.child_elements().rev().map(|child| (element, child)));
        }
        found
    }
}

impl Element {
    fn new(name: String) -> Element {
        Element { name, children: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match *node {
            Node::Element(ref element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    /// First direct child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    /// Concatenated text of every descendant text node, untouched.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.append_text(&mut text);
        text
    }

    fn append_text(&self, out: &mut String) {
        for node in &self.children {
            match *node {
                Node::Element(ref child) => child.append_text(out),
                Node::Text(ref s) => out.push_str(s),
            }
        }
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

struct Builder<R: Read> {
    parser: EventReader<R>,
    stack: Vec<Element>,
    max_depth: usize,
}

impl<R: Read> Builder<R> {
    fn new(parser: EventReader<R>, max_depth: usize) -> Builder<R> {
        Builder { parser, stack: Vec::new(), max_depth }
    }

    fn build(mut self) -> Result<Document, DecodeError> {
        loop {
            match self.parser.next()? {
                XmlEvent::StartElement { name, .. } => {
                    if self.stack.len() >= self.max_depth {
                        return Err(DecodeError::DepthLimitExceeded { limit: self.max_depth });
                    }
                    self.stack.push(Element::new(qualified_name(&name)));
                }
                XmlEvent::EndElement { .. } => {
                    let element = match self.stack.pop() {
                        Some(element) => element,
                        None => continue,
                    };
                    if self.stack.is_empty() {
                        return self.finish(element);
                    }
                    if let Some(parent) = self.stack.last_mut() {
                        parent.children.push(Node::Element(element));
                    }
                }
                XmlEvent::Characters(s) | XmlEvent::Whitespace(s) | XmlEvent::CData(s) => {
                    if let Some(parent) = self.stack.last_mut() {
                        parent.children.push(Node::Text(s));
                    }
                }
                XmlEvent::EndDocument => {
                    return Err(DecodeError::MalformedDocument("no root element".to_string()))
                }
                _ => {}
            }
        }
    }

    // The root has closed; the reader still has to see a clean end of
    // document so trailing garbage is reported.
    fn finish(mut self, root: Element) -> Result<Document, DecodeError> {
        loop {
            if let XmlEvent::EndDocument = self.parser.next()? {
                return Ok(Document { root });
            }
        }
    }
}
