//! Parsed messages.
//!
//! A [`Message`] owns every element of one record in an arena. Elements refer
//! to their parent and children by [`ElementId`], and are read through the
//! borrowed [`ElementRef`] view.

use std::fmt::Write as _;

use serde::Serialize;

use hl7tree_core::{
    delimiters::{Delimiters, HEADER_CODE},
    value::{FieldData, FieldValue},
};

use crate::{
    element::{Annotation, Annotations, Segment},
    field::TextLayout,
    span::Span,
};

/// Code reported by the synthetic root element.
pub const ROOT_CODE: &str = "___";

/// Index of an element in its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// The synthetic root of every message.
    pub const ROOT: ElementId = ElementId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

/// What an element holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// The synthetic root. It has no schema and level 0.
    Root,
    /// A parsed segment line.
    Segment(Segment),
}

#[derive(Debug, Clone, PartialEq)]
struct ElementNode {
    kind: ElementKind,
    level: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    annotations: Option<Annotations>,
    span: Span,
}

/// One parsed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    nodes: Vec<ElementNode>,
    raw_text: String,
    delimiters: Delimiters,
    terminator: char,
}

impl Message {
    pub(crate) fn new(raw_text: impl Into<String>, terminator: char) -> Self {
        Self {
            nodes: vec![ElementNode {
                kind: ElementKind::Root,
                level: 0,
                parent: None,
                children: Vec::new(),
                annotations: None,
                span: Span::default(),
            }],
            raw_text: raw_text.into(),
            delimiters: Delimiters::default(),
            terminator,
        }
    }

    pub(crate) fn set_delimiters(&mut self, delimiters: Delimiters) {
        self.delimiters = delimiters;
    }

    /// Append `segment` as the last child of `parent`.
    pub(crate) fn add_child(
        &mut self,
        parent: ElementId,
        segment: Segment,
        level: u32,
        span: Span,
    ) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(ElementNode {
            kind: ElementKind::Segment(segment),
            level,
            parent: Some(parent),
            children: Vec::new(),
            annotations: None,
            span,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn add_annotation(&mut self, id: ElementId, annotation: Annotation) {
        self.nodes[id.0]
            .annotations
            .get_or_insert_with(Annotations::default)
            .push(annotation);
    }

    pub(crate) fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// The synthetic root element.
    pub fn root(&self) -> ElementRef<'_> {
        ElementRef {
            message: self,
            id: ElementId::ROOT,
        }
    }

    /// The element with the given id.
    pub fn get(&self, id: ElementId) -> Option<ElementRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ElementRef { message: self, id })
    }

    /// Number of elements, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the message holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every element but the root, in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        let mut order = Vec::with_capacity(self.len());
        self.collect_preorder(ElementId::ROOT, &mut order);
        order
            .into_iter()
            .map(move |id| ElementRef { message: self, id })
    }

    /// The first element with the given code, in document order.
    pub fn find(&self, code: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|element| element.code() == code)
    }

    /// Mutable access to the segment of an element.
    ///
    /// Only values can change this way; the element keeps its place in the
    /// hierarchy.
    pub fn segment_mut(&mut self, id: ElementId) -> Option<&mut Segment> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            ElementKind::Segment(segment) => Some(segment),
            ElementKind::Root => None,
        }
    }

    /// The text this message was parsed from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The delimiters declared by the header line.
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// The segment terminator used between lines.
    pub fn terminator(&self) -> char {
        self.terminator
    }

    /// Serialize the message back to wire text.
    ///
    /// Each element writes its own line, then its annotation lines, then its
    /// children, joined by the segment terminator.
    pub fn to_text(&self) -> String {
        self.to_text_with(TextLayout::Padded)
    }

    pub fn to_text_with(&self, layout: TextLayout) -> String {
        self.root().to_text_block_with(layout)
    }

    /// The message code declared in the header, e.g. `ORU`.
    pub fn message_code(&self) -> Option<&str> {
        self.header_value("msg_type.message_code")
    }

    /// The trigger event declared in the header, e.g. `R01`.
    pub fn event_code(&self) -> Option<&str> {
        self.header_value("msg_type.event_code")
    }

    /// The message as nested data, rooted at the synthetic root.
    pub fn to_data(&self) -> ElementData {
        self.root().to_data()
    }

    /// Render the element hierarchy as indented codes.
    ///
    /// ```text
    /// MSH
    /// PID
    /// ORC
    ///   OBR
    ///     OBX (2 notes)
    /// ```
    pub fn format_tree(&self) -> String {
        let mut out = String::new();
        for element in self.elements() {
            let pad = "  ".repeat(element.depth().saturating_sub(1));
            let _ = match element.annotations().map(Annotations::len) {
                Some(1) => writeln!(out, "{pad}{} (1 note)", element.code()),
                Some(notes) => writeln!(out, "{pad}{} ({notes} notes)", element.code()),
                None => writeln!(out, "{pad}{}", element.code()),
            };
        }
        out
    }

    fn header_value(&self, path: &str) -> Option<&str> {
        let header = self.find(HEADER_CODE)?;
        header
            .segment()?
            .field_path(path)?
            .value()?
            .as_text()
    }

    fn collect_preorder(&self, id: ElementId, order: &mut Vec<ElementId>) {
        for &child in &self.nodes[id.0].children {
            order.push(child);
            self.collect_preorder(child, order);
        }
    }
}

/// A borrowed view of one element of a [`Message`].
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'m> {
    message: &'m Message,
    id: ElementId,
}

impl<'m> ElementRef<'m> {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == ElementId::ROOT
    }

    /// The element code, [`ROOT_CODE`] for the root.
    pub fn code(&self) -> &'m str {
        match &self.node().kind {
            ElementKind::Root => ROOT_CODE,
            ElementKind::Segment(segment) => segment.code(),
        }
    }

    /// The nesting level from the level table, 0 for the root.
    pub fn level(&self) -> u32 {
        self.node().level
    }

    pub fn kind(&self) -> &'m ElementKind {
        &self.node().kind
    }

    /// The parsed segment, `None` for the root.
    pub fn segment(&self) -> Option<&'m Segment> {
        match &self.node().kind {
            ElementKind::Root => None,
            ElementKind::Segment(segment) => Some(segment),
        }
    }

    /// Source span of the element's line.
    pub fn span(&self) -> Span {
        self.node().span
    }

    pub fn parent(&self) -> Option<ElementRef<'m>> {
        self.node().parent.map(|id| self.at(id))
    }

    /// Number of parent links between this element and the root.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), ElementRef::parent).count()
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'m>> + use<'m> {
        let message = self.message;
        self.node()
            .children
            .iter()
            .map(move |&id| ElementRef { message, id })
    }

    /// The first child with the given code.
    pub fn child(&self, code: &str) -> Option<ElementRef<'m>> {
        self.children().find(|child| child.code() == code)
    }

    /// Every child with the given code, in order.
    pub fn children_with_code<'c>(
        &self,
        code: &'c str,
    ) -> impl Iterator<Item = ElementRef<'m>> + use<'m, 'c> {
        self.children().filter(move |child| child.code() == code)
    }

    /// The `n`th child (zero based) with the given code.
    pub fn nth_child_with_code(&self, code: &str, n: usize) -> Option<ElementRef<'m>> {
        self.children_with_code(code).nth(n)
    }

    /// The annotation lines bound to this element.
    pub fn annotations(&self) -> Option<&'m Annotations> {
        self.node().annotations.as_ref()
    }

    /// The annotation lines joined with `\n`.
    pub fn note(&self) -> Option<String> {
        self.annotations().map(Annotations::text)
    }

    /// The top-level field of the segment with the given code.
    pub fn field(&self, code: &str) -> Option<&'m FieldValue> {
        self.segment()?.field(code)?.value()
    }

    /// This element and everything below it as wire text.
    pub fn to_text_block(&self) -> String {
        self.to_text_block_with(TextLayout::Padded)
    }

    pub fn to_text_block_with(&self, layout: TextLayout) -> String {
        let mut lines = Vec::new();
        self.collect_lines(layout, &mut lines);
        lines.join(self.message.terminator.to_string().as_str())
    }

    /// This element and everything below it as nested data.
    pub fn to_data(&self) -> ElementData {
        ElementData {
            code: self.code().to_string(),
            level: self.level(),
            fields: self.segment().map(Segment::to_mapping),
            annotations: self
                .annotations()
                .map(|annotations| annotations.iter().map(|a| a.raw().to_string()).collect())
                .unwrap_or_default(),
            children: self.children().map(|child| child.to_data()).collect(),
        }
    }

    fn collect_lines(&self, layout: TextLayout, lines: &mut Vec<String>) {
        if let Some(segment) = self.segment() {
            lines.push(segment.to_text_with(layout));
        }
        if let Some(annotations) = self.annotations() {
            lines.extend(annotations.iter().map(|a| a.raw().to_string()));
        }
        for child in self.children() {
            child.collect_lines(layout, lines);
        }
    }

    fn node(&self) -> &'m ElementNode {
        &self.message.nodes[self.id.0]
    }

    fn at(&self, id: ElementId) -> ElementRef<'m> {
        ElementRef {
            message: self.message,
            id,
        }
    }
}

/// Serializable view of an element subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementData {
    pub code: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementData>,
}

#[cfg(test)]
mod tests {
    use hl7tree_core::builtin;

    use super::*;

    fn segment(line: &str) -> Segment {
        Segment::from_line(line, &Delimiters::default(), builtin::catalog()).unwrap()
    }

    fn sample() -> Message {
        let mut message = Message::new("", '\r');
        message.add_child(
            ElementId::ROOT,
            segment("MSH|^~\\&|LAB||||||ORU^R01"),
            1,
            Span::default(),
        );
        let orc = message.add_child(ElementId::ROOT, segment("ORC|RE"), 1, Span::default());
        let obr = message.add_child(orc, segment("OBR|1"), 2, Span::default());
        message.add_child(obr, segment("OBX|1|NM"), 3, Span::default());
        message.add_child(obr, segment("OBX|2|NM"), 3, Span::default());
        message.add_annotation(obr, Annotation::new("NTE|1||note", None));
        message
    }

    #[test]
    fn test_len_excludes_root() {
        let message = sample();
        assert_eq!(message.len(), 5);
        assert!(!message.is_empty());
        assert!(Message::new("", '\r').is_empty());
    }

    #[test]
    fn test_parent_links() {
        let message = sample();
        let obx = message.find("OBX").unwrap();

        assert_eq!(obx.parent().unwrap().code(), "OBR");
        assert_eq!(obx.parent().unwrap().parent().unwrap().code(), "ORC");
        assert!(message.root().parent().is_none());
        assert_eq!(obx.depth(), 3);
    }

    #[test]
    fn test_children_with_code() {
        let message = sample();
        let obr = message.find("OBR").unwrap();

        assert_eq!(obr.children_with_code("OBX").count(), 2);
        let second = obr.nth_child_with_code("OBX", 1).unwrap();
        assert_eq!(
            second.segment().unwrap().to_text_with(TextLayout::AsParsed),
            "OBX|2|NM"
        );
        assert!(obr.nth_child_with_code("OBX", 2).is_none());
    }

    #[test]
    fn test_to_text_puts_annotations_after_their_element() {
        let message = sample();

        assert_eq!(
            message.to_text_with(TextLayout::AsParsed),
            "MSH|^~\\&|LAB||||||ORU^R01\rORC|RE\rOBR|1\rNTE|1||note\rOBX|1|NM\rOBX|2|NM"
        );
    }

    #[test]
    fn test_to_text_pads_every_field() {
        let mut message = Message::new("", '\r');
        let orc = message.add_child(ElementId::ROOT, segment("ORC|RE"), 1, Span::default());
        message.add_annotation(orc, Annotation::new("NTE|1", None));

        let text = message.to_text();
        let (orc_line, note) = text.split_once('\r').unwrap();

        assert_eq!(orc_line.matches('|').count(), 14);
        assert!(orc_line.starts_with("ORC|RE|^|^|^|"));
        assert_eq!(note, "NTE|1");
    }

    #[test]
    fn test_header_codes() {
        let message = sample();

        assert_eq!(message.message_code(), Some("ORU"));
        assert_eq!(message.event_code(), Some("R01"));
    }

    #[test]
    fn test_format_tree() {
        assert_eq!(
            sample().format_tree(),
            "MSH\nORC\n  OBR (1 note)\n    OBX\n    OBX\n"
        );
    }

    #[test]
    fn test_segment_mut_keeps_structure() {
        let mut message = sample();
        let id = message.find("ORC").unwrap().id();

        message
            .segment_mut(id)
            .unwrap()
            .set_value("order_control", "NW")
            .unwrap();

        assert_eq!(
            message
                .get(id)
                .unwrap()
                .segment()
                .unwrap()
                .to_text_with(TextLayout::AsParsed),
            "ORC|NW"
        );
        assert!(message.segment_mut(ElementId::ROOT).is_none());
    }

    #[test]
    fn test_to_data() {
        let data = sample().to_data();

        assert_eq!(data.code, ROOT_CODE);
        assert!(data.fields.is_none());
        assert_eq!(data.children.len(), 2);
        assert_eq!(data.children[1].children[0].annotations, vec!["NTE|1||note"]);
    }
}
