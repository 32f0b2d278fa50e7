//! In-memory XML tree for the generated document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`], so a node can be
//! revisited after later siblings were appended. The generator relies on this
//! to stamp a gateway's `default` attribute once its default flow is known.
//!
//! Tag and attribute names are literal strings. A prefixed name such as
//! `zeebe:script` is written exactly as given; no namespace resolution takes
//! place.

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::export::Error;

/// Handle of a node inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct XmlNode {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
}

impl XmlNode {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
}

impl XmlTree {
    /// Creates a tree holding only a root node.
    pub fn new(root_tag: &'static str) -> Self {
        Self {
            nodes: vec![XmlNode::new(root_tag)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a new child to `parent` and returns its handle.
    pub fn append(&mut self, parent: NodeId, tag: &'static str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(XmlNode::new(tag));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Sets an attribute, replacing an existing value in place so attribute
    /// order stays stable.
    pub fn set_attribute(&mut self, node: NodeId, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => attributes.push((name, value)),
        }
    }

    #[cfg(test)]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node.0].text = Some(text.into());
    }

    /// Serializes the tree with two-space indentation and no XML declaration.
    pub fn to_xml_string(&self) -> Result<String, Error> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_node(&mut writer, self.root())?;

        String::from_utf8(writer.into_inner()).map_err(|err| {
            Error::Render(format!("Generated document is not UTF-8: {err}"))
        })
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), Error> {
        let node = &self.nodes[id.0];

        let mut start = BytesStart::new(node.tag);
        for (name, value) in &node.attributes {
            start.push_attribute((*name, value.as_str()));
        }

        if node.children.is_empty() && node.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &node.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &node.children {
            self.write_node(writer, *child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(node.tag)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_root() {
        let tree = XmlTree::new("definitions");
        assert_eq!(tree.to_xml_string().expect("serializes"), "<definitions/>");
    }

    #[test]
    fn test_nested_with_indent() {
        let mut tree = XmlTree::new("process");
        let root = tree.root();
        let start = tree.append(root, "startEvent");
        tree.set_attribute(start, "id", "s");

        assert_eq!(
            tree.to_xml_string().expect("serializes"),
            "<process>\n  <startEvent id=\"s\"/>\n</process>"
        );
    }

    #[test]
    fn test_text_stays_inline_and_escaped() {
        let mut tree = XmlTree::new("sequenceFlow");
        let root = tree.root();
        let condition = tree.append(root, "conditionExpression");
        tree.set_attribute(condition, "xsi:type", "tFormalExpression");
        tree.set_text(condition, "=amount > 1000");

        let xml = tree.to_xml_string().expect("serializes");
        assert!(xml.contains(
            "<conditionExpression xsi:type=\"tFormalExpression\">=amount &gt; 1000</conditionExpression>"
        ));
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut tree = XmlTree::new("exclusiveGateway");
        let root = tree.root();
        tree.set_attribute(root, "id", "g");
        tree.set_attribute(root, "default", "flow_a");
        tree.set_attribute(root, "default", "flow_b");

        assert_eq!(tree.attribute(root, "default"), Some("flow_b"));
        assert_eq!(
            tree.to_xml_string().expect("serializes"),
            "<exclusiveGateway id=\"g\" default=\"flow_b\"/>"
        );
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let mut tree = XmlTree::new("zeebe:input");
        let root = tree.root();
        tree.set_attribute(root, "source", "=status = \"ok\"");

        let xml = tree.to_xml_string().expect("serializes");
        assert!(xml.contains("source=\"=status = &quot;ok&quot;\""));
    }
}
