//! PNML 导入/导出.
//!
//! Only the P/T subset is read: `place`, `transition` and `arc` elements, with
//! `name/text`, `initialMarking/text` and `inscription/text` children. Elements
//! are matched by local name, so documents with or without the PNML namespace
//! are accepted. Indices follow document order.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use indexmap::map::Entry;
use thiserror::Error;
use xml::reader::{EventReader, XmlEvent};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent as WriterEvent};

use crate::net::builder::{MarkingPolicy, NetBuilder};
use crate::net::core::{Net, NetError};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::Idx;
use crate::net::structure::{ArcDirection, Place, Transition, Weight};

pub const PNML_NAMESPACE: &str = "http://www.pnml.org/version-2009/grammar/pnml";
const PT_NET_TYPE: &str = "http://www.pnml.org/version-2009/grammar/ptnet";

#[derive(Debug, Error)]
pub enum PnmlError {
    #[error("xml error: {0}")]
    Xml(#[from] xml::reader::Error),
    #[error("xml writer error: {0}")]
    Writer(#[from] xml::writer::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{field} of '{owner}' must be non-negative, found {value}")]
    Negative {
        field: &'static str,
        owner: String,
        value: i64,
    },
    #[error("generated document is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Net(#[from] NetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Place,
    Transition,
    Arc,
}

#[derive(Debug, Default)]
struct PlaceRecord {
    name: Option<String>,
    marking: Weight,
}

#[derive(Debug)]
struct ArcRecord {
    source: String,
    target: String,
    weight: Weight,
}

/// The element currently being read and the text collected for it.
#[derive(Debug)]
struct OpenNode {
    kind: NodeKind,
    depth: usize,
    id: Option<String>,
    source: Option<String>,
    target: Option<String>,
    name: Option<String>,
    marking: Option<String>,
    inscription: Option<String>,
}

impl OpenNode {
    fn new(kind: NodeKind, depth: usize, attributes: &[xml::attribute::OwnedAttribute]) -> Self {
        let attr = |name: &str| {
            attributes
                .iter()
                .find(|a| a.name.local_name == name)
                .map(|a| a.value.clone())
        };
        Self {
            kind,
            depth,
            id: attr("id"),
            source: attr("source"),
            target: attr("target"),
            name: None,
            marking: None,
            inscription: None,
        }
    }

    fn slot(&mut self, path: &[String]) -> Option<&mut Option<String>> {
        match path {
            [parent, text] if text == "text" => match (self.kind, parent.as_str()) {
                (_, "name") => Some(&mut self.name),
                (NodeKind::Place, "initialMarking") => Some(&mut self.marking),
                (NodeKind::Arc, "inscription") => Some(&mut self.inscription),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Integer text of a marking or inscription. Non-integers fall back to `default`.
fn count_text(
    text: Option<&str>,
    default: Weight,
    field: &'static str,
    owner: &str,
) -> Result<Weight, PnmlError> {
    let Some(value) = text.and_then(|t| t.trim().parse::<i64>().ok()) else {
        return Ok(default);
    };
    Weight::try_from(value).map_err(|_| PnmlError::Negative {
        field,
        owner: owner.to_owned(),
        value,
    })
}

#[derive(Debug, Default)]
struct Document {
    places: IndexMap<String, PlaceRecord>,
    transitions: IndexMap<String, Option<String>>,
    arcs: Vec<ArcRecord>,
}

impl Document {
    fn close(&mut self, node: OpenNode) -> Result<(), PnmlError> {
        let name = node
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        match node.kind {
            NodeKind::Place => {
                let Some(id) = node.id else {
                    log::warn!("skipping place without id");
                    return Ok(());
                };
                let marking = count_text(node.marking.as_deref(), 0, "initialMarking", &id)?;
                match self.places.entry(id) {
                    Entry::Occupied(entry) => Err(PnmlError::DuplicateId {
                        kind: "place",
                        id: entry.key().clone(),
                    }),
                    Entry::Vacant(entry) => {
                        entry.insert(PlaceRecord { name, marking });
                        Ok(())
                    }
                }
            }
            NodeKind::Transition => {
                let Some(id) = node.id else {
                    log::warn!("skipping transition without id");
                    return Ok(());
                };
                match self.transitions.entry(id) {
                    Entry::Occupied(entry) => Err(PnmlError::DuplicateId {
                        kind: "transition",
                        id: entry.key().clone(),
                    }),
                    Entry::Vacant(entry) => {
                        entry.insert(name);
                        Ok(())
                    }
                }
            }
            NodeKind::Arc => {
                if let (Some(source), Some(target)) = (node.source, node.target) {
                    let owner = format!("{source} -> {target}");
                    let weight = count_text(node.inscription.as_deref(), 1, "inscription", &owner)?;
                    self.arcs.push(ArcRecord {
                        source,
                        target,
                        weight,
                    });
                }
                Ok(())
            }
        }
    }

    fn into_net(self, policy: MarkingPolicy) -> Result<Net, PnmlError> {
        let mut builder = NetBuilder::with_policy(policy);
        for (id, record) in &self.places {
            let mut place = Place::new(id.clone()).with_tokens(record.marking);
            if let Some(name) = &record.name {
                place = place.with_name(name.clone());
            }
            builder.add_place(place);
        }
        for (id, name) in &self.transitions {
            let mut transition = Transition::new(id.clone());
            if let Some(name) = name {
                transition = transition.with_name(name.clone());
            }
            builder.add_transition(transition);
        }

        let place_of = |id: &str| self.places.get_index_of(id).map(PlaceId::from_usize);
        let transition_of = |id: &str| self.transitions.get_index_of(id).map(TransitionId::from_usize);
        for arc in &self.arcs {
            if let (Some(place), Some(transition)) =
                (place_of(&arc.source), transition_of(&arc.target))
            {
                builder.add_input_arc(place, transition, arc.weight);
                continue;
            }
            match (transition_of(&arc.source), place_of(&arc.target)) {
                (Some(transition), Some(place)) => {
                    builder.add_output_arc(place, transition, arc.weight)
                }
                _ => log::debug!("ignoring arc {} -> {}", arc.source, arc.target),
            }
        }

        Ok(builder.build()?)
    }
}

pub fn from_reader<R: Read>(reader: R, policy: MarkingPolicy) -> Result<Net, PnmlError> {
    parse(EventReader::new(BufReader::new(reader)), policy)
}

pub fn from_str(content: &str, policy: MarkingPolicy) -> Result<Net, PnmlError> {
    parse(EventReader::new(content.as_bytes()), policy)
}

pub fn read_pnml<P: AsRef<Path>>(path: P, policy: MarkingPolicy) -> Result<Net, PnmlError> {
    from_reader(File::open(path)?, policy)
}

fn parse<R: Read>(mut xml: EventReader<R>, policy: MarkingPolicy) -> Result<Net, PnmlError> {
    let mut document = Document::default();
    let mut stack: Vec<String> = Vec::new();
    let mut open: Option<OpenNode> = None;

    loop {
        match xml.next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let local = name.local_name;
                if open.is_none() {
                    let kind = match local.as_str() {
                        "place" => Some(NodeKind::Place),
                        "transition" => Some(NodeKind::Transition),
                        "arc" => Some(NodeKind::Arc),
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        open = Some(OpenNode::new(kind, stack.len(), &attributes));
                    }
                }
                stack.push(local);
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(node) = open.as_mut() {
                    let path = &stack[node.depth + 1..];
                    if let Some(slot) = node.slot(path) {
                        slot.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            XmlEvent::EndElement { .. } => {
                stack.pop();
                if open.as_ref().is_some_and(|node| node.depth == stack.len()) {
                    if let Some(node) = open.take() {
                        document.close(node)?;
                    }
                }
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }

    log::debug!(
        "pnml: {} places, {} transitions, {} arcs",
        document.places.len(),
        document.transitions.len(),
        document.arcs.len()
    );
    document.into_net(policy)
}

/// Serializes `net` as a PNML P/T net document.
pub fn to_pnml(net: &Net) -> Result<String, PnmlError> {
    let mut buffer = Vec::new();
    {
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .create_writer(&mut buffer);
        writer.write(WriterEvent::start_element("pnml").default_ns(PNML_NAMESPACE))?;
        writer.write(
            WriterEvent::start_element("net")
                .attr("id", "net")
                .attr("type", PT_NET_TYPE),
        )?;
        writer.write(WriterEvent::start_element("page").attr("id", "page0"))?;

        for place in net.places().iter() {
            writer.write(WriterEvent::start_element("place").attr("id", &place.key))?;
            if let Some(name) = &place.name {
                write_text(&mut writer, "name", name)?;
            }
            if place.tokens > 0 {
                write_text(&mut writer, "initialMarking", &place.tokens.to_string())?;
            }
            writer.write(WriterEvent::end_element())?;
        }

        for transition in net.transitions().iter() {
            writer.write(WriterEvent::start_element("transition").attr("id", &transition.key))?;
            if let Some(name) = &transition.name {
                write_text(&mut writer, "name", name)?;
            }
            writer.write(WriterEvent::end_element())?;
        }

        for (idx, arc) in net.arcs().enumerate() {
            let place = &net.place(arc.place).key;
            let transition = &net.transition(arc.transition).key;
            let (source, target) = match arc.direction {
                ArcDirection::PlaceToTransition => (place, transition),
                ArcDirection::TransitionToPlace => (transition, place),
            };
            let id = format!("a{idx}");
            writer.write(
                WriterEvent::start_element("arc")
                    .attr("id", &id)
                    .attr("source", source)
                    .attr("target", target),
            )?;
            if arc.weight != 1 {
                write_text(&mut writer, "inscription", &arc.weight.to_string())?;
            }
            writer.write(WriterEvent::end_element())?;
        }

        // page, net, pnml
        for _ in 0..3 {
            writer.write(WriterEvent::end_element())?;
        }
    }
    Ok(String::from_utf8(buffer)?)
}

fn write_text<W: std::io::Write>(
    writer: &mut EventWriter<W>,
    element: &str,
    text: &str,
) -> Result<(), PnmlError> {
    writer.write(WriterEvent::start_element(element))?;
    writer.write(WriterEvent::start_element("text"))?;
    writer.write(WriterEvent::characters(text))?;
    writer.write(WriterEvent::end_element())?;
    writer.write(WriterEvent::end_element())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::Marking;

    const NAMESPACED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pnml xmlns="http://www.pnml.org/version-2009/grammar/pnml">
  <net id="n1" type="http://www.pnml.org/version-2009/grammar/ptnet">
    <page id="page0">
      <place id="p1">
        <name><text>Ready</text></name>
        <initialMarking><text>1</text></initialMarking>
      </place>
      <place id="p2">
        <graphics><position x="10" y="20"/></graphics>
      </place>
      <transition id="t1"><name><text>go</text></name></transition>
      <arc id="a1" source="p1" target="t1"/>
      <arc id="a2" source="t1" target="p2"><inscription><text>1</text></inscription></arc>
      <arc id="a3" source="p1" target="p2"/>
      <arc id="a4" source="t1" target="nowhere"/>
    </page>
  </net>
</pnml>"#;

    const PLAIN: &str = r#"<pnml><net id="n"><page id="g">
      <arc id="a1" source="t1" target="p1"/>
      <place id="p1"><initialMarking><text> x </text></initialMarking></place>
      <transition id="t1"/>
    </page></net></pnml>"#;

    #[test]
    fn reads_namespaced_document() {
        let net = from_str(NAMESPACED, MarkingPolicy::Strict).unwrap();
        assert_eq!(net.places_len(), 2);
        assert_eq!(net.transitions_len(), 1);
        assert_eq!(net.place(PlaceId::new(0)).label(), "Ready");
        assert_eq!(net.place(PlaceId::new(1)).label(), "p2");
        assert_eq!(net.transition(TransitionId::new(0)).label(), "go");
        assert_eq!(net.initial_marking(), Marking::from(vec![1, 0]));
        assert_eq!(net.input_weight(PlaceId::new(0), TransitionId::new(0)), 1);
        assert_eq!(net.output_weight(PlaceId::new(1), TransitionId::new(0)), 1);
        // place -> place and dangling arcs are dropped
        assert_eq!(net.arcs().count(), 2);
    }

    #[test]
    fn arcs_may_precede_their_endpoints() {
        let net = from_str(PLAIN, MarkingPolicy::Strict).unwrap();
        assert_eq!(net.output_weight(PlaceId::new(0), TransitionId::new(0)), 1);
        // unparsable marking falls back to zero
        assert_eq!(net.initial_marking(), Marking::from(vec![0]));
    }

    #[test]
    fn heavy_inscription_is_a_modeling_error() {
        let doc = r#"<pnml><net><place id="p"/><transition id="t"/>
            <arc source="p" target="t"><inscription><text>2</text></inscription></arc>
        </net></pnml>"#;
        assert!(matches!(
            from_str(doc, MarkingPolicy::Strict),
            Err(PnmlError::Net(NetError::ArcWeight { weight: 2, .. }))
        ));
    }

    #[test]
    fn negative_marking_is_rejected() {
        let doc = r#"<pnml><net>
            <place id="p"><initialMarking><text>-1</text></initialMarking></place>
        </net></pnml>"#;
        assert!(matches!(
            from_str(doc, MarkingPolicy::Strict),
            Err(PnmlError::Negative { field: "initialMarking", value: -1, .. })
        ));
    }

    #[test]
    fn negative_inscription_is_rejected() {
        let doc = r#"<pnml><net><place id="p"/><transition id="t"/>
            <arc source="p" target="t"><inscription><text> -1 </text></inscription></arc>
        </net></pnml>"#;
        match from_str(doc, MarkingPolicy::Strict) {
            Err(PnmlError::Negative { field, owner, value }) => {
                assert_eq!(field, "inscription");
                assert_eq!(owner, "p -> t");
                assert_eq!(value, -1);
            }
            other => panic!("expected a negative inscription error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = r#"<pnml><net><place id="p"/><place id="p"/></net></pnml>"#;
        assert!(matches!(
            from_str(doc, MarkingPolicy::Strict),
            Err(PnmlError::DuplicateId { kind: "place", .. })
        ));
    }

    #[test]
    fn malformed_xml_is_reported() {
        assert!(matches!(
            from_str("<pnml><net>", MarkingPolicy::Strict),
            Err(PnmlError::Xml(_))
        ));
    }

    #[test]
    fn export_reads_back_to_the_same_net() {
        let net = from_str(NAMESPACED, MarkingPolicy::Strict).unwrap();
        let exported = to_pnml(&net).unwrap();
        let again = from_str(&exported, MarkingPolicy::Strict).unwrap();
        assert_eq!(again.initial_marking(), net.initial_marking());
        assert_eq!(again.place(PlaceId::new(0)).label(), "Ready");
        assert_eq!(again.arcs().collect::<Vec<_>>(), net.arcs().collect::<Vec<_>>());
    }
}
