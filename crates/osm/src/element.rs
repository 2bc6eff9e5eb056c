//! Non-owning references to DataSet elements.

use crate::datatypes::{
    BoundingBox, Coordinate, DataSet, ElementType, Id, Node, Relation, Tag, TagKey, Way,
    tag_value,
};

/// A reference to any of [`Node`]/[`Way`]/[`Relation`].
///
/// The referenced DataSet needs to outlive this. This is the discriminated
/// union replacing the original's tagged pointer; the packing was a
/// micro-optimization, the enum carries the same information.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Element<'a> {
    #[default]
    Null,
    Node(&'a Node),
    Way(&'a Way),
    Relation(&'a Relation),
}

impl<'a> Element<'a> {
    pub fn element_type(&self) -> ElementType {
        match self {
            Element::Null => ElementType::Null,
            Element::Node(_) => ElementType::Node,
            Element::Way(_) => ElementType::Way,
            Element::Relation(_) => ElementType::Relation,
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Element::Null => 0,
            Element::Node(n) => n.id,
            Element::Way(w) => w.id,
            Element::Relation(r) => r.id,
        }
    }

    pub fn center(&self) -> Coordinate {
        match self {
            Element::Null => Coordinate::INVALID,
            Element::Node(n) => n.coordinate,
            Element::Way(w) => w.bbox.center(),
            Element::Relation(r) => r.bbox.center(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Element::Null => BoundingBox::default(),
            Element::Node(n) => BoundingBox::new(n.coordinate, n.coordinate),
            Element::Way(w) => w.bbox,
            Element::Relation(r) => r.bbox,
        }
    }

    pub fn tags(&self) -> &'a [Tag] {
        match self {
            Element::Null => &[],
            Element::Node(n) => &n.tags,
            Element::Way(w) => &w.tags,
            Element::Relation(r) => &r.tags,
        }
    }

    /// Tag lookup with a pre-interned key, O(log n).
    pub fn tag_value(&self, key: TagKey) -> Option<&'a str> {
        tag_value(self.tags(), key)
    }

    /// Tag lookup with a literal key name; linear scan since the literal is
    /// not interned.
    pub fn tag_value_by_name(&self, data_set: &DataSet, name: &str) -> Option<&'a str> {
        self.tags()
            .iter()
            .find(|t| data_set.key_name(t.key) == name)
            .map(|t| t.value.as_str())
    }

    /// Locale-qualified tag lookup: tries `key:lang_REGION`, then
    /// `key:lang`, then `key`.
    pub fn tag_value_localized(
        &self,
        data_set: &DataSet,
        name: &str,
        locale: &str,
    ) -> Option<&'a str> {
        if !locale.is_empty() {
            let qualified = format!("{name}:{locale}");
            if let Some(v) = self.tag_value_by_name(data_set, &qualified) {
                return Some(v);
            }
            if let Some(lang) = locale.split('_').next()
                && lang != locale
            {
                let qualified = format!("{name}:{lang}");
                if let Some(v) = self.tag_value_by_name(data_set, &qualified) {
                    return Some(v);
                }
            }
        }
        self.tag_value_by_name(data_set, name)
    }

    /// OSM browse URL, for log output and debugging.
    pub fn url(&self) -> String {
        match self {
            Element::Null => String::new(),
            Element::Node(n) => format!("https://openstreetmap.org/node/{}", n.id),
            Element::Way(w) => format!("https://openstreetmap.org/way/{}", w.id),
            Element::Relation(r) => format!("https://openstreetmap.org/relation/{}", r.id),
        }
    }

    /// Returns all nodes belonging to the outer path of this element.
    ///
    /// In the simplest case that's a single closed polygon, but it can also
    /// be a sequence of multiple closed loop polygons, or a polyline. For
    /// multipolygon relations the outer member ways are stitched together:
    /// they may appear in any order and either direction.
    pub fn outer_path(&self, data_set: &'a DataSet) -> Vec<&'a Node> {
        match self {
            Element::Null => Vec::new(),
            Element::Node(n) => vec![n],
            Element::Way(w) => {
                let mut nodes = Vec::new();
                append_nodes_from_way(data_set, &mut nodes, w.nodes.iter().copied());
                nodes
            }
            Element::Relation(rel) => {
                if self.tag_value_by_name(data_set, "type") != Some("multipolygon") {
                    return Vec::new();
                }

                // collect the relevant ways
                let mut ways: Vec<&Way> = Vec::new();
                for member in &rel.members {
                    if member.role != "outer" {
                        continue;
                    }
                    if let Some(way) = data_set.way(member.id)
                        && !way.nodes.is_empty()
                    {
                        ways.push(way);
                    }
                }

                // stitch them together (there is no well-defined order)
                let mut nodes = Vec::new();
                while !ways.is_empty() {
                    let way = ways.remove(0);
                    append_nodes_from_way(data_set, &mut nodes, way.nodes.iter().copied());
                    let start_node = way.nodes[0];
                    let mut last_node = *way.nodes.last().unwrap();

                    loop {
                        last_node = append_next_path(data_set, &mut nodes, last_node, &mut ways);
                        if last_node == 0 || last_node == start_node {
                            break;
                        }
                    }
                }

                nodes
            }
        }
    }
}

fn append_nodes_from_way<'a>(
    data_set: &'a DataSet,
    nodes: &mut Vec<&'a Node>,
    node_ids: impl Iterator<Item = Id>,
) {
    for id in node_ids {
        // missing nodes are intentionally skipped
        if let Some(node) = data_set.node(id) {
            nodes.push(node);
        }
    }
}

/// Finds the next unused way starting or ending at `start_node`, appends
/// its nodes (reversed when matched at the tail) and returns the new end
/// node id, or 0 when no way continues the path.
fn append_next_path<'a>(
    data_set: &'a DataSet,
    nodes: &mut Vec<&'a Node>,
    start_node: Id,
    ways: &mut Vec<&'a Way>,
) -> Id {
    for idx in 0..ways.len() {
        let way = ways[idx];
        if way.nodes[0] == start_node {
            append_nodes_from_way(data_set, nodes, way.nodes.iter().copied());
            let last = *way.nodes.last().unwrap();
            ways.remove(idx);
            return last;
        }
        // path segments can also be backwards
        if *way.nodes.last().unwrap() == start_node {
            append_nodes_from_way(data_set, nodes, way.nodes.iter().rev().copied());
            let last = way.nodes[0];
            ways.remove(idx);
            return last;
        }
    }
    0
}

/// Stable element address: resolvable against the owning DataSet.
///
/// Used wherever element references need to be stored alongside the
/// DataSet (level map, scene graph, hidden-element lists).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    pub element_type: ElementType,
    pub id: Id,
}

impl ElementId {
    pub fn new(element_type: ElementType, id: Id) -> Self {
        ElementId { element_type, id }
    }

    pub fn of(element: Element<'_>) -> Self {
        ElementId {
            element_type: element.element_type(),
            id: element.id(),
        }
    }

    pub fn resolve<'a>(&self, data_set: &'a DataSet) -> Element<'a> {
        match self.element_type {
            ElementType::Null => Element::Null,
            ElementType::Node => data_set.node(self.id).map(Element::Node).unwrap_or_default(),
            ElementType::Way => data_set.way(self.id).map(Element::Way).unwrap_or_default(),
            ElementType::Relation => data_set
                .relation(self.id)
                .map(Element::Relation)
                .unwrap_or_default(),
        }
    }
}

/// Visits every element in natural OSM iteration order: relations first,
/// then ways, then nodes. Scene assembly relies on this order being stable.
pub fn for_each<'a, F: FnMut(Element<'a>)>(data_set: &'a DataSet, mut f: F) {
    for rel in &data_set.relations {
        f(Element::Relation(rel));
    }
    for way in &data_set.ways {
        f(Element::Way(way));
    }
    for node in &data_set.nodes {
        f(Element::Node(node));
    }
}

/// Visits every resolvable member of a relation.
pub fn for_each_member<'a, F: FnMut(Element<'a>)>(
    data_set: &'a DataSet,
    relation: &Relation,
    mut f: F,
) {
    for member in &relation.members {
        let elem = ElementId::new(member.member_type, member.id).resolve(data_set);
        if elem != Element::Null {
            f(elem);
        }
    }
}
