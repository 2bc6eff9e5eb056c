//! Core OSM data types: coordinates, bounding boxes, tags, elements and the
//! DataSet that owns all of them.

/// OSM element identifier.
pub type Id = i64;

/// Coordinate, stored as 1e7 × degree to avoid floating point drift.
///
/// Can be in an invalid state with coordinates out of range, see
/// [`Coordinate::is_valid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub latitude: i32,
    pub longitude: i32,
}

impl Coordinate {
    pub const INVALID: Coordinate = Coordinate {
        latitude: i32::MAX,
        longitude: i32::MAX,
    };

    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Coordinate {
            latitude: (lat * 10_000_000.0).round() as i32,
            longitude: (lon * 10_000_000.0).round() as i32,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude != i32::MAX && self.longitude != i32::MAX
    }

    pub fn lat_f64(&self) -> f64 {
        self.latitude as f64 / 10_000_000.0
    }

    pub fn lon_f64(&self) -> f64 {
        self.longitude as f64 / 10_000_000.0
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Coordinate::INVALID
    }
}

/// Bounding box, ie. a pair of coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingBox {
    pub fn new(min: Coordinate, max: Coordinate) -> Self {
        BoundingBox { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_valid() && self.max.is_valid()
    }

    pub fn center(&self) -> Coordinate {
        if !self.is_valid() {
            return Coordinate::INVALID;
        }
        Coordinate {
            latitude: ((self.min.latitude as i64 + self.max.latitude as i64) / 2) as i32,
            longitude: ((self.min.longitude as i64 + self.max.longitude as i64) / 2) as i32,
        }
    }

    pub fn united(&self, other: &BoundingBox) -> BoundingBox {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        BoundingBox {
            min: Coordinate {
                latitude: self.min.latitude.min(other.min.latitude),
                longitude: self.min.longitude.min(other.min.longitude),
            },
            max: Coordinate {
                latitude: self.max.latitude.max(other.max.latitude),
                longitude: self.max.longitude.max(other.max.longitude),
            },
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.is_valid()
            && other.is_valid()
            && !(self.max.latitude < other.min.latitude
                || self.min.latitude > other.max.latitude
                || self.max.longitude < other.min.longitude
                || self.min.longitude > other.max.longitude)
    }
}

/// Interned tag key: an index into the owning DataSet's key table.
///
/// Keys must be resolved against the same DataSet the tags were built with;
/// an unresolved key never matches any tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagKey(pub(crate) u32);

impl TagKey {
    pub const INVALID: TagKey = TagKey(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != TagKey::INVALID
    }
}

impl Default for TagKey {
    fn default() -> Self {
        TagKey::INVALID
    }
}

/// An OSM element tag. Tag lists are kept sorted by interned key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: TagKey,
    pub value: String,
}

/// An OSM node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub id: Id,
    pub coordinate: Coordinate,
    pub tags: Vec<Tag>,
}

/// An OSM way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Way {
    pub id: Id,
    pub nodes: Vec<Id>,
    pub bbox: BoundingBox,
    pub tags: Vec<Tag>,
}

impl Way {
    /// A way is closed when it starts and ends on the same node.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.nodes.first() == self.nodes.last()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementType {
    #[default]
    Null,
    Node,
    Way,
    Relation,
}

/// A member in a relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: Id,
    pub role: String,
    pub member_type: ElementType,
}

/// An OSM relation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relation {
    pub id: Id,
    pub bbox: BoundingBox,
    pub members: Vec<Member>,
    pub tags: Vec<Tag>,
}

/// A set of nodes, ways and relations, plus the tag key table all of their
/// tags are interned against.
///
/// The element vectors are kept sorted by id so lookup is a binary search.
/// The DataSet owns all storage; [`crate::Element`] values are non-owning
/// references into it.
#[derive(Debug, Default)]
pub struct DataSet {
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
    keys: Vec<String>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an existing tag key without interning it.
    pub fn tag_key(&self, name: &str) -> TagKey {
        match self.keys.iter().position(|k| k == name) {
            Some(idx) => TagKey(idx as u32),
            None => TagKey::INVALID,
        }
    }

    /// Interns `name` into the key table, returning the existing key if
    /// already present.
    pub fn make_tag_key(&mut self, name: &str) -> TagKey {
        let key = self.tag_key(name);
        if key.is_valid() {
            return key;
        }
        self.keys.push(name.to_string());
        TagKey((self.keys.len() - 1) as u32)
    }

    pub fn key_name(&self, key: TagKey) -> &str {
        if !key.is_valid() {
            return "";
        }
        self.keys.get(key.0 as usize).map(String::as_str).unwrap_or("")
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes
            .binary_search_by(|n| n.id.cmp(&id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    pub fn way(&self, id: Id) -> Option<&Way> {
        self.ways
            .binary_search_by(|w| w.id.cmp(&id))
            .ok()
            .map(|idx| &self.ways[idx])
    }

    pub fn relation(&self, id: Id) -> Option<&Relation> {
        self.relations
            .binary_search_by(|r| r.id.cmp(&id))
            .ok()
            .map(|idx| &self.relations[idx])
    }

    /// Inserts a node at its sorted position. An existing node with the
    /// same id is replaced.
    pub fn add_node(&mut self, mut node: Node) {
        sort_tags(&mut node.tags);
        match self.nodes.binary_search_by(|n| n.id.cmp(&node.id)) {
            Ok(idx) => self.nodes[idx] = node,
            Err(idx) => self.nodes.insert(idx, node),
        }
    }

    pub fn add_way(&mut self, mut way: Way) {
        sort_tags(&mut way.tags);
        match self.ways.binary_search_by(|w| w.id.cmp(&way.id)) {
            Ok(idx) => self.ways[idx] = way,
            Err(idx) => self.ways.insert(idx, way),
        }
    }

    pub fn add_relation(&mut self, mut relation: Relation) {
        sort_tags(&mut relation.tags);
        match self
            .relations
            .binary_search_by(|r| r.id.cmp(&relation.id))
        {
            Ok(idx) => self.relations[idx] = relation,
            Err(idx) => self.relations.insert(idx, relation),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty() && self.relations.is_empty()
    }

    /// Recomputes way and relation bounding boxes from their members.
    ///
    /// Use when external bboxes are absent or untrusted. Relations get two
    /// passes so nested relations see their members' fresh boxes.
    pub fn recompute_bounding_boxes(&mut self) {
        let mut boxes = Vec::with_capacity(self.ways.len());
        for way in &self.ways {
            let mut bbox = BoundingBox::default();
            for node_id in &way.nodes {
                if let Some(node) = self.node(*node_id) {
                    bbox = bbox.united(&BoundingBox::new(node.coordinate, node.coordinate));
                }
            }
            boxes.push(bbox);
        }
        for (way, bbox) in self.ways.iter_mut().zip(boxes) {
            way.bbox = bbox;
        }

        for _ in 0..2 {
            let mut rel_boxes = Vec::with_capacity(self.relations.len());
            for rel in &self.relations {
                let mut bbox = BoundingBox::default();
                for member in &rel.members {
                    let member_box = match member.member_type {
                        ElementType::Null => BoundingBox::default(),
                        ElementType::Node => self
                            .node(member.id)
                            .map(|n| BoundingBox::new(n.coordinate, n.coordinate))
                            .unwrap_or_default(),
                        ElementType::Way => {
                            self.way(member.id).map(|w| w.bbox).unwrap_or_default()
                        }
                        ElementType::Relation => self
                            .relation(member.id)
                            .map(|r| r.bbox)
                            .unwrap_or_default(),
                    };
                    bbox = bbox.united(&member_box);
                }
                rel_boxes.push(bbox);
            }
            for (rel, bbox) in self.relations.iter_mut().zip(rel_boxes) {
                rel.bbox = bbox;
            }
        }
    }
}

fn sort_tags(tags: &mut [Tag]) {
    tags.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Tag lookup over a sorted tag list.
pub fn tag_value(tags: &[Tag], key: TagKey) -> Option<&str> {
    if !key.is_valid() {
        return None;
    }
    tags.binary_search_by(|t| t.key.cmp(&key))
        .ok()
        .map(|idx| tags[idx].value.as_str())
}
