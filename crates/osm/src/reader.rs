//! The abstract reader interface: the only way OSM data enters the system.
//!
//! Concrete wire-format readers (o5m, pbf, xml) live elsewhere; they parse
//! into a [`ReaderSink`] which routes elements into the target DataSet or,
//! when set, into a merge buffer for the host to integrate.

use crate::datatypes::{DataSet, Node, Relation, Way};

/// Holds parsed elements outside the DataSet.
///
/// Tag keys are still interned against the DataSet, so buffered elements
/// are tied to it in any case.
#[derive(Debug, Default)]
pub struct DataSetMergeBuffer {
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
}

impl DataSetMergeBuffer {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.ways.clear();
        self.relations.clear();
    }
}

/// Destination for parsed OSM elements.
pub struct ReaderSink<'a> {
    data_set: &'a mut DataSet,
    merge_buffer: Option<&'a mut DataSetMergeBuffer>,
}

impl<'a> ReaderSink<'a> {
    pub fn new(data_set: &'a mut DataSet) -> Self {
        ReaderSink {
            data_set,
            merge_buffer: None,
        }
    }

    pub fn with_merge_buffer(
        data_set: &'a mut DataSet,
        buffer: &'a mut DataSetMergeBuffer,
    ) -> Self {
        ReaderSink {
            data_set,
            merge_buffer: Some(buffer),
        }
    }

    /// The DataSet tag keys are interned against.
    pub fn data_set_mut(&mut self) -> &mut DataSet {
        self.data_set
    }

    pub fn add_node(&mut self, node: Node) {
        match &mut self.merge_buffer {
            Some(buffer) => buffer.nodes.push(node),
            None => self.data_set.add_node(node),
        }
    }

    pub fn add_way(&mut self, way: Way) {
        match &mut self.merge_buffer {
            Some(buffer) => buffer.ways.push(way),
            None => self.data_set.add_way(way),
        }
    }

    pub fn add_relation(&mut self, relation: Relation) {
        match &mut self.merge_buffer {
            Some(buffer) => buffer.relations.push(relation),
            None => self.data_set.add_relation(relation),
        }
    }
}
