//! JSON map archives.
//!
//! A debug-friendly dump of an OSM extract, read through the abstract
//! reader sink like any other format. The wire formats proper (o5m, pbf,
//! xml) live outside this workspace.
//!
//! ```json
//! {
//!   "region": "DE",
//!   "timezone": "Europe/Berlin",
//!   "nodes": [{ "id": 1, "lat": 52.0, "lon": 13.0, "tags": { "door": "yes" } }],
//!   "ways": [{ "id": 10, "nodes": [1, 2, 3, 1], "tags": { "indoor": "room" } }],
//!   "relations": [{ "id": 100, "members": [{ "id": 10, "role": "outer", "type": "way" }],
//!                   "tags": { "type": "multipolygon" } }]
//! }
//! ```

use serde_json::Value;

use map::MapData;
use osm::{ElementType, Member, Node, ReaderSink, Relation, Tag, Way};

#[derive(Debug)]
pub enum MapArchiveError {
    NotAnArchive,
    InvalidElement { section: &'static str, index: usize, reason: String },
}

impl std::fmt::Display for MapArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapArchiveError::NotAnArchive => write!(f, "expected a map archive object"),
            MapArchiveError::InvalidElement {
                section,
                index,
                reason,
            } => {
                write!(f, "invalid {section} element at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for MapArchiveError {}

/// Parses `payload` and loads it into `sink`.
pub fn read_archive_into(payload: &str, sink: &mut ReaderSink<'_>) -> Result<(), MapArchiveError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        MapArchiveError::InvalidElement {
            section: "archive",
            index: 0,
            reason: format!("JSON parse error: {e}"),
        }
    })?;
    let obj = value.as_object().ok_or(MapArchiveError::NotAnArchive)?;

    if let Some(nodes) = obj.get("nodes").and_then(|v| v.as_array()) {
        for (index, node_val) in nodes.iter().enumerate() {
            let node = parse_node(node_val, sink)
                .map_err(|reason| MapArchiveError::InvalidElement {
                    section: "node",
                    index,
                    reason,
                })?;
            sink.add_node(node);
        }
    }

    if let Some(ways) = obj.get("ways").and_then(|v| v.as_array()) {
        for (index, way_val) in ways.iter().enumerate() {
            let way = parse_way(way_val, sink)
                .map_err(|reason| MapArchiveError::InvalidElement {
                    section: "way",
                    index,
                    reason,
                })?;
            sink.add_way(way);
        }
    }

    if let Some(relations) = obj.get("relations").and_then(|v| v.as_array()) {
        for (index, rel_val) in relations.iter().enumerate() {
            let relation = parse_relation(rel_val, sink).map_err(|reason| {
                MapArchiveError::InvalidElement {
                    section: "relation",
                    index,
                    reason,
                }
            })?;
            sink.add_relation(relation);
        }
    }

    Ok(())
}

/// Loads a complete archive into a fresh [`MapData`], including region and
/// time-zone metadata.
pub fn load_map_data_from_json_str(payload: &str) -> Result<MapData, MapArchiveError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        MapArchiveError::InvalidElement {
            section: "archive",
            index: 0,
            reason: format!("JSON parse error: {e}"),
        }
    })?;
    let obj = value.as_object().ok_or(MapArchiveError::NotAnArchive)?;

    let mut data_set = osm::DataSet::new();
    {
        let mut sink = ReaderSink::new(&mut data_set);
        read_archive_into(payload, &mut sink)?;
    }

    let mut data = MapData::from_data_set(data_set);
    if let Some(region) = obj.get("region").and_then(|v| v.as_str()) {
        data.set_region_code(region);
    }
    if let Some(tz) = obj.get("timezone").and_then(|v| v.as_str()) {
        data.set_time_zone(tz);
    }
    Ok(data)
}

fn parse_tags(value: &Value, sink: &mut ReaderSink<'_>) -> Result<Vec<Tag>, String> {
    let Some(obj) = value.get("tags") else {
        return Ok(Vec::new());
    };
    let obj = obj.as_object().ok_or("tags must be an object".to_string())?;
    let mut tags = Vec::with_capacity(obj.len());
    for (key, val) in obj {
        let val = val
            .as_str()
            .ok_or_else(|| format!("tag {key} must be a string"))?;
        tags.push(Tag {
            key: sink.data_set_mut().make_tag_key(key),
            value: val.to_string(),
        });
    }
    Ok(tags)
}

fn parse_id(value: &Value) -> Result<i64, String> {
    value
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or("missing id".to_string())
}

fn parse_node(value: &Value, sink: &mut ReaderSink<'_>) -> Result<Node, String> {
    let id = parse_id(value)?;
    let lat = value
        .get("lat")
        .and_then(|v| v.as_f64())
        .ok_or("missing lat".to_string())?;
    let lon = value
        .get("lon")
        .and_then(|v| v.as_f64())
        .ok_or("missing lon".to_string())?;
    let tags = parse_tags(value, sink)?;
    Ok(Node {
        id,
        coordinate: osm::Coordinate::from_degrees(lat, lon),
        tags,
    })
}

fn parse_way(value: &Value, sink: &mut ReaderSink<'_>) -> Result<Way, String> {
    let id = parse_id(value)?;
    let nodes = value
        .get("nodes")
        .and_then(|v| v.as_array())
        .ok_or("missing nodes".to_string())?
        .iter()
        .map(|v| v.as_i64().ok_or("node ref must be an integer".to_string()))
        .collect::<Result<Vec<i64>, String>>()?;
    let tags = parse_tags(value, sink)?;
    Ok(Way {
        id,
        nodes,
        tags,
        ..Default::default()
    })
}

fn parse_relation(value: &Value, sink: &mut ReaderSink<'_>) -> Result<Relation, String> {
    let id = parse_id(value)?;
    let members = value
        .get("members")
        .and_then(|v| v.as_array())
        .ok_or("missing members".to_string())?
        .iter()
        .map(|m| parse_member(m))
        .collect::<Result<Vec<Member>, String>>()?;
    let tags = parse_tags(value, sink)?;
    Ok(Relation {
        id,
        members,
        tags,
        ..Default::default()
    })
}

fn parse_member(value: &Value) -> Result<Member, String> {
    let id = parse_id(value)?;
    let role = value
        .get("role")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let member_type = match value.get("type").and_then(|v| v.as_str()) {
        Some("node") => ElementType::Node,
        Some("way") => ElementType::Way,
        Some("relation") => ElementType::Relation,
        other => return Err(format!("unknown member type: {other:?}")),
    };
    Ok(Member {
        id,
        role,
        member_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use map::MapLevel;

    const ARCHIVE: &str = r#"{
        "region": "DE",
        "timezone": "Europe/Berlin",
        "nodes": [
            { "id": 1, "lat": 52.0, "lon": 13.0 },
            { "id": 2, "lat": 52.0, "lon": 13.001 },
            { "id": 3, "lat": 52.001, "lon": 13.001 },
            { "id": 4, "lat": 52.001, "lon": 13.0, "tags": { "door": "yes" } }
        ],
        "ways": [
            { "id": 10, "nodes": [1, 2, 3, 4, 1],
              "tags": { "indoor": "room", "level": "0" } }
        ],
        "relations": [
            { "id": 100,
              "members": [ { "id": 10, "role": "outer", "type": "way" } ],
              "tags": { "type": "multipolygon" } }
        ]
    }"#;

    #[test]
    fn loads_archive_with_metadata() {
        let data = load_map_data_from_json_str(ARCHIVE).unwrap();
        assert_eq!(data.region_code(), "DE");
        assert_eq!(data.time_zone(), "Europe/Berlin");
        assert_eq!(data.data_set().nodes.len(), 4);
        assert_eq!(data.data_set().ways.len(), 1);
        assert_eq!(data.data_set().relations.len(), 1);
        assert!(data.elements_on_level(MapLevel::GROUND).is_some());
    }

    #[test]
    fn tags_are_interned_against_the_data_set() {
        let data = load_map_data_from_json_str(ARCHIVE).unwrap();
        let door = data.data_set().tag_key("door");
        assert!(door.is_valid());
        let node = data.data_set().node(4).unwrap();
        assert_eq!(osm::tag_value(&node.tags, door), Some("yes"));
    }

    #[test]
    fn way_bboxes_are_recomputed() {
        let data = load_map_data_from_json_str(ARCHIVE).unwrap();
        assert!(data.data_set().way(10).unwrap().bbox.is_valid());
    }

    #[test]
    fn malformed_input_reports_the_element() {
        let err = load_map_data_from_json_str(r#"{ "nodes": [ { "id": 1 } ] }"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("node"));
        assert!(msg.contains("lat"));
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert!(matches!(
            load_map_data_from_json_str("[1, 2, 3]"),
            Err(MapArchiveError::NotAnArchive)
        ));
    }
}
