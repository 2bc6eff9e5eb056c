//! The ordered scene-graph item store.

use style::Color;

use crate::item::SceneGraphItem;

/// Contiguous range of items sharing one `(layer, z)` ordering key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayerOffset {
    pub layer: i32,
    pub z: i32,
    pub begin: usize,
    pub end: usize,
}

/// Ordered sequence of scene graph items plus the layer-offset index.
///
/// Ordering contract: after [`SceneGraph::finalize`], items are sorted by
/// `(layer, z)` ascending and equal keys preserve insertion order, which
/// follows the natural OSM iteration order. Hit-test tie-breaking observes
/// this determinism.
#[derive(Debug, Default)]
pub struct SceneGraph {
    items: Vec<SceneGraphItem>,
    layer_offsets: Vec<LayerOffset>,
    background_color: Color,
    foreground_color: Color,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all items; used when the floor or style changes. Items are
    /// replaced wholesale, never patched.
    pub fn clear(&mut self) {
        self.items.clear();
        self.layer_offsets.clear();
    }

    pub fn add_item(&mut self, item: SceneGraphItem) {
        self.items.push(item);
    }

    /// Sorts items and rebuilds the layer-offset index.
    pub fn finalize(&mut self) {
        self.items.sort_by_key(|item| (item.layer, item.z));

        self.layer_offsets.clear();
        let mut begin = 0;
        while begin < self.items.len() {
            let key = (self.items[begin].layer, self.items[begin].z);
            let mut end = begin + 1;
            while end < self.items.len()
                && (self.items[end].layer, self.items[end].z) == key
            {
                end += 1;
            }
            self.layer_offsets.push(LayerOffset {
                layer: key.0,
                z: key.1,
                begin,
                end,
            });
            begin = end;
        }
    }

    pub fn items(&self) -> &[SceneGraphItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [SceneGraphItem] {
        &mut self.items
    }

    pub fn layer_offsets(&self) -> &[LayerOffset] {
        &self.layer_offsets
    }

    pub fn items_in(&self, offset: LayerOffset) -> &[SceneGraphItem] {
        &self.items[offset.begin..offset.end]
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn foreground_color(&self) -> Color {
        self.foreground_color
    }

    pub fn set_foreground_color(&mut self, color: Color) {
        self.foreground_color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{LabelItem, SceneItemPayload};
    use osm::{ElementId, ElementType};

    fn item(layer: i32, z: i32, id: i64) -> SceneGraphItem {
        SceneGraphItem {
            layer,
            z,
            element: ElementId::new(ElementType::Way, id),
            payload: SceneItemPayload::Label(LabelItem {
                text: "x".into(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn iteration_order_is_layer_then_z() {
        let mut sg = SceneGraph::new();
        sg.add_item(item(1, 0, 1));
        sg.add_item(item(0, 5, 2));
        sg.add_item(item(0, -1, 3));
        sg.finalize();

        let keys: Vec<(i32, i32)> = sg.items().iter().map(|i| (i.layer, i.z)).collect();
        assert_eq!(keys, vec![(0, -1), (0, 5), (1, 0)]);
    }

    #[test]
    fn equal_keys_preserve_insertion_order() {
        let mut sg = SceneGraph::new();
        sg.add_item(item(0, 0, 10));
        sg.add_item(item(0, 0, 20));
        sg.add_item(item(0, 0, 30));
        sg.finalize();

        let ids: Vec<i64> = sg.items().iter().map(|i| i.element.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn offsets_cover_all_items_without_overlap() {
        let mut sg = SceneGraph::new();
        sg.add_item(item(0, 0, 1));
        sg.add_item(item(0, 0, 2));
        sg.add_item(item(0, 1, 3));
        sg.add_item(item(2, 0, 4));
        sg.finalize();

        let offsets = sg.layer_offsets();
        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets[0].begin, 0);
        let mut covered = 0;
        for window in offsets.windows(2) {
            assert_eq!(window[0].end, window[1].begin);
        }
        for offset in offsets {
            covered += offset.end - offset.begin;
        }
        assert_eq!(covered, sg.items().len());
    }
}
