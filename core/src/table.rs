use crate::geometry::{Point, TableGeometry};

pub type Pocket = Point;

pub const STANDARD_POCKET_FRACTIONS: [(f64, f64); 6] = [
    (0.05, 0.05),
    (0.5, 0.03),
    (0.95, 0.05),
    (0.05, 0.95),
    (0.5, 0.97),
    (0.95, 0.95),
];

pub const DENSE_POCKET_FRACTIONS: [(f64, f64); 10] = [
    (0.05, 0.05),
    (0.33, 0.03),
    (0.66, 0.03),
    (0.95, 0.05),
    (0.03, 0.5),
    (0.97, 0.5),
    (0.05, 0.95),
    (0.33, 0.97),
    (0.66, 0.97),
    (0.95, 0.95),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PocketLayout {
    /// Six pockets of a regular table.
    #[default]
    Standard,
    /// Ten aiming points used by manual mode.
    Dense,
}

impl PocketLayout {
    pub fn fractions(self) -> &'static [(f64, f64)] {
        match self {
            PocketLayout::Standard => &STANDARD_POCKET_FRACTIONS,
            PocketLayout::Dense => &DENSE_POCKET_FRACTIONS,
        }
    }

    pub fn pocket_count(self) -> usize {
        self.fractions().len()
    }
}

pub fn build_pockets(geometry: &TableGeometry, layout: PocketLayout) -> Vec<Pocket> {
    layout
        .fractions()
        .iter()
        .map(|(fx, fy)| geometry.at_fraction(*fx, *fy))
        .collect()
}

/// Table rectangle plus the pockets derived from it. Pockets are never edited in place:
/// every geometry or layout change replaces the whole sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct TableModel {
    geometry: TableGeometry,
    layout: PocketLayout,
    pockets: Vec<Pocket>,
}

impl TableModel {
    pub fn new(geometry: TableGeometry, layout: PocketLayout) -> Self {
        Self {
            geometry,
            layout,
            pockets: build_pockets(&geometry, layout),
        }
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> PocketLayout {
        self.layout
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Returns whether the geometry differed from the previous one.
    pub fn rebuild(&mut self, geometry: TableGeometry) -> bool {
        let changed = self.geometry != geometry;
        self.geometry = geometry;
        self.pockets = build_pockets(&self.geometry, self.layout);
        changed
    }

    pub fn set_layout(&mut self, layout: PocketLayout) {
        self.layout = layout;
        self.pockets = build_pockets(&self.geometry, self.layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({x}, {y}) got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn rebuild_replaces_every_pocket() {
        let mut model = TableModel::new(
            TableGeometry::new(0.0, 0.0, 100.0, 100.0),
            PocketLayout::Standard,
        );
        assert!(model.rebuild(TableGeometry::new(10.0, 10.0, 200.0, 100.0)));
        assert_point(model.pockets()[0], 20.0, 15.0);
        assert!(!model.rebuild(TableGeometry::new(10.0, 10.0, 200.0, 100.0)));
    }

    #[test]
    fn layout_switch_changes_count() {
        let mut model = TableModel::new(
            TableGeometry::new(0.0, 0.0, 100.0, 100.0),
            PocketLayout::Standard,
        );
        model.set_layout(PocketLayout::Dense);
        assert_eq!(model.pockets().len(), PocketLayout::Dense.pocket_count());
        assert_point(model.pockets()[4], 3.0, 50.0);
    }

    #[test]
    fn pockets_stay_inside_any_table() {
        let geometries = [
            TableGeometry::new(0.0, 0.0, 800.0, 600.0),
            TableGeometry::new(100.0, 50.0, 800.0, 600.0),
            TableGeometry::new(-40.0, 25.0, 1234.0, 321.0),
            TableGeometry::new(7.5, 300.0, 200.0, 900.0),
            TableGeometry::new(3.0, 3.0, 1.0, 1.0),
        ];
        for geometry in geometries {
            for (layout, count) in [(PocketLayout::Standard, 6), (PocketLayout::Dense, 10)] {
                let pockets = build_pockets(&geometry, layout);
                assert_eq!(pockets.len(), count, "{layout:?} on {geometry:?}");
                for pocket in &pockets {
                    assert!(
                        geometry.contains(*pocket),
                        "{pocket:?} outside {geometry:?} ({layout:?})"
                    );
                }
            }
        }
    }
}
