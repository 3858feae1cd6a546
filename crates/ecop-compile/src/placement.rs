//! Glue between the compiler's view of the sheet and the grid placer.

use std::collections::BTreeMap;

use ecop_autoplace::{GridPlacer, OccupiedComponent, PartToPlace};
use ecop_sch::{Catalog, Placement, Snapshot, SnapshotComponent};

/// Catalog kind for a part id, if the part declares one.
fn catalog_kind<'c>(catalog: &'c Catalog, part_id: Option<&str>) -> Option<&'c str> {
    part_id
        .and_then(|id| catalog.lookup(id))
        .and_then(|part| part.kind.as_deref())
}

fn snapshot_obstacle(
    component: &SnapshotComponent,
    placement: &Placement,
    catalog: &Catalog,
) -> OccupiedComponent {
    let kind = component
        .extra_str("kind")
        .or_else(|| catalog_kind(catalog, component.part_id.as_deref()));
    OccupiedComponent {
        width: component.extra_f64("width"),
        height: component.extra_f64("height"),
        ..OccupiedComponent::new(&component.refdes, placement.x, placement.y, kind)
    }
}

/// Everything that already has a position once the explicit placements of
/// this edit are applied.
///
/// Snapshot components come first in snapshot order, with an explicit
/// placement overriding the snapshot position. Explicitly placed components
/// that are not in the snapshot follow in `explicit` order and are sized from
/// the catalog kind of their part.
pub fn sheet_obstacles(
    catalog: &Catalog,
    snapshot: Option<&Snapshot>,
    explicit: &[(&str, Placement)],
    part_ids: &BTreeMap<&str, &str>,
) -> Vec<OccupiedComponent> {
    let explicit_for = |refdes: &str| {
        explicit
            .iter()
            .find(|(r, _)| *r == refdes)
            .map(|(_, placement)| placement)
    };

    let mut obstacles = Vec::new();
    if let Some(snapshot) = snapshot {
        for component in &snapshot.components {
            let placement = explicit_for(&component.refdes).or(component.placement.as_ref());
            if let Some(placement) = placement {
                obstacles.push(snapshot_obstacle(component, placement, catalog));
            }
        }
    }

    for (refdes, placement) in explicit {
        if snapshot.is_some_and(|s| s.component(refdes).is_some()) {
            continue;
        }
        let kind = catalog_kind(catalog, part_ids.get(refdes).copied());
        obstacles.push(OccupiedComponent::new(*refdes, placement.x, placement.y, kind));
    }

    obstacles
}

/// Auto-place `pending` new components, given as `(refdes, part_id)` in add
/// order, around `obstacles`.
pub fn auto_place(
    placer: &GridPlacer,
    catalog: &Catalog,
    pending: &[(&str, &str)],
    obstacles: &[OccupiedComponent],
) -> BTreeMap<String, Placement> {
    let parts: Vec<PartToPlace> = pending
        .iter()
        .map(|&(refdes, part_id)| PartToPlace::new(refdes, catalog_kind(catalog, Some(part_id))))
        .collect();
    placer.place_all(&parts, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecop_sch::Part;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_parts([Part {
            id: "mcu_qfn32".into(),
            pins: vec!["VDD".into(), "GND".into()],
            allows_value: false,
            add_directive: "ADD 'mcu_qfn32' U".into(),
            kind: Some("mcu".into()),
        }])
    }

    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "components": [
                {"refdes": "U1", "part_id": "mcu_qfn32", "placement": {"x": 0.0, "y": 0.0}},
                {"refdes": "J1", "kind": "connector", "width": 80.0, "height": 30.0,
                 "placement": {"x": 100.0, "y": 0.0}},
                {"refdes": "TP1"}
            ],
            "nets": []
        }))
        .unwrap()
    }

    #[test]
    fn test_snapshot_obstacles_use_extras_then_catalog() {
        let snapshot = snapshot();
        let obstacles = sheet_obstacles(&catalog(), Some(&snapshot), &[], &BTreeMap::new());

        assert_eq!(obstacles.len(), 2);
        assert_eq!(obstacles[0].refdes, "U1");
        assert_eq!(obstacles[0].kind.as_deref(), Some("mcu"));
        assert_eq!(obstacles[1].kind.as_deref(), Some("connector"));
        assert_eq!(obstacles[1].width, Some(80.0));
        assert_eq!(obstacles[1].height, Some(30.0));
    }

    #[test]
    fn test_explicit_placement_overrides_snapshot_position() {
        let snapshot = snapshot();
        let moved = Placement::new(300.0, 200.0);
        let fresh = Placement::new(40.0, 120.0);
        let part_ids = BTreeMap::from([("U2", "mcu_qfn32")]);

        let obstacles = sheet_obstacles(
            &catalog(),
            Some(&snapshot),
            &[("U1", moved), ("U2", fresh)],
            &part_ids,
        );

        let positions: Vec<(&str, f64, f64)> = obstacles
            .iter()
            .map(|o| (o.refdes.as_str(), o.x, o.y))
            .collect();
        assert_eq!(
            positions,
            [("U1", 300.0, 200.0), ("J1", 100.0, 0.0), ("U2", 40.0, 120.0)]
        );
        assert_eq!(obstacles[2].kind.as_deref(), Some("mcu"));
    }

    #[test]
    fn test_auto_place_right_of_obstacles() {
        let snapshot = snapshot();
        let catalog = catalog();
        let obstacles = sheet_obstacles(&catalog, Some(&snapshot), &[], &BTreeMap::new());
        let placed = auto_place(
            &GridPlacer::default(),
            &catalog,
            &[("U2", "mcu_qfn32")],
            &obstacles,
        );

        // J1 ends at 185 once padded; 185 + 60 snaps half-to-even down to 240.
        assert_eq!(placed["U2"], Placement::new(240.0, 0.0));
    }
}
