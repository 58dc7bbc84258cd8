use std::collections::HashSet;

use path_defence_core::{CellCoord, Command, Event, PlacementRejection, TowerKind};
use path_defence_world::{
    self as world, query, route_is_open, validate_placement, World, WorldConfig,
};

fn rich_world() -> World {
    World::new(WorldConfig {
        starting_money: 1_000_000,
        ..WorldConfig::default()
    })
    .expect("default grid is valid")
}

fn every_cell(world: &World) -> Vec<CellCoord> {
    let (columns, rows) = query::dimensions(world);
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .collect()
}

#[test]
fn filling_the_grid_never_severs_the_route() {
    let mut world = rich_world();
    let path: HashSet<CellCoord> = query::path_cells(&world).iter().copied().collect();
    let mut events = Vec::new();
    let mut placed = 0;

    for cell in every_cell(&world) {
        events.clear();
        let position = query::cell_center(&world, cell);
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position,
            },
            &mut events,
        );

        if path.contains(&cell) {
            assert_eq!(
                events,
                vec![Event::TowerPlacementRejected {
                    kind: TowerKind::Basic,
                    reason: PlacementRejection::OnPath,
                }]
            );
            assert!(!query::occupancy(&world).is_obstacle(cell));
        } else if events.contains(&Event::TowerPlaced) {
            assert!(query::occupancy(&world).is_obstacle(cell));
            placed += 1;
        }
        assert!(route_is_open(&mut world), "route closed after {cell}");
    }

    assert_eq!(query::tower_count(&world), placed);
    assert!(placed > 0);
}

#[test]
fn validation_leaves_obstacles_untouched() {
    let mut world = rich_world();
    let mut events = Vec::new();
    let anchor = query::cell_center(&world, CellCoord::new(2, 6));
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Cannon,
            position: anchor,
        },
        &mut events,
    );
    assert!(events.contains(&Event::TowerPlaced));

    let before: HashSet<CellCoord> = query::occupancy(&world).obstacles().clone();
    let money = query::defender(&world).money;

    for cell in every_cell(&world) {
        let position = query::cell_center(&world, cell);
        let _ = validate_placement(&mut world, position);
    }

    assert_eq!(query::occupancy(&world).obstacles(), &before);
    assert_eq!(query::defender(&world).money, money);
    assert_eq!(query::tower_count(&world), 1);
}

#[test]
fn validation_reports_the_same_reasons_as_placement() {
    let mut world = rich_world();
    let start = query::cell_center(&world, query::start_cell(&world));
    assert_eq!(
        validate_placement(&mut world, start),
        Err(PlacementRejection::OnPath)
    );

    let outside = query::cell_center(&world, CellCoord::new(0, 0)) - glam::Vec3::new(5.0, 0.0, 0.0);
    assert_eq!(
        validate_placement(&mut world, outside),
        Err(PlacementRejection::OutOfBounds)
    );

    let cell = CellCoord::new(2, 6);
    let position = query::cell_center(&world, cell);
    assert_eq!(validate_placement(&mut world, position), Ok(cell));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position,
        },
        &mut events,
    );
    assert_eq!(
        validate_placement(&mut world, position),
        Err(PlacementRejection::Occupied)
    );
}
