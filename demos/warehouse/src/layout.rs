//! Synthetic picking floor used by the demo.
//!
//! ```text
//!   y=0   ....................   cross aisle, dock row
//!   y=2   ..##..##..##..##....
//!    ⋮    ..##..##..##..##....   four shelf racks, two cells deep
//!   y=9   ..##..##..##..##....
//!   y=11  ....................   cross aisle
//! ```

use wp_core::Pos;
use wp_grid::{GridGraph, GridGraphBuilder, GridResult};

pub const WIDTH:  i32 = 20;
pub const HEIGHT: i32 = 12;

/// Shared packing station every picker starts from and returns to.
pub const DEPOT: Pos = Pos { x: 0, y: 0 };

/// Pick faces next to the racks.
pub const PICKS: [(i32, i32); 12] = [
    (4, 3), (5, 8), (8, 5), (9, 2), (12, 7), (13, 4),
    (16, 3), (17, 9), (1, 6), (18, 6), (4, 10), (12, 1),
];

/// Dock cells on the top cross aisle, used as order origins.
pub const DOCKS: [(i32, i32); 6] = [(0, 0), (3, 0), (7, 0), (11, 0), (15, 0), (19, 0)];

pub fn build_warehouse() -> GridResult<GridGraph> {
    let mut b = GridGraphBuilder::new(WIDTH, HEIGHT);
    for rack_x in [2, 6, 10, 14] {
        b.add_rect_obstacle(rack_x, 2, rack_x + 1, 9);
    }
    b.build()
}

/// Depot first, then every pick face.
pub fn waypoints() -> Vec<Pos> {
    std::iter::once(DEPOT).chain(PICKS.iter().map(|&p| p.into())).collect()
}
