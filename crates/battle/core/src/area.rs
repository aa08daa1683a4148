//! Targeting geometry.
//!
//! An [`Area`] maps a target point to the tiles a skill touches. Shapes are
//! pure functions of the grid; the optional [`Sieve`] post-filters the shape
//! by tile contents, and the optional reach sieve vetoes the whole query when
//! the target tile itself fails it.

use crate::state::{BattleState, Entity, EntityId, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    SingleTarget,
    /// Every tile with `dx² + dy² <= radius²`.
    Circle { radius: i32 },
    /// Bresenham line from `origin` (the caster when `None`) to the target.
    Line { origin: Option<Position> },
    /// Arc sampled from `origin` (the caster when `None`) toward the target.
    /// All-or-nothing: any sample off the grid empties the result.
    Arc {
        origin: Option<Position>,
        angle: i32,
        ratio_y: i32,
        steps: i32,
    },
    AllBattleground,
    Custom(Vec<Position>),
}

/// Tile predicate evaluated against the casting general.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Sieve {
    Adjacent,
    Ally,
    AllyGeneral,
    AllyMinion,
    Empty,
    Enemy,
    EnemyGeneral,
    InRangeClose,
    InRangeLong,
    Minion,
    Unit,
}

impl Sieve {
    pub const CLOSE_RANGE: i32 = 8;
    pub const LONG_RANGE: i32 = 20;

    /// Whether `position` passes for `caster`. Every sieve except
    /// [`Sieve::Empty`] fails without a caster.
    pub fn accepts(self, state: &BattleState, caster: Option<&Entity>, position: Position) -> bool {
        let occupant = state.occupant(position);
        if self == Sieve::Empty {
            return occupant.is_none();
        }
        let Some(caster) = caster else {
            return false;
        };

        match self {
            Sieve::Adjacent => caster.position.chebyshev(position) <= 1,
            Sieve::Ally => occupant.is_some_and(|entity| entity.is_ally(caster)),
            Sieve::AllyGeneral => occupant.is_some_and(|entity| entity.id == caster.id),
            Sieve::AllyMinion => occupant
                .is_some_and(|entity| state.is_minion(entity.id) && entity.is_ally(caster)),
            Sieve::Enemy => occupant.is_some_and(|entity| !entity.is_ally(caster)),
            Sieve::EnemyGeneral => {
                let enemy = state.general_id(caster.side.opponent());
                occupant.is_some_and(|entity| Some(entity.id) == enemy)
            }
            Sieve::InRangeClose => in_circle(caster.position, position, Self::CLOSE_RANGE),
            Sieve::InRangeLong => in_circle(caster.position, position, Self::LONG_RANGE),
            Sieve::Minion => occupant.is_some_and(|entity| state.is_minion(entity.id)),
            Sieve::Unit => occupant.is_some_and(|entity| state.is_unit(entity.id)),
            Sieve::Empty => occupant.is_none(),
        }
    }
}

fn in_circle(center: Position, position: Position, radius: i32) -> bool {
    let dx = position.x - center.x;
    let dy = position.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub shape: Shape,
    pub sieve: Option<Sieve>,
    pub reach: Option<Sieve>,
    /// Ignore the requested target and use the caster's position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub self_centered: bool,
}

impl Area {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            sieve: None,
            reach: None,
            self_centered: false,
        }
    }

    pub fn single_target() -> Self {
        Self::new(Shape::SingleTarget)
    }

    pub fn circle(radius: i32) -> Self {
        Self::new(Shape::Circle { radius })
    }

    pub fn line_from(origin: Position) -> Self {
        Self::new(Shape::Line {
            origin: Some(origin),
        })
    }

    pub fn all_battleground() -> Self {
        Self::new(Shape::AllBattleground)
    }

    #[must_use]
    pub fn with_sieve(mut self, sieve: Sieve) -> Self {
        self.sieve = Some(sieve);
        self
    }

    #[must_use]
    pub fn with_reach(mut self, reach: Sieve) -> Self {
        self.reach = Some(reach);
        self
    }

    #[must_use]
    pub fn self_centered(mut self) -> Self {
        self.self_centered = true;
        self
    }

    /// Tiles affected when `caster` targets `target`.
    pub fn tiles(&self, state: &BattleState, caster: Option<EntityId>, target: Position) -> Vec<Position> {
        let caster = caster.and_then(|id| state.entity(id));
        let target = match caster {
            Some(entity) if self.self_centered => entity.position,
            _ => target,
        };

        if let Some(reach) = self.reach
            && state.grid.is_inside(target)
            && !reach.accepts(state, caster, target)
        {
            return Vec::new();
        }

        let origin_of = |origin: Option<Position>| {
            origin
                .or(caster.map(|entity| entity.position))
                .unwrap_or(Position::ORIGIN)
        };
        let mut tiles = match &self.shape {
            Shape::SingleTarget => single_target(state, target),
            Shape::Circle { radius } => circle(state, target, *radius),
            Shape::Line { origin } => line(state, origin_of(*origin), target),
            Shape::Arc {
                origin,
                angle,
                ratio_y,
                steps,
            } => arc(state, origin_of(*origin), target, *angle, *ratio_y, *steps),
            Shape::AllBattleground => state.grid.positions().collect(),
            Shape::Custom(tiles) => tiles.clone(),
        };

        if let Some(sieve) = self.sieve {
            tiles.retain(|position| sieve.accepts(state, caster, *position));
        }
        tiles
    }
}

fn single_target(state: &BattleState, target: Position) -> Vec<Position> {
    if state.grid.is_inside(target) {
        vec![target]
    } else {
        Vec::new()
    }
}

pub(crate) fn circle(state: &BattleState, center: Position, radius: i32) -> Vec<Position> {
    let mut tiles = Vec::new();
    for a in (center.x - radius)..=(center.x + radius) {
        for b in (center.y - radius)..=(center.y + radius) {
            let position = Position::new(a, b);
            if state.grid.is_inside(position) && in_circle(center, position, radius) {
                tiles.push(position);
            }
        }
    }
    tiles
}

/// Integer Bresenham from `from` to `to`, both ends included, clipped to the grid.
pub(crate) fn line(state: &BattleState, from: Position, to: Position) -> Vec<Position> {
    let (mut x1, mut y1, mut x2, mut y2) = (from.x, from.y, to.x, to.y);
    let steep = (y2 - y1).abs() > (x2 - x1).abs();
    if steep {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
    }
    let reversed = x1 > x2;
    if reversed {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }

    let delta_x = x2 - x1;
    let delta_y = (y2 - y1).abs();
    let mut error = delta_x / 2;
    let y_step = if y1 < y2 { 1 } else { -1 };
    let mut y = y1;

    let mut points = Vec::new();
    for x in x1..=x2 {
        let point = if steep {
            Position::new(y, x)
        } else {
            Position::new(x, y)
        };
        if state.grid.is_inside(point) {
            points.push(point);
        }
        error -= delta_y;
        if error < 0 {
            y += y_step;
            error += delta_x;
        }
    }

    if reversed {
        points.reverse();
    }
    points
}

fn arc(
    state: &BattleState,
    origin: Position,
    target: Position,
    angle: i32,
    ratio_y: i32,
    steps: i32,
) -> Vec<Position> {
    if !state.grid.is_inside(target) || steps <= 0 {
        return Vec::new();
    }

    let center_x = f64::from(origin.x + target.x) / 2.0;
    let center_y = f64::from(origin.y);
    let radius = f64::from((origin.x - target.x).abs()) / 2.0;
    let direction = if origin.x - target.x < 0 { -1.0 } else { 1.0 };
    let start = f64::from(angle).to_radians();
    let step = start / f64::from(steps);
    let sample = |theta: f64| {
        Position::new(
            (center_x + theta.cos() * radius * direction).round_ties_even() as i32,
            (center_y + theta.sin() * radius * f64::from(ratio_y)).round_ties_even() as i32,
        )
    };

    let mut tiles = Vec::new();
    let first = sample(start);
    if state.grid.is_inside(first) {
        tiles.push(first);
    }
    for i in 1..=steps {
        let point = sample(start + f64::from(i) * step);
        if !state.grid.is_inside(point) {
            return Vec::new();
        }
        if !tiles.contains(&point) {
            tiles.push(point);
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Battleground;

    fn open_state(width: i32, height: i32) -> BattleState {
        BattleState::new(Battleground::open(width, height))
    }

    #[test]
    fn horizontal_line_includes_both_ends_in_order() {
        let state = open_state(10, 10);
        let tiles = Area::line_from(Position::new(0, 0)).tiles(&state, None, Position::new(5, 0));
        let expected: Vec<_> = (0..=5).map(|x| Position::new(x, 0)).collect();
        assert_eq!(tiles, expected);
    }

    #[test]
    fn steep_line_walks_the_y_axis() {
        let state = open_state(10, 10);
        let tiles = line(&state, Position::new(1, 0), Position::new(2, 4));
        assert_eq!(tiles.len(), 5);
        assert_eq!(tiles.first(), Some(&Position::new(1, 0)));
        assert_eq!(tiles.last(), Some(&Position::new(2, 4)));
        assert!(tiles.windows(2).all(|pair| pair[1].y == pair[0].y + 1));
    }

    #[test]
    fn reversed_line_keeps_origin_first() {
        let state = open_state(10, 10);
        let tiles = line(&state, Position::new(4, 2), Position::new(0, 0));
        assert_eq!(tiles.first(), Some(&Position::new(4, 2)));
        assert_eq!(tiles.last(), Some(&Position::new(0, 0)));
    }

    #[test]
    fn circle_is_euclidean_and_clipped() {
        let state = open_state(10, 10);
        let tiles = circle(&state, Position::new(5, 5), 1);
        assert_eq!(tiles.len(), 5);
        assert!(!tiles.contains(&Position::new(6, 6)));

        let corner = circle(&state, Position::new(0, 0), 2);
        assert!(corner.iter().all(|p| p.x >= 0 && p.y >= 0));
        assert_eq!(corner.len(), 6);
    }

    #[test]
    fn single_target_off_grid_is_empty() {
        let state = open_state(4, 4);
        assert!(Area::single_target().tiles(&state, None, Position::new(4, 0)).is_empty());
        assert_eq!(
            Area::single_target().tiles(&state, None, Position::new(3, 3)),
            vec![Position::new(3, 3)]
        );
    }

    #[test]
    fn arc_is_all_or_nothing() {
        let state = open_state(20, 20);
        let shape = Shape::Arc {
            origin: Some(Position::new(2, 10)),
            angle: 180,
            ratio_y: 1,
            steps: 20,
        };
        let tiles = Area::new(shape.clone()).tiles(&state, None, Position::new(12, 10));
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|p| state.grid.is_inside(*p)));

        let clipped = Area::new(Shape::Arc {
            origin: Some(Position::new(2, 1)),
            angle: 180,
            ratio_y: 3,
            steps: 20,
        })
        .tiles(&state, None, Position::new(12, 1));
        assert!(clipped.is_empty());
    }

    #[test]
    fn empty_sieve_needs_no_caster() {
        let state = open_state(3, 3);
        let tiles = Area::all_battleground()
            .with_sieve(Sieve::Empty)
            .tiles(&state, None, Position::NOWHERE);
        assert_eq!(tiles.len(), 9);
        let none = Area::all_battleground()
            .with_sieve(Sieve::Ally)
            .tiles(&state, None, Position::NOWHERE);
        assert!(none.is_empty());
    }
}
