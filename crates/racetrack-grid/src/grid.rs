//! The position × velocity state grid.
//!
//! States are stored in one flat `Vec`, position-major: all velocity
//! substates of an `(x, y)` cell are contiguous, which is what lets
//! [`Grid::visit_by_position`] hand out plain slices.

use indexmap::IndexMap;
use racetrack_core::{AtomicScalar, CellType, StateId, StateKey};

use crate::config::{GridConfig, GridConfigError, RewardConfig, VelocityRange};
use crate::track::Track;

// ── State ──────────────────────────────────────────────────────────

/// One `(x, y, vx, vy)` state and its value estimate.
#[derive(Debug)]
pub struct State {
    id: StateId,
    key: StateKey,
    cell: CellType,
    value: AtomicScalar,
}

impl State {
    /// This state's index in its grid.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Position and velocity.
    pub fn key(&self) -> StateKey {
        self.key
    }

    /// Cell type of the state's position.
    pub fn cell(&self) -> CellType {
        self.cell
    }

    /// The value estimate cell.
    pub fn value(&self) -> &AtomicScalar {
        &self.value
    }

    /// Whether an episode ends here.
    pub fn is_terminal(&self) -> bool {
        self.cell.is_terminal()
    }
}

// ── PositionView ───────────────────────────────────────────────────

/// All velocity substates sharing one `(x, y)` position.
#[derive(Clone, Copy, Debug)]
pub struct PositionView<'a> {
    /// Column.
    pub x: i32,
    /// Row, counted from the bottom.
    pub y: i32,
    /// Cell type shared by every state in the group.
    pub cell: CellType,
    /// The substates, ordered by `vx` then `vy`.
    pub states: &'a [State],
}

impl<'a> PositionView<'a> {
    /// Highest-valued non-stationary substate.
    pub fn max_value_state(&self) -> Option<&'a State> {
        max_value_state(self.states)
    }
}

/// Highest-valued state in `group`, ignoring zero-velocity substates.
///
/// Ties go to the earliest state in the slice. `None` when every state is
/// stationary or the slice is empty.
pub fn max_value_state(group: &[State]) -> Option<&State> {
    let mut best: Option<(&State, f64)> = None;
    for state in group.iter().filter(|s| !s.key.is_stationary()) {
        let v = state.value.read();
        match best {
            Some((_, best_v)) if v <= best_v => {}
            _ => best = Some((state, v)),
        }
    }
    best.map(|(s, _)| s)
}

// ── Grid ───────────────────────────────────────────────────────────

/// The full state space for one track, built once and never resized.
///
/// Shared behind an `Arc` by every worker and the estimator. Structure is
/// immutable; only the per-state [`AtomicScalar`] values change.
#[derive(Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    velocity: VelocityRange,
    rewards: RewardConfig,
    /// Indexed by `x * height + y`.
    cells: Vec<CellType>,
    states: Vec<State>,
    by_type: IndexMap<CellType, Vec<StateId>>,
}

// Compile-time assertion: Grid must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Grid>();
};

impl Grid {
    /// Expand `track` into every `(x, y, vx, vy)` state.
    ///
    /// Each state gets a fresh value cell seeded with
    /// `config.initial_value`. Fails on an invalid `config`, a track
    /// dimension beyond `i32`, or a state space too large for [`StateId`].
    pub fn build(track: &Track, config: &GridConfig) -> Result<Self, GridConfigError> {
        config.validate()?;

        let velocity = config.velocity;
        let count = state_count(track.width(), track.height(), velocity.span())?;
        // Both fit in i32 once `state_count` accepts them.
        let width = track.width() as i32;
        let height = track.height() as i32;

        let mut cells = Vec::with_capacity(track.width() * track.height());
        let mut states = Vec::with_capacity(count);
        let mut by_type: IndexMap<CellType, Vec<StateId>> =
            CellType::ALL.iter().map(|&c| (c, Vec::new())).collect();

        for x in 0..width {
            for (y, cell) in (0..height).zip(track.column(x as usize)) {
                cells.push(cell);
                for vx in velocity.values() {
                    for vy in velocity.values() {
                        let id = StateId(states.len() as u32);
                        by_type.entry(cell).or_default().push(id);
                        states.push(State {
                            id,
                            key: StateKey::new(x, y, vx, vy),
                            cell,
                            value: AtomicScalar::new(config.initial_value),
                        });
                    }
                }
            }
        }

        Ok(Self {
            width,
            height,
            velocity,
            rewards: config.rewards,
            cells,
            states,
            by_type,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Velocity component bounds.
    pub fn velocity_range(&self) -> VelocityRange {
        self.velocity
    }

    /// Transition rewards.
    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    /// Total number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the grid has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether `(x, y)` lies on the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Cell type at `(x, y)`, or `None` off the grid.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<CellType> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[self.position(x, y)])
    }

    /// The state with the given id.
    ///
    /// # Panics
    ///
    /// If `id` was not issued by this grid.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    /// Id of the state at `key`, or `None` if any component is out of range.
    pub fn id_of(&self, key: StateKey) -> Option<StateId> {
        if !self.in_bounds(key.x, key.y)
            || !self.velocity.contains(key.vx)
            || !self.velocity.contains(key.vy)
        {
            return None;
        }
        Some(self.index(key))
    }

    /// The state at `key`, or `None` if any component is out of range.
    pub fn get(&self, key: StateKey) -> Option<&State> {
        self.id_of(key).map(|id| self.state(id))
    }

    /// Index of an in-range `(x, y)` into `cells`.
    fn position(&self, x: i32, y: i32) -> usize {
        x as usize * self.height as usize + y as usize
    }

    /// Flat index for an in-range key.
    pub(crate) fn index(&self, key: StateKey) -> StateId {
        debug_assert!(self.in_bounds(key.x, key.y), "position out of range: {key}");
        let span = self.velocity.span();
        let position = self.position(key.x, key.y);
        let vx = (key.vx - self.velocity.min) as usize;
        let vy = (key.vy - self.velocity.min) as usize;
        StateId(((position * span + vx) * span + vy) as u32)
    }

    /// Call `f` on every state.
    pub fn visit_all(&self, mut f: impl FnMut(&State)) {
        for state in &self.states {
            f(state);
        }
    }

    /// Call `f` once per `(x, y)` position with all of its velocity
    /// substates.
    pub fn visit_by_position(&self, mut f: impl FnMut(PositionView<'_>)) {
        let group = self.velocity.span() * self.velocity.span();
        let height = self.height as usize;
        for (i, states) in self.states.chunks(group).enumerate() {
            f(PositionView {
                x: (i / height) as i32,
                y: (i % height) as i32,
                cell: self.cells[i],
                states,
            });
        }
    }

    /// Highest-valued non-stationary substate at `(x, y)`.
    pub fn max_value_state(&self, x: i32, y: i32) -> Option<&State> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let group = self.velocity.span() * self.velocity.span();
        let start = self.position(x, y) * group;
        max_value_state(&self.states[start..start + group])
    }

    /// Ids of every state whose position has the given cell type.
    pub fn states_of_type(&self, cell: CellType) -> &[StateId] {
        self.by_type.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Read every value estimate, in state id order.
    ///
    /// Each read is torn-free; the collection as a whole is not a
    /// consistent cut while training is running.
    pub fn values(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.value.read()).collect()
    }
}

/// Number of states for a `width` × `height` track with `span` velocity
/// values per axis.
///
/// Rejects dimensions that do not fit an `i32` coordinate and totals that
/// do not fit a `u32` id. Every position index is then below the total, so
/// `usize` index arithmetic on an accepted grid cannot overflow.
fn state_count(width: usize, height: usize, span: usize) -> Result<usize, GridConfigError> {
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(GridConfigError::TrackTooLarge { width, height });
    }
    let count = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(span))
        .and_then(|n| n.checked_mul(span));
    match count {
        Some(count) if count <= u32::MAX as usize => Ok(count),
        Some(count) => Err(GridConfigError::TooManyStates { count }),
        None => Err(GridConfigError::TooManyStates { count: usize::MAX }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: [&str; 8] = [
        "WWWWWW", "Woooo+", "Woooo+", "WooWWW", "WooWWW", "WooWWW", "WooWWW", "W--WWW",
    ];

    fn grid() -> Grid {
        let track = Track::parse(&LAYOUT).unwrap();
        Grid::build(&track, &GridConfig::default()).unwrap()
    }

    #[test]
    fn dimensions_and_state_count() {
        let g = grid();
        assert_eq!(g.width(), 6);
        assert_eq!(g.height(), 8);
        assert_eq!(g.len(), 6 * 8 * 25);
        assert!(!g.is_empty());
    }

    #[test]
    fn first_layout_row_is_highest_y() {
        let g = grid();
        assert_eq!(g.cell_at(0, 7), Some(CellType::Wall));
        assert_eq!(g.cell_at(5, 6), Some(CellType::Finish));
        assert_eq!(g.cell_at(5, 5), Some(CellType::Finish));
        assert_eq!(g.cell_at(1, 0), Some(CellType::Start));
        assert_eq!(g.cell_at(2, 0), Some(CellType::Start));
        assert_eq!(g.cell_at(3, 0), Some(CellType::Wall));
        assert_eq!(g.cell_at(6, 0), None);
        assert_eq!(g.cell_at(0, -1), None);
    }

    #[test]
    fn every_state_seeded_with_initial_value() {
        let g = grid();
        let mut n = 0;
        g.visit_all(|s| {
            assert_eq!(s.value().read(), -100.0);
            n += 1;
        });
        assert_eq!(n, g.len());
    }

    #[test]
    fn ids_and_keys_agree() {
        let g = grid();
        g.visit_all(|s| {
            assert_eq!(g.id_of(s.key()), Some(s.id()));
            assert_eq!(g.state(s.id()).key(), s.key());
            assert_eq!(Some(s.cell()), g.cell_at(s.key().x, s.key().y));
        });
        assert_eq!(g.id_of(StateKey::new(1, 1, 5, 0)), None);
        assert_eq!(g.id_of(StateKey::new(1, 1, -1, 0)), None);
        assert_eq!(g.id_of(StateKey::new(6, 1, 0, 0)), None);
    }

    #[test]
    fn states_of_type_cover_every_velocity() {
        let g = grid();
        assert_eq!(g.states_of_type(CellType::Start).len(), 2 * 25);
        assert_eq!(g.states_of_type(CellType::Finish).len(), 2 * 25);
        let total: usize = CellType::ALL
            .iter()
            .map(|&c| g.states_of_type(c).len())
            .sum();
        assert_eq!(total, g.len());
        for &id in g.states_of_type(CellType::Start) {
            assert_eq!(g.state(id).cell(), CellType::Start);
        }
    }

    #[test]
    fn visit_by_position_groups_velocities() {
        let g = grid();
        let mut positions = 0;
        g.visit_by_position(|view| {
            positions += 1;
            assert_eq!(view.states.len(), 25);
            assert_eq!(Some(view.cell), g.cell_at(view.x, view.y));
            for s in view.states {
                assert_eq!((s.key().x, s.key().y), (view.x, view.y));
            }
        });
        assert_eq!(positions, 48);
    }

    #[test]
    fn max_value_state_skips_stationary() {
        let g = grid();
        let still = g.get(StateKey::new(1, 1, 0, 0)).unwrap();
        let moving = g.get(StateKey::new(1, 1, 2, 3)).unwrap();
        still.value().set(50.0);
        moving.value().set(10.0);

        let best = g.max_value_state(1, 1).unwrap();
        assert_eq!(best.key(), StateKey::new(1, 1, 2, 3));
        assert_eq!(g.max_value_state(9, 9).map(State::id), None);
    }

    #[test]
    fn max_value_state_ties_go_to_first() {
        let g = grid();
        // All equal at the initial value: first non-stationary is (0, 1).
        let best = g.max_value_state(2, 2).unwrap();
        assert_eq!(best.key(), StateKey::new(2, 2, 0, 1));
    }

    #[test]
    fn signed_velocity_range_layout() {
        let track = Track::parse(&LAYOUT).unwrap();
        let config = GridConfig {
            velocity: VelocityRange::SIGNED,
            ..GridConfig::default()
        };
        let g = Grid::build(&track, &config).unwrap();
        assert_eq!(g.len(), 6 * 8 * 81);
        g.visit_all(|s| assert_eq!(g.id_of(s.key()), Some(s.id())));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let track = Track::parse(&LAYOUT).unwrap();
        let config = GridConfig {
            velocity: VelocityRange { min: 2, max: 1 },
            ..GridConfig::default()
        };
        assert!(Grid::build(&track, &config).is_err());
    }

    #[test]
    fn cells_match_track_layout() {
        let track = Track::parse(&LAYOUT).unwrap();
        let g = grid();
        for x in 0..track.width() {
            for y in 0..track.height() {
                assert_eq!(g.cell_at(x as i32, y as i32), track.cell(x, y));
            }
        }
        g.visit_all(|s| {
            let key = s.key();
            assert_eq!(Some(s.cell()), track.cell(key.x as usize, key.y as usize));
        });
    }

    #[test]
    fn state_count_bounds_dimensions_and_total() {
        assert_eq!(state_count(6, 8, 5), Ok(6 * 8 * 25));
        // Fits a u32 total but not i32 coordinates.
        let wide = i32::MAX as usize + 1;
        assert_eq!(
            state_count(wide, 1, 1),
            Err(GridConfigError::TrackTooLarge {
                width: wide,
                height: 1
            })
        );
        assert_eq!(
            state_count(70_000, 70_000, 1),
            Err(GridConfigError::TooManyStates {
                count: 4_900_000_000
            })
        );
        assert_eq!(
            state_count(i32::MAX as usize, i32::MAX as usize, usize::MAX),
            Err(GridConfigError::TooManyStates { count: usize::MAX })
        );
    }

    #[test]
    fn values_snapshot_matches_reads() {
        let g = grid();
        let id = g.id_of(StateKey::new(2, 3, 1, 1)).unwrap();
        g.state(id).value().set(-7.0);
        let values = g.values();
        assert_eq!(values.len(), g.len());
        assert_eq!(values[id.index()], -7.0);
    }
}
