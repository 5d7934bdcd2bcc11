//! Room-and-corridor dungeon carver.
//!
//! A dungeon starts from one room placed somewhere in the grid (halo
//! included), then repeatedly sends a [`Walker`] through the open interior to
//! find a wall for a door, digs a corridor from it and hangs the next room
//! off the corridor end. Any failed search ends the dungeon quietly; whatever
//! was carved so far stays.

use crate::biome::Biome;
use crate::context::GenerationContext;
use crate::grid::{FlagField, GenFlags, VoxelArea, VoxelGrid};
use crate::noise::value_noise_3d;
use glam::IVec3;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace};
use voxgen_core::{scoped_rng, seed, seed::salt, ContentId, ContentKey, Voxel};

/// Dungeons start only in chunks whose coin flip exceeds this.
pub const DUNGEON_CHANCE_THRESHOLD: f64 = 0.6;
/// Random tries for the first room.
pub const FIRST_ROOM_TRIES: usize = 100;
/// Walker steps allowed per door search.
pub const WALK_STEPS: u32 = 100;
/// Door candidates tried when hanging a room off a corridor.
pub const ROOM_DOOR_TRIES: usize = 30;

/// Biomes whose chunks may hold dungeons.
pub fn biome_allows_dungeons(biome: Biome) -> bool {
    matches!(biome, Biome::Woodlands | Biome::Jungle | Biome::Desert)
}

/// Whether this chunk gets a dungeon at all.
pub fn dungeon_gate(ctx: &GenerationContext<'_>) -> bool {
    if ctx.limestone || !biome_allows_dungeons(ctx.biome) {
        return false;
    }
    let coin_seed = seed::lattice_seed(seed::channel_seed(ctx.seed, salt::DUNGEON_COIN));
    let pos = ctx.pos;
    if value_noise_3d(IVec3::new(pos.x, pos.y, pos.z), coin_seed) <= DUNGEON_CHANCE_THRESHOLD {
        return false;
    }
    ctx.node_max().y > ctx.heightmap.avg_height()
}

/// One of the four horizontal unit directions.
fn random_ortho_dir(rng: &mut StdRng) -> IVec3 {
    let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
    if rng.gen_bool(0.5) {
        IVec3::new(sign, 0, 0)
    } else {
        IVec3::new(0, 0, sign)
    }
}

/// Rotate a horizontal direction a quarter turn; `left` picks the sense.
pub fn turn_xz(dir: IVec3, left: bool) -> IVec3 {
    if left {
        IVec3::new(-dir.z, 0, dir.x)
    } else {
        IVec3::new(dir.z, 0, -dir.x)
    }
}

fn random_turn(rng: &mut StdRng, dir: IVec3) -> IVec3 {
    match rng.gen_range(0..3) {
        0 => dir,
        1 => turn_xz(dir, false),
        _ => turn_xz(dir, true),
    }
}

/// A wall spot where a door can be cut, and the direction it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub place: IVec3,
    pub dir: IVec3,
}

/// Random walker through open dungeon interior.
#[derive(Debug, Clone)]
pub struct Walker {
    pub pos: IVec3,
    pub dir: IVec3,
    rng: StdRng,
}

impl Walker {
    pub fn new(pos: IVec3, seed: u64) -> Self {
        let mut rng = scoped_rng(seed);
        let dir = random_ortho_dir(&mut rng);
        Self { pos, dir, rng }
    }

    fn randomize_dir(&mut self) {
        self.dir = random_ortho_dir(&mut self.rng);
    }

    /// Lazily search for door candidates from the current position.
    pub fn search<'w>(
        &'w mut self,
        grid: &'w VoxelGrid,
        cobble: ContentId,
        air: ContentId,
    ) -> DoorSearch<'w> {
        DoorSearch {
            walker: self,
            grid,
            cobble,
            air,
            exhausted: false,
        }
    }
}

/// Door candidates found by a [`Walker`].
///
/// Each candidate gets a fresh budget of [`WALK_STEPS`]; once a budget runs
/// out the search is over for good.
pub struct DoorSearch<'w> {
    walker: &'w mut Walker,
    grid: &'w VoxelGrid,
    cobble: ContentId,
    air: ContentId,
    exhausted: bool,
}

impl DoorSearch<'_> {
    #[inline]
    fn is(&self, p: IVec3, content: ContentId) -> bool {
        self.grid.content(p) == Some(content)
    }
}

impl Iterator for DoorSearch<'_> {
    type Item = Door;

    fn next(&mut self) -> Option<Door> {
        if self.exhausted {
            return None;
        }
        let area = *self.grid.area();
        for step in 0..WALK_STEPS {
            let mut p = self.walker.pos + self.walker.dir;
            let above = p + IVec3::Y;
            if !area.contains(p) || !area.contains(above) || step % 4 == 0 {
                self.walker.randomize_dir();
                continue;
            }
            // Two stacked cobble voxels, not cobble under open space: the
            // walker stands inside the room, so p and p+1 are the wall it faces.
            if self.is(p, self.cobble) && self.is(above, self.cobble) {
                let door = Door {
                    place: p,
                    dir: self.walker.dir,
                };
                self.walker.randomize_dir();
                return Some(door);
            }
            // Follow the floor one step up or down.
            if self.is(p, self.cobble)
                && self.is(p + IVec3::Y, self.air)
                && self.is(p + 2 * IVec3::Y, self.air)
            {
                p += IVec3::Y;
            }
            if self.is(p + IVec3::Y, self.cobble)
                && self.is(p, self.air)
                && self.is(p - IVec3::Y, self.air)
            {
                p -= IVec3::Y;
            }
            if !self.is(p, self.air) || !self.is(p + IVec3::Y, self.air) {
                self.walker.randomize_dir();
                continue;
            }
            self.walker.pos = p;
        }
        self.exhausted = true;
        None
    }
}

/// Where a room of `size` goes so that `door` opens into its side wall.
pub fn room_place_for_door(rng: &mut StdRng, door: Door, size: IVec3) -> IVec3 {
    let d = door.place;
    if door.dir.x != 0 {
        let z = rng.gen_range(-size.z + 2..=-2);
        let x = if door.dir.x > 0 { 0 } else { -size.x + 1 };
        d + IVec3::new(x, -1, z)
    } else {
        let x = rng.gen_range(-size.x + 2..=-2);
        let z = if door.dir.z > 0 { 0 } else { -size.z + 1 };
        d + IVec3::new(x, -1, z)
    }
}

/// Uniform corner for a room of `size` anywhere inside `area`, halo included.
pub fn first_room_place(rng: &mut StdRng, area: &VoxelArea, size: IVec3) -> Option<IVec3> {
    let span = area.extent() - size;
    if span.cmplt(IVec3::ZERO).any() {
        return None;
    }
    Some(
        area.min()
            + IVec3::new(
                rng.gen_range(0..=span.x),
                rng.gen_range(0..=span.y),
                rng.gen_range(0..=span.z),
            ),
    )
}

fn small_room_size(rng: &mut StdRng) -> IVec3 {
    IVec3::new(rng.gen_range(4..=8), rng.gen_range(4..=6), rng.gen_range(4..=8))
}

/// Counts of what one dungeon carved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DungeonReport {
    pub rooms: u32,
    pub corridors: u32,
    pub chests: u32,
    pub mossy: u32,
}

struct Carver<'c, 'a> {
    ctx: &'c mut GenerationContext<'a>,
    rng: StdRng,
    walker: Walker,
    cobble: ContentId,
    air: ContentId,
    stone: ContentId,
    ignore: ContentId,
    touched: Option<VoxelArea>,
    report: DungeonReport,
}

impl<'c, 'a> Carver<'c, 'a> {
    fn new(ctx: &'c mut GenerationContext<'a>, mut rng: StdRng) -> Self {
        let walker = Walker::new(ctx.pos.center(), rng.gen());
        Self {
            cobble: ctx.id(ContentKey::Cobble),
            air: ctx.id(ContentKey::Air),
            stone: ctx.id(ContentKey::Stone),
            ignore: ctx.id(ContentKey::Ignore),
            ctx,
            rng,
            walker,
            touched: None,
            report: DungeonReport::default(),
        }
    }

    fn mark(&mut self, p: IVec3) {
        self.touched = Some(match self.touched {
            Some(b) => VoxelArea::new(b.min().min(p), b.max().max(p)),
            None => VoxelArea::new(p, p),
        });
    }

    /// Fill a box with `content`, skipping voxels carrying any of `avoid`.
    fn fill(
        &mut self,
        place: IVec3,
        size: IVec3,
        avoid: GenFlags,
        content: ContentId,
        add: GenFlags,
    ) {
        let last = place + size - IVec3::ONE;
        for p in VoxelArea::new(place, last).positions() {
            if !self.ctx.grid.area().contains(p) || self.ctx.flags.intersects(p, avoid) {
                continue;
            }
            self.ctx.flags.insert(p, add);
            self.ctx.grid.set(p, Voxel::new(content));
            self.mark(p);
        }
    }

    /// Two-high opening flagged as dungeon interior.
    fn hole(&mut self, p: IVec3) {
        let air = self.air;
        self.fill(
            p,
            IVec3::new(1, 2, 1),
            GenFlags::empty(),
            air,
            GenFlags::DUNGEON_INSIDE,
        );
    }

    fn room(&mut self, size: IVec3, place: IVec3) {
        let area = *self.ctx.grid.area();
        for p in VoxelArea::new(place, place + size - IVec3::ONE).positions() {
            if !area.contains(p) {
                continue;
            }
            let local = p - place;
            let shell = local.cmpeq(IVec3::ZERO).any() || local.cmpeq(size - IVec3::ONE).any();
            if shell {
                if self.ctx.flags.intersects(p, GenFlags::DUNGEON_UNTOUCHABLE) {
                    continue;
                }
                self.ctx.grid.set(p, Voxel::new(self.cobble));
            } else {
                self.ctx.flags.insert(p, GenFlags::DUNGEON_UNTOUCHABLE);
                self.ctx.grid.set(p, Voxel::new(self.air));
            }
            self.mark(p);
        }
        self.report.rooms += 1;

        if self.rng.gen_ratio(3, 4) {
            let chest = place
                + IVec3::new(
                    self.rng.gen_range(1..size.x - 1),
                    1,
                    self.rng.gen_range(1..size.z - 1),
                );
            let id = self.ctx.id(ContentKey::Chest);
            if self.ctx.grid.set(chest, Voxel::new(id)) {
                self.report.chests += 1;
            }
        }
    }

    /// Whole room on unknown or stone, clear of earlier dungeon interior.
    fn room_fits(&self, place: IVec3, size: IVec3) -> bool {
        VoxelArea::new(place, place + size - IVec3::ONE)
            .positions()
            .all(|p| self.accepts(p))
    }

    /// Interior only: the side wall holds the door.
    fn interior_fits(
        grid: &VoxelGrid,
        flags: &FlagField,
        ok: [ContentId; 2],
        place: IVec3,
        size: IVec3,
    ) -> bool {
        VoxelArea::new(place + IVec3::ONE, place + size - 2 * IVec3::ONE)
            .positions()
            .all(|p| {
                grid.content(p).is_some_and(|c| ok.contains(&c))
                    && !flags.intersects(p, GenFlags::DUNGEON_INSIDE)
            })
    }

    fn accepts(&self, p: IVec3) -> bool {
        self.ctx
            .grid
            .content(p)
            .is_some_and(|c| c == self.ignore || c == self.stone)
            && !self.ctx.flags.intersects(p, GenFlags::DUNGEON_INSIDE)
    }

    fn corridor(&mut self, door: Door) -> (IVec3, IVec3) {
        let length = self.rng.gen_range(1..=13);
        let part_length = self.rng.gen_range(1..=13);
        let stairs = self.stair_slope(part_length);
        self.dig_corridor(door, length, part_length, stairs)
    }

    /// Dig `length` steps from `door`, turning at the grid edge and after
    /// every part. Returns the last position and heading.
    fn dig_corridor(
        &mut self,
        door: Door,
        length: i32,
        mut part_length: i32,
        mut stairs: i32,
    ) -> (IVec3, IVec3) {
        self.hole(door.place);
        let area = *self.ctx.grid.area();
        let mut p0 = door.place;
        let mut dir = door.dir;
        let mut part_count = 0;

        for _ in 0..length {
            let mut p = p0 + dir;
            if part_count != 0 {
                p.y += stairs;
            }
            if !(area.contains(p) && area.contains(p + IVec3::Y)) {
                dir = turn_xz(dir, self.rng.gen_bool(0.5));
                stairs = -stairs;
                part_count = 0;
                part_length = self.rng.gen_range(1..=length);
                continue;
            }
            let height = if stairs != 0 { 5 } else { 4 };
            let cobble = self.cobble;
            self.fill(
                p - IVec3::ONE,
                IVec3::new(3, height, 3),
                GenFlags::DUNGEON_UNTOUCHABLE,
                cobble,
                GenFlags::empty(),
            );
            self.hole(p);
            if stairs != 0 {
                self.hole(p - dir);
            }
            p0 = p;

            part_count += 1;
            if part_count >= part_length {
                part_count = 0;
                dir = random_turn(&mut self.rng, dir);
                part_length = self.rng.gen_range(1..=length);
                stairs = self.stair_slope(part_length);
            }
        }
        self.report.corridors += 1;
        (p0, dir)
    }

    /// Runs of three or more may slope up or down.
    fn stair_slope(&mut self, part_length: i32) -> i32 {
        if self.rng.gen_bool(0.5) && part_length >= 3 {
            if self.rng.gen_bool(0.5) {
                1
            } else {
                -1
            }
        } else {
            0
        }
    }

    fn first_door(&mut self) -> Option<Door> {
        self.walker
            .search(&*self.ctx.grid, self.cobble, self.air)
            .next()
    }

    fn room_door(&mut self, size: IVec3) -> Option<(Door, IVec3)> {
        let ok = [self.ignore, self.stone];
        let grid = &*self.ctx.grid;
        let flags = &self.ctx.flags;
        for door in self.walker.search(grid, self.cobble, self.air).take(ROOM_DOOR_TRIES) {
            let place = room_place_for_door(&mut self.rng, door, size);
            if Self::interior_fits(grid, flags, ok, place, size) {
                return Some((door, place));
            }
        }
        None
    }

    fn carve(&mut self) {
        let area = *self.ctx.grid.area();

        let mut first = None;
        for _ in 0..FIRST_ROOM_TRIES {
            let size = small_room_size(&mut self.rng);
            let Some(place) = first_room_place(&mut self.rng, &area, size) else {
                continue;
            };
            if self.room_fits(place, size) {
                first = Some((size, place));
                break;
            }
        }
        let Some((mut size, mut place)) = first else {
            trace!("no place for the first room");
            return;
        };

        let centre = |place: IVec3, size: IVec3| place + IVec3::new(size.x / 2, 1, size.z / 2);
        let mut last_centre = centre(place, size);
        let further_rooms = self.rng.gen_range(2..=6);

        for i in 0..=further_rooms {
            self.room(size, place);
            if i == further_rooms {
                break;
            }
            let room_centre = centre(place, size);
            self.walker.pos = if self.rng.gen_ratio(1, 3) {
                last_centre
            } else {
                last_centre = room_centre;
                room_centre
            };

            let Some(mut door) = self.first_door() else {
                trace!(room = i, "walker found no door");
                return;
            };
            if self.rng.gen_bool(0.5) {
                self.hole(door.place);
            } else {
                door.place -= door.dir;
            }

            let (end, end_dir) = self.corridor(door);
            size = small_room_size(&mut self.rng);
            self.walker.pos = end;
            self.walker.dir = end_dir;
            let Some((room_door, room_place)) = self.room_door(size) else {
                trace!(room = i, "no room fits after corridor");
                return;
            };
            place = room_place;
            if self.rng.gen_bool(0.5) {
                self.hole(room_door.place);
            } else {
                place -= room_door.dir;
            }
        }
    }

    /// Weather a share of the dungeon's cobble into mossy cobble.
    fn moss(&mut self) {
        let Some(bounds) = self.touched else {
            return;
        };
        let moss_seed = seed::lattice_seed(seed::channel_seed(self.ctx.seed, salt::MOSS));
        let mossy = self.ctx.id(ContentKey::MossyCobble);
        for p in bounds.positions() {
            if self.ctx.grid.content(p) != Some(self.cobble) {
                continue;
            }
            let weight = self.ctx.channels.wetness.at(p);
            if value_noise_3d(p, moss_seed) + weight > 1.0 {
                self.ctx.grid.set(p, Voxel::new(mossy));
                self.report.mossy += 1;
            }
        }
    }
}

/// Carve a dungeon into the grid. Callers check [`dungeon_gate`] first.
pub fn generate_dungeon(ctx: &mut GenerationContext<'_>) -> DungeonReport {
    let rng = scoped_rng(seed::dungeon_seed(ctx.seed, ctx.pos.node_min_array()));

    let air = ctx.id(ContentKey::Air);
    let water = ctx.id(ContentKey::WaterSource);
    for p in ctx.grid.area().positions() {
        if matches!(ctx.grid.content(p), Some(c) if c == air || c == water) {
            ctx.flags.insert(p, GenFlags::DUNGEON_PRESERVE);
        }
    }

    let mut carver = Carver::new(ctx, rng);
    carver.carve();
    carver.moss();
    debug!(
        rooms = carver.report.rooms,
        corridors = carver.report.corridors,
        chests = carver.report.chests,
        "dungeon carved"
    );
    carver.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;
    use crate::generator::ChunkGenerator;

    #[test]
    fn test_turns_are_quarter_rotations() {
        let east = IVec3::X;
        assert_eq!(turn_xz(east, true), IVec3::Z);
        assert_eq!(turn_xz(east, false), -IVec3::Z);
        assert_eq!(turn_xz(turn_xz(east, true), false), east);
        let mut dir = east;
        for _ in 0..4 {
            dir = turn_xz(dir, true);
        }
        assert_eq!(dir, east);
    }

    #[test]
    fn test_room_place_puts_door_in_side_wall() {
        let mut rng = scoped_rng(1);
        let size = IVec3::new(6, 5, 7);
        for dir in [IVec3::X, -IVec3::X, IVec3::Z, -IVec3::Z] {
            for _ in 0..20 {
                let door = Door {
                    place: IVec3::new(10, 20, 30),
                    dir,
                };
                let place = room_place_for_door(&mut rng, door, size);
                let local = door.place - place;
                // Door sits on the floor+1 layer of a wall, away from corners.
                assert_eq!(local.y, 1);
                if dir.x != 0 {
                    assert!(local.x == 0 || local.x == size.x - 1);
                    assert!((2..=size.z - 2).contains(&local.z));
                } else {
                    assert!(local.z == 0 || local.z == size.z - 1);
                    assert!((2..=size.x - 2).contains(&local.x));
                }
            }
        }
    }

    fn stone_context_grid(generator: &ChunkGenerator, pos: ChunkPos) -> VoxelGrid {
        VoxelGrid::for_chunk(pos, generator.palette().voxel(ContentKey::Stone))
    }

    #[test]
    fn test_dungeon_in_solid_stone_connects_rooms() {
        let generator = ChunkGenerator::with_default_table(2024);
        let pos = ChunkPos::new(0, -2, 0);
        let mut grid = stone_context_grid(&generator, pos);
        let mut ctx = generator.context(pos, &mut grid);
        let report = generate_dungeon(&mut ctx);
        assert!(report.rooms >= 1);
        assert!(report.corridors <= report.rooms);

        let cobble = ctx.id(ContentKey::Cobble);
        let mossy = ctx.id(ContentKey::MossyCobble);
        let walls = ctx
            .grid
            .voxels()
            .iter()
            .filter(|v| v.content == cobble || v.content == mossy)
            .count();
        assert!(walls > 0);
        assert_eq!(
            ctx.grid.voxels().iter().filter(|v| v.content == mossy).count() as u32,
            report.mossy
        );
    }

    #[test]
    fn test_dungeon_is_deterministic() {
        let generator = ChunkGenerator::with_default_table(77);
        let pos = ChunkPos::new(3, -1, -2);
        let run = || {
            let mut grid = stone_context_grid(&generator, pos);
            let mut ctx = generator.context(pos, &mut grid);
            let report = generate_dungeon(&mut ctx);
            drop(ctx);
            (report, grid)
        };
        let (r1, g1) = run();
        let (r2, g2) = run();
        assert_eq!(r1, r2);
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_preserved_air_is_never_walled() {
        let generator = ChunkGenerator::with_default_table(5);
        let pos = ChunkPos::new(0, -2, 0);
        let palette = generator.palette().clone();
        let mut grid = stone_context_grid(&generator, pos);
        // A horizontal air tunnel through the middle of the grid.
        let tunnel: Vec<IVec3> = (-16..32).map(|x| IVec3::new(x, -24, 8)).collect();
        for p in &tunnel {
            grid.set(*p, palette.voxel(ContentKey::Air));
        }
        let mut ctx = generator.context(pos, &mut grid);
        generate_dungeon(&mut ctx);
        drop(ctx);
        for p in tunnel {
            assert_eq!(
                grid.content(p),
                Some(palette.id(ContentKey::Air)),
                "tunnel walled at {p}"
            );
        }
    }

    #[test]
    fn test_no_room_in_open_air() {
        let generator = ChunkGenerator::with_default_table(5);
        let pos = ChunkPos::new(0, 3, 0);
        let mut grid = VoxelGrid::for_chunk(pos, generator.palette().voxel(ContentKey::Air));
        let mut ctx = generator.context(pos, &mut grid);
        assert_eq!(generate_dungeon(&mut ctx), DungeonReport::default());
    }

    #[test]
    fn test_gate_rejects_other_biomes() {
        assert!(biome_allows_dungeons(Biome::Desert));
        assert!(biome_allows_dungeons(Biome::Jungle));
        assert!(!biome_allows_dungeons(Biome::Plains));
        assert!(!biome_allows_dungeons(Biome::Ocean));

        let generator = ChunkGenerator::with_default_table(5);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = stone_context_grid(&generator, pos);
        let mut ctx = generator.context(pos, &mut grid);
        ctx.biome = Biome::Plains;
        assert!(!dungeon_gate(&ctx));
        ctx.biome = Biome::Desert;
        ctx.limestone = true;
        assert!(!dungeon_gate(&ctx));
    }

    #[test]
    fn test_first_room_spans_both_halos() {
        let area = VoxelArea::with_halo(ChunkPos::new(0, -2, 0));
        let mut rng = scoped_rng(17);
        let mut low = area.max();
        let mut high = area.min();
        for _ in 0..4000 {
            let size = small_room_size(&mut rng);
            let place = first_room_place(&mut rng, &area, size).unwrap();
            let last = place + size - IVec3::ONE;
            assert!(area.contains(place) && area.contains(last));
            low = low.min(place);
            high = high.max(last);
        }
        assert!((low - area.min()).max_element() <= 1, "lowest corner {low}");
        assert!((area.max() - high).max_element() <= 1, "highest corner {high}");
        assert!(first_room_place(&mut rng, &area, IVec3::splat(49)).is_none());
    }

    #[test]
    fn test_dungeons_reach_down_and_up_into_the_halo() {
        let pos = ChunkPos::new(0, -2, 0);
        let (bottom, top) = (pos.node_min().y - 6, pos.node_max().y + 6);
        let (mut below, mut above) = (0, 0);
        for seed in 0..60 {
            let generator = ChunkGenerator::with_default_table(seed);
            let mut grid = stone_context_grid(&generator, pos);
            let mut ctx = generator.context(pos, &mut grid);
            generate_dungeon(&mut ctx);
            let air = ctx.id(ContentKey::Air);
            for p in ctx.grid.area().positions() {
                if ctx.grid.content(p) == Some(air) {
                    below += usize::from(p.y < bottom);
                    above += usize::from(p.y > top);
                }
            }
        }
        assert!(below > 0, "nothing carved below y {bottom}");
        assert!(above > 0, "nothing carved above y {top}");
    }

    #[test]
    fn test_walker_in_open_air_gives_up() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 4, 0);
        let palette = generator.palette();
        let grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Air));
        let mut walker = Walker::new(pos.center(), 9);
        let mut search = walker.search(
            &grid,
            palette.id(ContentKey::Cobble),
            palette.id(ContentKey::Air),
        );
        assert_eq!(search.next(), None);
        assert_eq!(search.next(), None);
        assert!(grid.area().contains(walker.pos));
    }

    #[test]
    fn test_walker_finds_a_wall_of_its_room() {
        let generator = ChunkGenerator::with_default_table(4);
        let pos = ChunkPos::new(0, -2, 0);
        let mut grid = stone_context_grid(&generator, pos);
        let mut ctx = generator.context(pos, &mut grid);
        let mut carver = Carver::new(&mut ctx, scoped_rng(4));
        let place = pos.node_min() + IVec3::new(4, 4, 4);
        let size = IVec3::new(7, 5, 7);
        carver.room(size, place);
        carver.walker.pos = place + IVec3::new(3, 1, 3);
        let door = carver.first_door().expect("room walls are reachable");
        let local = door.place - place;
        assert!(local.x == 0 || local.x == size.x - 1 || local.z == 0 || local.z == size.z - 1);
        assert_eq!(carver.ctx.grid.content(door.place), Some(carver.cobble));
    }

    #[test]
    fn test_corridor_turns_at_the_grid_edge() {
        let generator = ChunkGenerator::with_default_table(6);
        let pos = ChunkPos::new(0, -2, 0);
        for seed in 0..10 {
            let mut grid = stone_context_grid(&generator, pos);
            let mut ctx = generator.context(pos, &mut grid);
            let area = *ctx.grid.area();
            let door = Door {
                place: IVec3::new(area.max().x, pos.center().y, pos.center().z),
                dir: IVec3::X,
            };
            let mut carver = Carver::new(&mut ctx, scoped_rng(seed));
            let (end, _) = carver.dig_corridor(door, 4, 4, 0);
            assert!(end.x <= door.place.x);
            let sideways = [door.place + IVec3::Z, door.place - IVec3::Z]
                .iter()
                .any(|p| ctx.flags.intersects(*p, GenFlags::DUNGEON_INSIDE));
            assert!(sideways, "corridor did not turn (seed {seed})");
        }
    }

    #[test]
    fn test_sloped_corridor_digs_stairs() {
        let generator = ChunkGenerator::with_default_table(6);
        let pos = ChunkPos::new(0, -2, 0);
        let mut grid = stone_context_grid(&generator, pos);
        let mut ctx = generator.context(pos, &mut grid);
        let door = Door {
            place: pos.center(),
            dir: IVec3::X,
        };
        let mut carver = Carver::new(&mut ctx, scoped_rng(2));
        let (end, _) = carver.dig_corridor(door, 6, 6, 1);
        assert_eq!(end, door.place + IVec3::new(6, 5, 0));

        let air = ctx.id(ContentKey::Air);
        for k in 1..=6 {
            let step = door.place + IVec3::new(k, k - 1, 0);
            for p in [step, step + IVec3::Y] {
                assert!(ctx.flags.intersects(p, GenFlags::DUNGEON_INSIDE), "no stair at {p}");
                assert_eq!(ctx.grid.content(p), Some(air));
            }
        }
    }
}
