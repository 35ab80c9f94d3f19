//! # Block Interaction
//!
//! Ray casting through the voxel grid for block selection, and the break and
//! place operations built on it.
//!
//! ## Traversal
//!
//! Rays walk the grid cell by cell (Amanatides and Woo), visiting cells in
//! strictly increasing distance, so the first solid cell found is the nearest.
//! The cell containing the ray origin is never reported: a camera standing
//! inside a block can still select the blocks in front of it.
//!
//! Rays are clipped to the bounding box of the loaded chunks. Nothing outside
//! that box can be hit, so a ray that leaves it (or never meets it) misses. A
//! ray starting outside the box begins its walk where it enters, so the work
//! done depends only on the length of the ray inside the loaded world.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::{
    engine_state::voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::ChunkCoordinate,
        world::WorldStore,
    },
    error::VoxelError,
};

/// The first solid block along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World position of the block that was hit
    pub block_pos: Point3<i32>,
    /// The face of that block the ray entered through
    pub face: BlockSide,
    /// Distance along the ray to the block's grid position (its minimum
    /// corner), i.e. `(block_pos - origin) · direction`
    pub distance: f32,
    /// Ray length from the origin to the entry face
    pub entry_distance: f32,
}

impl RayHit {
    /// The cell in front of the hit face, where a placed block would go.
    pub fn adjacent_pos(&self) -> Point3<i32> {
        self.block_pos + self.face.offset()
    }
}

/// Casts selection rays and applies break and place actions.
#[derive(Debug, Clone, Copy)]
pub struct InteractionRaycaster {
    reach: f32,
}

impl InteractionRaycaster {
    /// # Arguments
    /// * `reach` - Maximum ray length used by `break_block` and `place_block`
    pub fn new(reach: f32) -> Self {
        Self { reach }
    }

    pub fn reach(&self) -> f32 {
        self.reach
    }

    /// Finds the first solid block along a ray.
    ///
    /// # Arguments
    /// * `world` - The world to cast through
    /// * `origin` - Ray origin in world space
    /// * `direction` - Ray direction, need not be normalized
    /// * `max_distance` - Longest ray length considered
    ///
    /// # Returns
    /// `None` for a miss: nothing solid within `max_distance`, the ray is
    /// outside the loaded world, or the direction is zero or not finite.
    pub fn cast(
        world: &WorldStore,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let length = direction.magnitude();
        if !(length.is_finite() && length > 0.0)
            || !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite())
            || !(max_distance.is_finite() && max_distance > 0.0)
        {
            return None;
        }
        let direction = direction / length;

        let (min, max) = world.loaded_bounds()?;
        let clip = clip_to_box(
            origin,
            direction,
            min.cast::<f32>()?,
            max.cast::<f32>()?,
        )?;
        let start = clip.enter.max(0.0);
        if clip.exit < start || start > max_distance {
            return None;
        }
        // Traversal distances are measured from `entry`, keeping them small
        // however far the origin is from the loaded world.
        let limit = clip.exit.min(max_distance) - start;

        let hit = |cell: Point3<i32>, face: BlockSide, walked: f32| RayHit {
            block_pos: cell,
            face,
            distance: (Point3::new(cell.x as f32, cell.y as f32, cell.z as f32) - origin)
                .dot(direction),
            entry_distance: start + walked,
        };

        let (entry, mut cell) = match clip.enter_axis {
            Some(axis) if clip.enter > 0.0 => {
                // Entering from outside: the first cell inside the box is a
                // candidate in its own right.
                let mut entry = origin + direction * start;
                entry[axis] = (if direction[axis] > 0.0 { min[axis] } else { max[axis] }) as f32;
                let cell = Point3::new(
                    (entry.x.floor() as i32).clamp(min.x, max.x - 1),
                    (entry.y.floor() as i32).clamp(min.y, max.y - 1),
                    (entry.z.floor() as i32).clamp(min.z, max.z - 1),
                );
                if world.get_block(cell).is_solid() {
                    let step = if direction[axis] > 0.0 { 1 } else { -1 };
                    return Some(hit(cell, entry_face(axis, step), 0.0));
                }
                (entry, cell)
            }
            _ => (
                origin,
                Point3::new(
                    origin.x.floor() as i32,
                    origin.y.floor() as i32,
                    origin.z.floor() as i32,
                ),
            ),
        };
        let mut axes = [
            Axis::new(entry.x, direction.x, cell.x),
            Axis::new(entry.y, direction.y, cell.y),
            Axis::new(entry.z, direction.z, cell.z),
        ];

        loop {
            // Ties go to the lowest axis, so edge and corner crossings resolve
            // the same way every time.
            let mut axis = 0;
            for candidate in 1..3 {
                if axes[candidate].t_max < axes[axis].t_max {
                    axis = candidate;
                }
            }

            let walked = axes[axis].t_max;
            if walked > limit {
                return None;
            }

            let step = axes[axis].step;
            cell[axis] += step;
            axes[axis].t_max += axes[axis].t_delta;

            if world.get_block(cell).is_solid() {
                return Some(hit(cell, entry_face(axis, step), walked));
            }
        }
    }

    /// Breaks the block the ray selects, within reach.
    ///
    /// # Returns
    /// The hit that was broken, or `None` if nothing was in reach.
    pub fn break_block(
        &self,
        world: &mut WorldStore,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<RayHit>, VoxelError> {
        let Some(hit) = Self::cast(world, origin, direction, self.reach) else {
            return Ok(None);
        };

        world.set_block(hit.block_pos, BlockType::AIR)?;
        Ok(Some(hit))
    }

    /// Places a block against the face the ray selects, within reach.
    ///
    /// The target cell must be loaded and not already solid; otherwise nothing
    /// is placed.
    ///
    /// # Returns
    /// The position of the placed block, or `None` if nothing was placed.
    pub fn place_block(
        &self,
        world: &mut WorldStore,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        block_type: BlockType,
    ) -> Result<Option<Point3<i32>>, VoxelError> {
        let Some(hit) = Self::cast(world, origin, direction, self.reach) else {
            return Ok(None);
        };

        let target = hit.adjacent_pos();
        if !Self::can_place_at(world, target) {
            return Ok(None);
        }

        world.set_block(target, block_type)?;
        Ok(Some(target))
    }

    /// Whether a block may be placed at a world position.
    pub fn can_place_at(world: &WorldStore, position: Point3<i32>) -> bool {
        let (coord, _) = ChunkCoordinate::from_world_block(position);
        world.contains(coord) && !world.get_block(position).is_solid()
    }
}

/// Per-axis traversal state.
struct Axis {
    /// -1, 0 or 1
    step: i32,
    /// Ray distance at which the next cell boundary on this axis is crossed
    t_max: f32,
    /// Ray distance between consecutive boundaries on this axis
    t_delta: f32,
}

impl Axis {
    fn new(origin: f32, direction: f32, cell: i32) -> Self {
        if direction > 0.0 {
            Self {
                step: 1,
                t_max: ((cell + 1) as f32 - origin) / direction,
                t_delta: 1.0 / direction,
            }
        } else if direction < 0.0 {
            Self {
                step: -1,
                t_max: (origin - cell as f32) / -direction,
                t_delta: -1.0 / direction,
            }
        } else {
            Self {
                step: 0,
                t_max: f32::INFINITY,
                t_delta: f32::INFINITY,
            }
        }
    }
}

/// The face of the new cell a ray passes through when stepping along `axis`.
fn entry_face(axis: usize, step: i32) -> BlockSide {
    match (axis, step > 0) {
        (0, true) => BlockSide::LEFT,
        (0, false) => BlockSide::RIGHT,
        (1, true) => BlockSide::BOTTOM,
        (1, false) => BlockSide::TOP,
        (_, true) => BlockSide::BACK,
        (_, false) => BlockSide::FRONT,
    }
}

/// Where a ray's line crosses an axis-aligned box.
struct Clip {
    /// Ray distance at which the line enters the box
    enter: f32,
    /// The axis whose slab the line enters last, if any slab constrains it
    enter_axis: Option<usize>,
    /// Ray distance at which the line leaves the box
    exit: f32,
}

/// Slab test of a ray against an axis-aligned box.
///
/// # Returns
/// The entry and exit ray distances, or `None` if the ray's line misses the box.
fn clip_to_box(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    min: Point3<f32>,
    max: Point3<f32>,
) -> Option<Clip> {
    let mut clip = Clip {
        enter: f32::NEG_INFINITY,
        enter_axis: None,
        exit: f32::INFINITY,
    };

    for axis in 0..3 {
        if direction[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }

        let a = (min[axis] - origin[axis]) / direction[axis];
        let b = (max[axis] - origin[axis]) / direction[axis];
        if a.min(b) > clip.enter {
            clip.enter = a.min(b);
            clip.enter_axis = Some(axis);
        }
        clip.exit = clip.exit.min(a.max(b));
    }

    (clip.enter <= clip.exit).then_some(clip)
}
