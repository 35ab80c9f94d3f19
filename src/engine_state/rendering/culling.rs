//! # Visibility Culling
//!
//! Per-frame selection of the chunks worth drawing:
//!
//! 1. **Frustum test**: a chunk is kept unless its bounding box lies entirely
//!    outside one of the six frustum planes.
//! 2. **Occlusion heuristic**: a chunk is dropped when every one of its faces
//!    that looks towards the camera is covered by a loaded, fully opaque
//!    neighbour with a current mesh. Anything the camera could see of the
//!    chunk would have to pass through such a neighbour first.
//!
//! Both tests are conservative: they may keep a chunk that turns out to be
//! invisible, but never drop one that is visible.
//!
//! Survivors are ordered front to back (nearest chunk centre first) so the
//! renderer gets the most out of early depth rejection.

use std::cmp::Ordering;

use cgmath::{InnerSpace, Matrix, Matrix4, MetricSpace, Point3, Vector3, Vector4};

use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    chunk::{ChunkCoordinate, VoxelChunk},
    world::WorldStore,
};

/// One frustum plane. Points with `normal · p + distance >= 0` are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub distance: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = Vector3::new(row.x, row.y, row.z);
        let length = normal.magnitude();
        if length.is_finite() && length > f32::EPSILON {
            Self {
                normal: normal / length,
                distance: row.w / length,
            }
        } else {
            Self {
                normal,
                distance: row.w,
            }
        }
    }

    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(Vector3::new(point.x, point.y, point.z)) + self.distance
    }

    /// A plane without a usable direction.
    pub fn is_degenerate(&self) -> bool {
        let length = self.normal.magnitude();
        !(length.is_finite() && self.distance.is_finite() && length > f32::EPSILON)
    }
}

/// The camera's view volume as six inward-facing planes.
///
/// Planes are ordered left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum planes from a view-projection matrix.
    ///
    /// Expects clip space in WGPU's convention (depth in `[0, w]`), as produced
    /// by [`Projection::calc_matrix`](crate::engine_state::camera_state::camera::Projection::calc_matrix).
    pub fn from_matrix(view_projection: Matrix4<f32>) -> Self {
        let row0 = view_projection.row(0);
        let row1 = view_projection.row(1);
        let row2 = view_projection.row(2);
        let row3 = view_projection.row(3);

        Self {
            planes: [
                Plane::from_row(row3 + row0),
                Plane::from_row(row3 - row0),
                Plane::from_row(row3 + row1),
                Plane::from_row(row3 - row1),
                Plane::from_row(row2),
                Plane::from_row(row3 - row2),
            ],
        }
    }

    /// True if any plane lacks a usable direction. Nothing is visible through
    /// such a frustum.
    pub fn is_degenerate(&self) -> bool {
        self.planes.iter().any(Plane::is_degenerate)
    }

    /// Whether the box `[min, max]` is at least partly inside.
    ///
    /// Tests the box corner furthest along each plane normal; if even that
    /// corner is behind a plane, the whole box is.
    pub fn intersects_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            let furthest = Point3::new(
                if plane.normal.x >= 0.0 { max.x } else { min.x },
                if plane.normal.y >= 0.0 { max.y } else { min.y },
                if plane.normal.z >= 0.0 { max.z } else { min.z },
            );
            plane.signed_distance(furthest) >= 0.0
        })
    }
}

fn aabb_contains(coord: ChunkCoordinate, point: Point3<f32>) -> bool {
    let (min, max) = (coord.min_corner(), coord.max_corner());
    (min.x..=max.x).contains(&point.x)
        && (min.y..=max.y).contains(&point.y)
        && (min.z..=max.z).contains(&point.z)
}

/// Chooses which loaded chunks to draw each frame.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityCuller {
    occlusion: bool,
}

impl Default for VisibilityCuller {
    fn default() -> Self {
        Self { occlusion: true }
    }
}

impl VisibilityCuller {
    /// # Arguments
    /// * `occlusion` - Whether to apply the occlusion heuristic after the frustum test
    pub fn new(occlusion: bool) -> Self {
        Self { occlusion }
    }

    /// Selects the visible chunks, nearest first.
    ///
    /// # Arguments
    /// * `frustum` - The camera's view frustum
    /// * `camera_position` - World-space camera position, for ordering and occlusion
    /// * `world` - The loaded chunks
    ///
    /// # Returns
    /// The chunks to render, ordered by squared distance from the camera to the
    /// chunk centre, ties broken by coordinate. Empty for a degenerate frustum.
    pub fn select<'w>(
        &self,
        frustum: &Frustum,
        camera_position: Point3<f32>,
        world: &'w WorldStore,
    ) -> Vec<&'w VoxelChunk> {
        if frustum.is_degenerate() {
            return Vec::new();
        }

        let mut visible: Vec<(f32, &VoxelChunk)> = world
            .chunks()
            .filter(|chunk| {
                let coord = chunk.coordinate();
                frustum.intersects_aabb(coord.min_corner(), coord.max_corner())
            })
            .filter(|chunk| !self.occlusion || !Self::is_occluded(chunk.coordinate(), camera_position, world))
            .map(|chunk| (chunk.coordinate().center().distance2(camera_position), chunk))
            .collect();

        visible.sort_by(|(a_distance, a), (b_distance, b)| {
            a_distance
                .partial_cmp(b_distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.coordinate().cmp(&b.coordinate()))
        });

        visible.into_iter().map(|(_, chunk)| chunk).collect()
    }

    /// Whether every camera-facing face of the chunk is hidden behind a fully
    /// opaque, freshly meshed neighbour.
    fn is_occluded(coord: ChunkCoordinate, camera: Point3<f32>, world: &WorldStore) -> bool {
        if aabb_contains(coord, camera) {
            return false;
        }

        let (min, max) = (coord.min_corner(), coord.max_corner());
        let facing = [
            (BlockSide::RIGHT, camera.x > max.x),
            (BlockSide::LEFT, camera.x < min.x),
            (BlockSide::TOP, camera.y > max.y),
            (BlockSide::BOTTOM, camera.y < min.y),
            (BlockSide::FRONT, camera.z > max.z),
            (BlockSide::BACK, camera.z < min.z),
        ];

        facing
            .into_iter()
            .filter(|(_, faces_camera)| *faces_camera)
            .all(|(side, _)| {
                let neighbor_coord = coord.neighbor(side);
                world.chunk(neighbor_coord).is_some_and(|neighbor| {
                    neighbor.blocks().is_fully_opaque()
                        && neighbor.has_current_mesh()
                        && !aabb_contains(neighbor_coord, camera)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        camera_state::camera::{Camera, Projection},
        rendering::meshing::ChunkMesher,
        voxels::{block::block_type::BlockType, chunk::CHUNK_SIZE},
    };
    use cgmath::Deg;

    fn looking_along_z(position: Point3<f32>) -> Frustum {
        let camera = Camera::new(position, Deg(90.0), Deg(0.0));
        camera.frustum(&Projection::new(800, 600, Deg(70.0), 0.1, 500.0))
    }

    fn load(world: &mut WorldStore, coord: ChunkCoordinate, block_type: BlockType) {
        world.load_chunk(coord, vec![block_type; CHUNK_SIZE]).unwrap();
    }

    #[test]
    fn chunks_behind_the_camera_are_never_selected() {
        let mut world = WorldStore::new();
        let ahead = ChunkCoordinate::new(0, 0, 2);
        let behind = ChunkCoordinate::new(0, 0, -3);
        load(&mut world, ahead, BlockType::AIR);
        load(&mut world, behind, BlockType::AIR);

        let camera = Point3::new(8.0, 8.0, 0.0);
        let selected: Vec<_> = VisibilityCuller::new(false)
            .select(&looking_along_z(camera), camera, &world)
            .iter()
            .map(|chunk| chunk.coordinate())
            .collect();

        assert_eq!(selected, vec![ahead]);
    }

    #[test]
    fn selection_is_ordered_front_to_back() {
        let mut world = WorldStore::new();
        for z in [5, 1, 3] {
            load(&mut world, ChunkCoordinate::new(0, 0, z), BlockType::AIR);
        }

        let camera = Point3::new(8.0, 8.0, 0.5);
        let selected: Vec<_> = VisibilityCuller::new(false)
            .select(&looking_along_z(camera), camera, &world)
            .iter()
            .map(|chunk| chunk.coordinate().z())
            .collect();

        assert_eq!(selected, vec![1, 3, 5]);
    }

    #[test]
    fn degenerate_frustum_selects_nothing() {
        let mut world = WorldStore::new();
        load(&mut world, ChunkCoordinate::new(0, 0, 0), BlockType::STONE);

        let frustum = Frustum::from_matrix(Matrix4::from_scale(0.0));
        assert!(frustum.is_degenerate());
        assert!(VisibilityCuller::default()
            .select(&frustum, Point3::new(0.0, 0.0, 0.0), &world)
            .is_empty());
    }

    #[test]
    fn chunk_behind_a_meshed_opaque_wall_is_occluded() {
        let mut world = WorldStore::new();
        let wall = ChunkCoordinate::new(0, 0, 1);
        let hidden = ChunkCoordinate::new(0, 0, 2);
        load(&mut world, wall, BlockType::STONE);
        load(&mut world, hidden, BlockType::AIR);

        // Camera straight in front of the wall, so the hidden chunk only shows
        // its back face to the camera.
        let camera = Point3::new(8.0, 8.0, 4.0);
        let frustum = looking_along_z(camera);
        let culler = VisibilityCuller::new(true);

        let before: Vec<_> = culler.select(&frustum, camera, &world).iter().map(|c| c.coordinate()).collect();
        assert_eq!(before, vec![wall, hidden], "an unmeshed wall hides nothing");

        ChunkMesher::mesh_chunk(&mut world, wall);
        let after: Vec<_> = culler.select(&frustum, camera, &world).iter().map(|c| c.coordinate()).collect();
        assert_eq!(after, vec![wall]);
    }

    #[test]
    fn see_through_walls_do_not_occlude() {
        let mut world = WorldStore::new();
        let wall = ChunkCoordinate::new(0, 0, 1);
        let behind = ChunkCoordinate::new(0, 0, 2);
        load(&mut world, wall, BlockType::GLASS);
        load(&mut world, behind, BlockType::AIR);
        ChunkMesher::mesh_chunk(&mut world, wall);

        let camera = Point3::new(8.0, 8.0, 4.0);
        let selected = VisibilityCuller::new(true).select(&looking_along_z(camera), camera, &world);
        assert_eq!(selected.len(), 2);
    }
}
