//! Face-culled meshing.
//!
//! Every solid voxel contributes one quad per side whose neighbour is air.
//! Neighbours inside the chunk are read from the chunk directly; neighbours
//! across a chunk boundary are read through the store, where non-resident
//! chunks count as air.

use cgmath::Point3;

use crate::engine_state::{
    rendering::meshing::palette::MeshPalette,
    voxels::{block::block_side::BlockSide, chunk::ChunkKey, chunk_store::ChunkStore},
};

use super::{face::Face, mesh::ChunkMesh};

/// Builds the mesh of a resident chunk.
///
/// # Arguments
/// * `store` - The chunk store, used for cross-chunk neighbour lookups
/// * `key` - The chunk to mesh
/// * `palette` - Colouring parameters
///
/// # Returns
/// `None` when the chunk is not resident or has no visible face.
pub fn build_chunk_mesh(store: &ChunkStore, key: ChunkKey, palette: &MeshPalette) -> Option<ChunkMesh> {
    let chunk = store.chunk(key)?;
    let size = chunk.size();
    let (origin_x, origin_z) = key.origin(size);
    let mut mesh = ChunkMesh::new(key);

    for (local, block_id) in chunk.solid_blocks() {
        let voxel = Point3::new(origin_x + local.x, local.y, origin_z + local.z);
        for side in BlockSide::all() {
            let normal = side.normal();
            let (nx, nz) = (local.x + normal.x, local.z + normal.z);
            let occluded = if (0..size).contains(&nx) && (0..size).contains(&nz) {
                chunk.is_solid_local(nx, local.y + normal.y, nz)
            } else {
                store.is_solid_at(voxel + normal)
            };
            if !occluded {
                mesh.add_face(
                    &Face::new(voxel, block_id, side),
                    palette.face_color(block_id, voxel, side),
                );
            }
        }
    }

    (!mesh.is_empty()).then_some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

    const SIZE: i32 = 8;
    const HEIGHT: i32 = 16;

    fn palette() -> MeshPalette {
        MeshPalette::new(7, 8, HEIGHT)
    }

    fn store_with(blocks: &[(ChunkKey, i32, i32, i32)]) -> ChunkStore {
        let mut store = ChunkStore::new(SIZE, HEIGHT);
        for &(key, lx, ly, lz) in blocks {
            if !store.is_resident(key) {
                store.insert_chunk(Chunk::empty(key, SIZE, HEIGHT));
            }
            let (ox, oz) = key.origin(SIZE);
            store.set_block(Point3::new(ox + lx, ly, oz + lz), BlockType::STONE.id());
        }
        store
    }

    #[test]
    fn lone_voxel_shows_every_face() {
        let key = ChunkKey::new(0, 0);
        let store = store_with(&[(key, 3, 4, 3)]);
        let mesh = build_chunk_mesh(&store, key, &palette()).expect("visible faces");
        assert_eq!(mesh.face_count, 6);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn touching_voxels_hide_shared_faces() {
        let key = ChunkKey::new(0, 0);
        let store = store_with(&[(key, 3, 4, 3), (key, 4, 4, 3), (key, 4, 5, 3)]);
        let mesh = build_chunk_mesh(&store, key, &palette()).expect("visible faces");
        assert_eq!(mesh.face_count, 18 - 4);
    }

    #[test]
    fn neighbours_across_chunks_are_culled_only_when_resident() {
        let west = ChunkKey::new(0, 0);
        let east = ChunkKey::new(1, 0);
        let lonely = store_with(&[(west, SIZE - 1, 2, 5)]);
        let mesh = build_chunk_mesh(&lonely, west, &palette()).expect("visible faces");
        assert_eq!(mesh.face_count, 6);

        let paired = store_with(&[(west, SIZE - 1, 2, 5), (east, 0, 2, 5)]);
        let west_mesh = build_chunk_mesh(&paired, west, &palette()).expect("visible faces");
        let east_mesh = build_chunk_mesh(&paired, east, &palette()).expect("visible faces");
        assert_eq!(west_mesh.face_count, 5);
        assert_eq!(east_mesh.face_count, 5);
    }

    #[test]
    fn rebuilding_an_unchanged_chunk_is_identical() {
        let key = ChunkKey::new(-1, 2);
        let store = store_with(&[(key, 0, 0, 0), (key, 1, 0, 0), (key, 5, 9, 7)]);
        let first = build_chunk_mesh(&store, key, &palette());
        let second = build_chunk_mesh(&store, key, &palette());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_or_missing_chunks_have_no_mesh() {
        let key = ChunkKey::new(0, 0);
        let mut store = ChunkStore::new(SIZE, HEIGHT);
        assert!(build_chunk_mesh(&store, key, &palette()).is_none());
        store.insert_chunk(Chunk::empty(key, SIZE, HEIGHT));
        assert!(build_chunk_mesh(&store, key, &palette()).is_none());
    }
}
