use crate::prelude::*;
use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey, NotShadowCaster},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::{Indices, MeshVertexBufferLayoutRef, PrimitiveTopology},
        render_asset::RenderAssetUsages,
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError,
        },
        view::NoFrustumCulling,
    },
};
use bytemuck::{Pod, Zeroable};

const SHADER_ASSET_PATH: &str = "shaders/galaxy_points.wgsl";

// one camera-facing quad per particle
const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub struct PointsMaterialPlugin;

impl Plugin for PointsMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<GalaxyPointsMaterial>::default())
            .add_systems(
                Update,
                attach_point_meshes.after(crate::galaxy::GalaxySet::Spawn),
            );
    }
}

// Mirrors `PointParams` in galaxy_points.wgsl
#[derive(ShaderType, Pod, Zeroable, Clone, Copy, Debug)]
#[repr(C)]
struct PointParams {
    color: Vec4,
    size: f32,
    size_attenuation: u32,
    pad: Vec2,
}

impl PointParams {
    fn read(style: &PointStyle) -> Self {
        Self {
            color: Vec4::ONE,
            size: style.size,
            size_attenuation: style.size_attenuation as u32,
            pad: Vec2::ZERO,
        }
    }
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
#[bind_group_data(PointsMaterialKey)]
pub struct GalaxyPointsMaterial {
    #[uniform(0)]
    params: PointParams,
    alpha_mode: AlphaMode,
    depth_write: bool,
}

impl GalaxyPointsMaterial {
    pub fn new(style: &PointStyle) -> Self {
        let alpha_mode = match style.blending {
            Blending::Additive => AlphaMode::Add,
        };
        Self {
            params: PointParams::read(style),
            alpha_mode,
            depth_write: style.depth_write,
        }
    }
}

#[derive(Eq, PartialEq, Hash, Clone)]
pub struct PointsMaterialKey {
    depth_write: bool,
}

impl From<&GalaxyPointsMaterial> for PointsMaterialKey {
    fn from(material: &GalaxyPointsMaterial) -> Self {
        Self {
            depth_write: material.depth_write,
        }
    }
}

impl Material for GalaxyPointsMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];

        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = key.bind_group_data.depth_write;
        }
        // quads are generated facing the camera, winding is irrelevant
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// Builds the quad mesh for a cloud: every particle center repeated on four
/// corners, which the vertex shader pushes apart by the particle size.
pub fn build_points_mesh(cloud: &PointCloud) -> Mesh {
    let points = cloud.points();

    let mut positions = Vec::with_capacity(points.len() * 4);
    let mut uvs = Vec::with_capacity(points.len() * 4);
    let mut indices = Vec::with_capacity(points.len() * 6);

    for (i, point) in points.iter().enumerate() {
        let base = (i * 4) as u32;
        for corner in QUAD_CORNERS {
            positions.push(*point);
            uvs.push(corner);
        }
        indices.extend(QUAD_INDICES.iter().map(|idx| base + idx));
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}

fn attach_point_meshes(
    mut commands: Commands,
    new_points: Query<(Entity, &GalaxyPoints), Added<GalaxyPoints>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GalaxyPointsMaterial>>,
) {
    for (entity, points) in &new_points {
        // an empty vertex buffer can't be drawn, leave the entity bare
        if points.cloud.is_empty() {
            continue;
        }
        debug!(
            "Building point mesh for galaxy {} ({} particles)",
            points.generation,
            points.cloud.len()
        );
        let mesh = meshes.add(build_points_mesh(&points.cloud));
        let material = materials.add(GalaxyPointsMaterial::new(&points.cloud.style));

        commands.entity(entity).insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            NoFrustumCulling,
            NotShadowCaster,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;
    use rand::{SeedableRng, rngs::StdRng};

    fn cloud(count: i32) -> PointCloud {
        let config = GalaxyConfig {
            count,
            ..default()
        };
        PointCloud::generate(&config, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn mesh_has_one_quad_per_particle() {
        let cloud = cloud(250);
        let mesh = build_points_mesh(&cloud);

        assert_eq!(mesh.count_vertices(), 250 * 4);
        assert_eq!(mesh.indices().unwrap().len(), 250 * 6);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        // all four corners share the particle center
        for (i, point) in cloud.points().iter().enumerate() {
            assert!(positions[i * 4..i * 4 + 4].iter().all(|p| p == point));
        }
    }

    #[test]
    fn material_follows_style() {
        let style = PointStyle::with_size(0.05);
        let material = GalaxyPointsMaterial::new(&style);
        assert_eq!(material.alpha_mode, AlphaMode::Add);
        assert!(!material.depth_write);
        assert_eq!(material.params.size, 0.05);
        assert_eq!(material.params.size_attenuation, 1);
    }
}
