use foundation::bounds::Aabb3;
use formats::PointSet;

use crate::color::{ColorMode, Rgb, WHITE, altitude_color};
use crate::surface::{BufferId, RenderSurface};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointColor {
    pub rgb: [f32; 3],
}

/// One point set resident on a surface, plus the CPU mirror needed to
/// recolor it.
///
/// Mutations only touch the mirror and set dirty flags; [`PointBuffer::flush`]
/// pushes them to the surface on the next frame.
#[derive(Debug, Clone)]
pub struct PointBuffer {
    id: BufferId,
    altitudes: Vec<f64>,
    colors: Vec<PointColor>,
    bounds: Option<Aabb3>,
    z_range: Option<(f64, f64)>,
    point_size: f32,
    colors_dirty: bool,
    size_dirty: bool,
}

impl PointBuffer {
    /// Uploads positions and all-white colors.
    pub fn upload<S: RenderSurface>(surface: &mut S, set: &PointSet, point_size: f64) -> Self {
        let vertices: Vec<PointVertex> = set
            .points()
            .iter()
            .map(|p| PointVertex {
                position: [p.x as f32, p.y as f32, p.z as f32],
            })
            .collect();
        let colors = vec![PointColor { rgb: WHITE }; vertices.len()];
        let id = surface.create_point_buffer(
            bytemuck::cast_slice(&vertices),
            bytemuck::cast_slice(&colors),
            vertices.len(),
        );

        Self {
            id,
            altitudes: set.points().iter().map(|p| p.z).collect(),
            colors,
            bounds: set.bounding_box(),
            z_range: set.z_range(),
            point_size: point_size as f32,
            colors_dirty: false,
            size_dirty: true,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn point_count(&self) -> usize {
        self.altitudes.len()
    }

    pub fn bounds(&self) -> Option<Aabb3> {
        self.bounds
    }

    /// Cached `(min_z, max_z)` of the source set.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z_range
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.iter().map(|c| c.rgb)
    }

    pub fn is_dirty(&self) -> bool {
        self.colors_dirty || self.size_dirty
    }

    /// Returns whether the size changed.
    pub fn set_point_size(&mut self, size: f64) -> bool {
        let size = size as f32;
        if size == self.point_size {
            return false;
        }
        self.point_size = size;
        self.size_dirty = true;
        true
    }

    /// Recomputes every color. `range` overrides the cached z-range.
    pub fn recolor(&mut self, mode: ColorMode, range: Option<(f64, f64)>) {
        match (mode, range.or(self.z_range)) {
            (ColorMode::AltitudeGradient, Some((min, max))) => {
                for (c, z) in self.colors.iter_mut().zip(&self.altitudes) {
                    c.rgb = altitude_color(*z, min, max);
                }
            }
            _ => self.colors.fill(PointColor { rgb: WHITE }),
        }
        self.colors_dirty = true;
    }

    pub fn flush<S: RenderSurface>(&mut self, surface: &mut S) {
        if self.colors_dirty {
            surface.write_colors(self.id, bytemuck::cast_slice(&self.colors));
            self.colors_dirty = false;
        }
        if self.size_dirty {
            surface.set_point_size(self.id, self.point_size);
            self.size_dirty = false;
        }
    }

    pub fn release<S: RenderSurface>(self, surface: &mut S) {
        surface.destroy_buffer(self.id);
    }
}
