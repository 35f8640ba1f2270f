//! Orthographic view of a lit, textured plane.
//!
//! The plane always fills the camera frustum exactly, so projecting it is a
//! matter of scaling the texture to the viewport and modulating each pixel by
//! the Lambert lighting interpolated across the plane's vertex grid.

use codewall_core::Viewport;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

pub const FRUSTUM_SIZE: f32 = 500.0;
pub const PLANE_SEGMENTS: u32 = 16;
const CAMERA_NEAR: f32 = 10.0;
const CAMERA_FAR: f32 = 2000.0;
const CAMERA_Z: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub z: f32,
}

impl OrthographicCamera {
    pub fn for_aspect(aspect: f32) -> Self {
        let half_width = FRUSTUM_SIZE * aspect / 2.0;
        let half_height = FRUSTUM_SIZE / 2.0;
        Self {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            z: CAMERA_Z,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// A plane in the z = 0 plane, centered on the origin, facing +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub segments: u32,
}

impl PlaneGeometry {
    pub fn for_aspect(aspect: f32) -> Self {
        Self {
            width: FRUSTUM_SIZE * aspect,
            height: FRUSTUM_SIZE,
            segments: PLANE_SEGMENTS,
        }
    }

    /// Vertex positions row by row, top-left first.
    #[allow(clippy::cast_precision_loss)]
    pub fn vertices(&self) -> Vec<[f32; 3]> {
        let n = self.segments;
        let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
        for row in 0..=n {
            let y = self.height / 2.0 - self.height * row as f32 / n as f32;
            for col in 0..=n {
                let x = -self.width / 2.0 + self.width * col as f32 / n as f32;
                vertices.push([x, y, 0.0]);
            }
        }
        vertices
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub position: [f32; 3],
}

fn hex_color(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| f32::from(((hex >> shift) & 0xff) as u8) / 255.0;
    [channel(16), channel(8), channel(0)]
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self {
            sky: hex_color(0xffffff),
            ground: hex_color(0x444444),
            intensity: 1.0,
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: hex_color(0xffffff),
            intensity: 2.0,
            distance: 500.0,
            decay: 2.0,
            position: [100.0, 200.0, 150.0],
        }
    }
}

impl HemisphereLight {
    /// Irradiance on a surface with the given normal; the sky is straight up.
    fn irradiance(&self, normal: [f32; 3]) -> [f32; 3] {
        let weight = 0.5 * normal[1] + 0.5;
        std::array::from_fn(|i| {
            (self.ground[i] + (self.sky[i] - self.ground[i]) * weight) * self.intensity
        })
    }
}

impl PointLight {
    fn irradiance(&self, point: [f32; 3], normal: [f32; 3]) -> [f32; 3] {
        let to_light: [f32; 3] = std::array::from_fn(|i| self.position[i] - point[i]);
        let dist = to_light.iter().map(|c| c * c).sum::<f32>().sqrt();
        if dist <= f32::EPSILON {
            return [0.0; 3];
        }
        let n_dot_l = (0..3).map(|i| normal[i] * to_light[i] / dist).sum::<f32>().max(0.0);
        let attenuation = if self.distance > 0.0 {
            (1.0 - dist / self.distance).clamp(0.0, 1.0).powf(self.decay)
        } else {
            1.0
        };
        std::array::from_fn(|i| self.color[i] * self.intensity * n_dot_l * attenuation)
    }
}

pub struct Scene {
    viewport: Viewport,
    camera: OrthographicCamera,
    plane: PlaneGeometry,
    hemisphere: HemisphereLight,
    point: PointLight,
    /// Per-vertex light, row-major over the plane's vertex grid.
    vertex_light: Vec<[f32; 3]>,
    texture: Option<RgbaImage>,
    scaled: Option<RgbaImage>,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        let aspect = aspect_of(viewport);
        let mut scene = Self {
            viewport,
            camera: OrthographicCamera::for_aspect(aspect),
            plane: PlaneGeometry::for_aspect(aspect),
            hemisphere: HemisphereLight::default(),
            point: PointLight::default(),
            vertex_light: Vec::new(),
            texture: None,
            scaled: None,
        };
        scene.light_vertices();
        scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn plane(&self) -> &PlaneGeometry {
        &self.plane
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn bind_texture(&mut self, texture: RgbaImage) {
        self.texture = Some(texture);
        self.scale_texture();
    }

    /// Recomputes the camera and replaces the plane. The bound texture is
    /// kept and only rescaled.
    pub fn resize(&mut self, viewport: Viewport) {
        let aspect = aspect_of(viewport);
        self.viewport = viewport;
        self.camera = OrthographicCamera::for_aspect(aspect);
        self.plane = PlaneGeometry::for_aspect(aspect);
        self.light_vertices();
        self.scale_texture();
    }

    /// Draws the plane as seen by the camera. Without a texture the frame is
    /// the black clear color.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_base(&self) -> RgbaImage {
        let Viewport { width, height } = self.viewport;
        let Some(scaled) = &self.scaled else {
            return RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        };

        let n = self.plane.segments as f32;
        RgbaImage::from_fn(width, height, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            let light = self.light_at(u * n, v * n);
            let texel = scaled.get_pixel(x, y);
            Rgba([
                shade(texel[0], light[0]),
                shade(texel[1], light[1]),
                shade(texel[2], light[2]),
                255,
            ])
        })
    }

    fn light_vertices(&mut self) {
        let normal = [0.0, 0.0, 1.0];
        let ambient = self.hemisphere.irradiance(normal);
        self.vertex_light = self
            .plane
            .vertices()
            .into_iter()
            .map(|vertex| {
                let direct = self.point.irradiance(vertex, normal);
                std::array::from_fn(|i| ambient[i] + direct[i])
            })
            .collect();
    }

    fn scale_texture(&mut self) {
        let Viewport { width, height } = self.viewport;
        self.scaled = self
            .texture
            .as_ref()
            .map(|texture| imageops::resize(texture, width, height, FilterType::Triangle));
    }

    /// Bilinear interpolation over the vertex grid, in grid coordinates.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn light_at(&self, gx: f32, gy: f32) -> [f32; 3] {
        let n = self.plane.segments;
        let stride = (n + 1) as usize;
        let col = (gx.floor() as u32).min(n - 1);
        let row = (gy.floor() as u32).min(n - 1);
        let fx = gx - col as f32;
        let fy = gy - row as f32;
        let at = |r: u32, c: u32| self.vertex_light[r as usize * stride + c as usize];
        let (tl, tr) = (at(row, col), at(row, col + 1));
        let (bl, br) = (at(row + 1, col), at(row + 1, col + 1));
        std::array::from_fn(|i| {
            let top = tl[i] + (tr[i] - tl[i]) * fx;
            let bottom = bl[i] + (br[i] - bl[i]) * fx;
            top + (bottom - top) * fy
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn aspect_of(viewport: Viewport) -> f32 {
    viewport.width.max(1) as f32 / viewport.height.max(1) as f32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(channel: u8, light: f32) -> u8 {
    (f32::from(channel) * light).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_bounds_follow_aspect() {
        let camera = OrthographicCamera::for_aspect(2.0);
        assert_eq!(camera.left, -500.0);
        assert_eq!(camera.right, 500.0);
        assert_eq!(camera.top, 250.0);
        assert_eq!(camera.bottom, -250.0);
    }

    #[test]
    fn plane_grid_has_corner_vertices() {
        let plane = PlaneGeometry::for_aspect(1.0);
        let vertices = plane.vertices();
        assert_eq!(vertices.len(), 17 * 17);
        assert_eq!(vertices[0], [-250.0, 250.0, 0.0]);
        assert_eq!(vertices[vertices.len() - 1], [250.0, -250.0, 0.0]);
    }

    #[test]
    fn point_light_is_brighter_near_its_projection() {
        let scene = Scene::new(Viewport {
            width: 400,
            height: 400,
        });
        // The light sits above the upper right quadrant.
        let upper_right = scene.light_at(12.0, 4.0);
        let lower_left = scene.light_at(2.0, 14.0);
        assert!(upper_right[0] > lower_left[0]);
    }

    #[test]
    fn untextured_scene_renders_black() {
        let scene = Scene::new(Viewport {
            width: 8,
            height: 4,
        });
        let frame = scene.render_base();
        assert_eq!(frame.dimensions(), (8, 4));
        assert!(frame.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }
}
