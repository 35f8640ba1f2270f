use codewall_core::{Aesthetic, EffectPass};
use engine_logging::engine_debug;
use image::{Rgba, RgbaImage};

use super::passes::{self, FrameContext};
use super::scene::Scene;

#[derive(Debug, Clone, PartialEq)]
pub enum Pass {
    /// Draws the scene, replacing whatever the frame held.
    Render,
    Effect(EffectPass),
}

impl Pass {
    pub fn label(&self) -> &'static str {
        match self {
            Pass::Render => "render",
            Pass::Effect(effect) => effect.label(),
        }
    }
}

/// Ordered pass chain. Only the last pass renders to the screen.
#[derive(Debug, Clone, Default)]
pub struct EffectComposer {
    passes: Vec<Pass>,
}

impl EffectComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.passes.clear();
    }

    pub fn add_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    /// Reset, base render pass, then the preset's passes in order.
    pub fn rebuild(&mut self, aesthetic: Aesthetic) {
        self.reset();
        self.add_pass(Pass::Render);
        for effect in aesthetic.effect_stack() {
            self.add_pass(Pass::Effect(effect));
        }
        engine_debug!(
            "Composer rebuilt for {aesthetic}: {}",
            self.passes
                .iter()
                .map(Pass::label)
                .collect::<Vec<_>>()
                .join(" -> ")
        );
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn renders_to_screen(&self, index: usize) -> bool {
        index + 1 == self.passes.len()
    }

    pub fn render(&self, scene: &Scene, ctx: FrameContext) -> RgbaImage {
        let mut frame: Option<RgbaImage> = None;
        for pass in &self.passes {
            match pass {
                Pass::Render => frame = Some(scene.render_base()),
                Pass::Effect(effect) => {
                    if let Some(image) = frame.as_mut() {
                        passes::apply(effect, image, ctx);
                    }
                }
            }
        }
        frame.unwrap_or_else(|| {
            let viewport = scene.viewport();
            RgbaImage::from_pixel(viewport.width, viewport.height, Rgba([0, 0, 0, 255]))
        })
    }
}
