//! The projected display: a textured plane, an effect composer and the frame
//! counter driving the animation loop.

mod composer;
mod passes;
mod scene;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use codewall_core::{Aesthetic, Viewport};
use engine_logging::{engine_frame_trace, engine_info, set_display_frame};
use image::RgbaImage;

pub use composer::{EffectComposer, Pass};
pub use passes::FrameContext;
pub use scene::{
    HemisphereLight, OrthographicCamera, PlaneGeometry, PointLight, Scene, FRUSTUM_SIZE,
    PLANE_SEGMENTS,
};

/// Shared between the host's main loop and its animation thread.
pub type SharedDisplay = Arc<Mutex<Display>>;

pub struct Display {
    scene: Scene,
    composer: EffectComposer,
    aesthetic: Option<Aesthetic>,
    running: bool,
    frame: u64,
    elapsed: Duration,
}

impl Display {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            scene: Scene::new(viewport),
            composer: EffectComposer::new(),
            aesthetic: None,
            running: false,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn shared(viewport: Viewport) -> SharedDisplay {
        Arc::new(Mutex::new(Self::new(viewport)))
    }

    /// Binds a new texture and rebuilds the pass chain for `aesthetic`.
    /// Returns `true` the first time, when the display starts running.
    pub fn present(&mut self, texture: RgbaImage, aesthetic: Aesthetic) -> bool {
        let (width, height) = texture.dimensions();
        self.scene.bind_texture(texture);
        self.composer.rebuild(aesthetic);
        self.aesthetic = Some(aesthetic);

        if self.running {
            engine_info!("Display updated: {width}x{height} texture, {aesthetic}");
            false
        } else {
            self.running = true;
            engine_info!("Display started: {width}x{height} texture, {aesthetic}");
            true
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
        engine_info!("Display resized to {}x{}", viewport.width, viewport.height);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn aesthetic(&self) -> Option<Aesthetic> {
        self.aesthetic
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn composer(&self) -> &EffectComposer {
        &self.composer
    }

    /// Advances the clock by `delta` and renders the next frame, or `None`
    /// before the display has started.
    pub fn render_frame(&mut self, delta: Duration) -> Option<RgbaImage> {
        if !self.running {
            return None;
        }
        self.frame += 1;
        self.elapsed += delta;
        set_display_frame(self.frame);

        let ctx = FrameContext {
            frame: self.frame,
            elapsed: self.elapsed.as_secs_f32(),
        };
        let image = self.composer.render(&self.scene, ctx);
        engine_frame_trace!("rendered {} passes", self.composer.passes().len());
        Some(image)
    }
}
