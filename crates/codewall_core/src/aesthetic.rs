//! Named postprocessing presets.
//!
//! Each aesthetic is a fixed, ordered list of effect passes. The display
//! pipeline always renders the scene first and then runs these passes in
//! order; the last pass is the one that reaches the screen.

use std::fmt;
use std::str::FromStr;

use crate::{ControlId, OptionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aesthetic {
    #[default]
    Gibson,
    Sadboy,
    ScorchedTube,
    Ntef,
    BadLifeChoices,
}

impl Aesthetic {
    pub const ALL: [Aesthetic; 5] = [
        Aesthetic::Gibson,
        Aesthetic::Sadboy,
        Aesthetic::ScorchedTube,
        Aesthetic::Ntef,
        Aesthetic::BadLifeChoices,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Aesthetic::Gibson => "gibson",
            Aesthetic::Sadboy => "sadboy",
            Aesthetic::ScorchedTube => "scorchedtube",
            Aesthetic::Ntef => "ntef",
            Aesthetic::BadLifeChoices => "badlifechoices",
        }
    }

    /// The ordered effect passes for this preset.
    pub fn effect_stack(self) -> Vec<EffectPass> {
        match self {
            Aesthetic::Gibson => vec![
                EffectPass::Glitch(GlitchSettings { dt_size: 512 }),
                EffectPass::Film(FilmSettings {
                    vignette: true,
                    eskil: true,
                    scanline_density: 14.0,
                    scanline_intensity: 0.1,
                    vignette_offset: 0.75,
                    vignette_darkness: 2.0,
                    ..FilmSettings::default()
                }),
            ],
            Aesthetic::Sadboy => vec![
                EffectPass::Bloom(BloomSettings {
                    kernel_size: KernelSize::Small,
                    intensity: 5.0,
                    distinction: 2.0,
                    ..BloomSettings::default()
                }),
                EffectPass::Film(FilmSettings {
                    vignette: true,
                    eskil: true,
                    scanlines: false,
                    vignette_darkness: 2.0,
                    ..FilmSettings::default()
                }),
            ],
            Aesthetic::ScorchedTube => vec![
                EffectPass::Bloom(BloomSettings {
                    kernel_size: KernelSize::Medium,
                    intensity: 10.0,
                    distinction: 2.0,
                    screen_mode: false,
                }),
                EffectPass::Film(FilmSettings {
                    vignette: true,
                    eskil: true,
                    scanline_density: 14.0,
                    scanline_intensity: 0.1,
                    vignette_offset: 0.75,
                    vignette_darkness: 4.0,
                    ..FilmSettings::default()
                }),
            ],
            Aesthetic::Ntef => vec![
                EffectPass::Bloom(BloomSettings {
                    kernel_size: KernelSize::Small,
                    intensity: 5.0,
                    distinction: 2.0,
                    ..BloomSettings::default()
                }),
                EffectPass::Pixelation { granularity: 2.5 },
                EffectPass::Film(FilmSettings {
                    vignette: true,
                    eskil: true,
                    scanline_density: 14.0,
                    scanline_intensity: 0.1,
                    vignette_offset: 0.75,
                    vignette_darkness: 2.0,
                    ..FilmSettings::default()
                }),
            ],
            Aesthetic::BadLifeChoices => vec![
                EffectPass::Bloom(BloomSettings {
                    kernel_size: KernelSize::Small,
                    intensity: 5.0,
                    distinction: 2.0,
                    ..BloomSettings::default()
                }),
                EffectPass::DotScreen(DotScreenSettings {
                    scale: 1.5,
                    ..DotScreenSettings::default()
                }),
                EffectPass::Film(FilmSettings {
                    vignette: true,
                    eskil: true,
                    scanlines: false,
                    vignette_darkness: 2.0,
                    noise_intensity: 0.75,
                    ..FilmSettings::default()
                }),
            ],
        }
    }
}

impl fmt::Display for Aesthetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aesthetic {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Aesthetic::ALL
            .into_iter()
            .find(|aesthetic| aesthetic.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                OptionError::invalid(ControlId::AestheticSelect, value, "unknown aesthetic")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectPass {
    Glitch(GlitchSettings),
    Film(FilmSettings),
    Bloom(BloomSettings),
    Pixelation { granularity: f32 },
    DotScreen(DotScreenSettings),
}

impl EffectPass {
    pub fn label(&self) -> &'static str {
        match self {
            EffectPass::Glitch(_) => "glitch",
            EffectPass::Film(_) => "film",
            EffectPass::Bloom(_) => "bloom",
            EffectPass::Pixelation { .. } => "pixelation",
            EffectPass::DotScreen(_) => "dot-screen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlitchSettings {
    /// Side length of the random data texture driving the glitch.
    pub dt_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmSettings {
    pub greyscale: bool,
    pub sepia: bool,
    pub vignette: bool,
    /// Use the "eskil" vignette falloff instead of the plain radial one.
    pub eskil: bool,
    pub scanlines: bool,
    pub noise: bool,
    pub noise_intensity: f32,
    pub scanline_intensity: f32,
    pub scanline_density: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
}

impl Default for FilmSettings {
    fn default() -> Self {
        Self {
            greyscale: false,
            sepia: false,
            vignette: false,
            eskil: false,
            scanlines: true,
            noise: true,
            noise_intensity: 0.5,
            scanline_intensity: 0.05,
            scanline_density: 1.0,
            vignette_offset: 1.0,
            vignette_darkness: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelSize {
    VerySmall,
    Small,
    Medium,
    Large,
}

impl KernelSize {
    /// Blur radius in pixels.
    pub fn radius(self) -> u32 {
        match self {
            KernelSize::VerySmall => 1,
            KernelSize::Small => 2,
            KernelSize::Medium => 4,
            KernelSize::Large => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub kernel_size: KernelSize,
    pub intensity: f32,
    /// Luminance threshold sharpness; higher means only brighter pixels bloom.
    pub distinction: f32,
    /// Blend with screen mode instead of additive blending.
    pub screen_mode: bool,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            kernel_size: KernelSize::Large,
            intensity: 1.0,
            distinction: 1.0,
            screen_mode: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotScreenSettings {
    pub angle: f32,
    pub scale: f32,
}

impl Default for DotScreenSettings {
    fn default() -> Self {
        Self {
            angle: 1.57,
            scale: 1.0,
        }
    }
}
