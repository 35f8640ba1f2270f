//! CPU implementations of the postprocessing passes.
//!
//! Each pass reads and writes one RGBA frame in place. Color math runs on
//! normalized `f32` channels; alpha is always left opaque.

use codewall_core::{BloomSettings, DotScreenSettings, EffectPass, FilmSettings, GlitchSettings};
use image::{Rgba, RgbaImage};

/// Per-frame inputs for time-varying passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame: u64,
    /// Seconds since the display started.
    pub elapsed: f32,
}

pub fn apply(pass: &EffectPass, image: &mut RgbaImage, ctx: FrameContext) {
    match pass {
        EffectPass::Glitch(settings) => glitch(image, settings, ctx),
        EffectPass::Film(settings) => film(image, settings, ctx),
        EffectPass::Bloom(settings) => bloom(image, settings),
        EffectPass::Pixelation { granularity } => pixelate(image, *granularity),
        EffectPass::DotScreen(settings) => dot_screen(image, settings),
    }
}

type Color = [f32; 3];

fn read(pixel: &Rgba<u8>) -> Color {
    [
        f32::from(pixel[0]) / 255.0,
        f32::from(pixel[1]) / 255.0,
        f32::from(pixel[2]) / 255.0,
    ]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write(color: Color) -> Rgba<u8> {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([to_u8(color[0]), to_u8(color[1]), to_u8(color[2]), 255])
}

fn luminance(color: Color) -> f32 {
    0.2126 * color[0] + 0.7152 * color[1] + 0.0722 * color[2]
}

/// SplitMix64 finalizer; stable across runs so frames are reproducible.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Fires on roughly one frame in twelve. A fired frame shears random
/// horizontal bands and splits the color channels.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn glitch(image: &mut RgbaImage, settings: &GlitchSettings, ctx: FrameContext) {
    let seed = mix(ctx.frame);
    if seed % 12 != 0 {
        return;
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let bands = (settings.dt_size / 32).clamp(1, height);
    let band_height = height.div_ceil(bands);
    let max_shift = i64::from((width / 10).max(1));
    let split = (mix(seed ^ 0x5bd1) % 6) as i64 + 2;

    let source = image.clone();
    let sample = |x: i64, y: u32| -> Color {
        let x = x.rem_euclid(i64::from(width)) as u32;
        read(source.get_pixel(x, y))
    };

    for y in 0..height {
        let band = u64::from(y / band_height);
        let band_seed = mix(seed ^ band.wrapping_mul(0x2545_f491));
        let shift = if band_seed % 3 == 0 {
            (band_seed >> 8) as i64 % (2 * max_shift) - max_shift
        } else {
            0
        };
        for x in 0..width {
            let base = i64::from(x) + shift;
            let red = sample(base + split, y)[0];
            let green = sample(base, y)[1];
            let blue = sample(base - split, y)[2];
            image.put_pixel(x, y, write([red, green, blue]));
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn film(image: &mut RgbaImage, settings: &FilmSettings, ctx: FrameContext) {
    let (width, height) = image.dimensions();
    let density = (height as f32 * settings.scanline_density).round();
    let time = ctx.elapsed;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let u = (x as f32 + 0.5) / width as f32;
        let v = (y as f32 + 0.5) / height as f32;
        let texel = read(pixel);
        let mut color = texel;

        if settings.noise {
            let mut n = u * v * time * 1000.0;
            n = (n % 13.0) * (n % 123.0);
            n %= 0.01;
            let grain = (0.1 + n * 100.0).clamp(0.0, 1.0);
            for i in 0..3 {
                color[i] += texel[i] * grain * settings.noise_intensity;
            }
        }

        if settings.scanlines {
            let (s, c) = (v * density).sin_cos();
            let lines = [texel[0] * s, texel[1] * c, texel[2] * s];
            for i in 0..3 {
                color[i] += (lines[i] - color[i]) * settings.scanline_intensity;
            }
        }

        if settings.greyscale {
            color = [luminance(color); 3];
        }

        if settings.sepia {
            let [r, g, b] = color;
            color = [
                r * 0.393 + g * 0.769 + b * 0.189,
                r * 0.349 + g * 0.686 + b * 0.168,
                r * 0.272 + g * 0.534 + b * 0.131,
            ];
        }

        if settings.vignette {
            let du = u - 0.5;
            let dv = v - 0.5;
            if settings.eskil {
                let du = du * settings.vignette_offset;
                let dv = dv * settings.vignette_offset;
                let amount = du * du + dv * dv;
                let target = 1.0 - settings.vignette_darkness;
                for channel in &mut color {
                    *channel += (target - *channel) * amount;
                }
            } else {
                let dist = (du * du + dv * dv).sqrt();
                let factor = smoothstep(
                    0.8,
                    settings.vignette_offset * 0.799,
                    dist * (settings.vignette_darkness + settings.vignette_offset),
                );
                for channel in &mut color {
                    *channel *= factor;
                }
            }
        }

        *pixel = write(color);
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() <= f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Extracts bright areas, blurs them and blends them back over the frame.
fn bloom(image: &mut RgbaImage, settings: &BloomSettings) {
    let (width, height) = image.dimensions();
    let mut bright: Vec<Color> = image
        .pixels()
        .map(|pixel| {
            let color = read(pixel);
            let weight = luminance(color).powf(settings.distinction);
            color.map(|c| c * weight)
        })
        .collect();

    let radius = settings.kernel_size.radius();
    box_blur(&mut bright, width as usize, height as usize, radius as usize);

    for (pixel, glow) in image.pixels_mut().zip(bright) {
        let base = read(pixel);
        let glow = glow.map(|c| c * settings.intensity);
        let blended: Color = if settings.screen_mode {
            std::array::from_fn(|i| {
                let g = glow[i].clamp(0.0, 1.0);
                1.0 - (1.0 - base[i]) * (1.0 - g)
            })
        } else {
            std::array::from_fn(|i| base[i] + glow[i])
        };
        *pixel = write(blended);
    }
}

/// Separable box blur with clamped edges.
#[allow(clippy::cast_precision_loss)]
fn box_blur(buffer: &mut [Color], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let mut scratch = vec![[0.0_f32; 3]; buffer.len()];
    let window = (2 * radius + 1) as f32;

    for y in 0..height {
        let row = &buffer[y * width..(y + 1) * width];
        for x in 0..width {
            let mut sum = [0.0_f32; 3];
            for k in 0..=2 * radius {
                let sx = (x + k).saturating_sub(radius).min(width - 1);
                for i in 0..3 {
                    sum[i] += row[sx][i];
                }
            }
            scratch[y * width + x] = sum.map(|s| s / window);
        }
    }

    for x in 0..width {
        for y in 0..height {
            let mut sum = [0.0_f32; 3];
            for k in 0..=2 * radius {
                let sy = (y + k).saturating_sub(radius).min(height - 1);
                for i in 0..3 {
                    sum[i] += scratch[sy * width + x][i];
                }
            }
            buffer[y * width + x] = sum.map(|s| s / window);
        }
    }
}

/// Snaps every pixel to the top-left sample of its `granularity`-sized cell.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixelate(image: &mut RgbaImage, granularity: f32) {
    if granularity <= 1.0 {
        return;
    }
    let source = image.clone();
    let snap = |coord: u32| ((coord as f32 / granularity).floor() * granularity) as u32;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        *pixel = *source.get_pixel(snap(x), snap(y));
    }
}

/// Greyscale halftone: the average intensity pushed through a rotated dot
/// pattern.
#[allow(clippy::cast_precision_loss)]
fn dot_screen(image: &mut RgbaImage, settings: &DotScreenSettings) {
    let (sin, cos) = settings.angle.sin_cos();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let tx = x as f32 + 0.5;
        let ty = y as f32 + 0.5;
        let px = (cos * tx - sin * ty) * settings.scale;
        let py = (sin * tx + cos * ty) * settings.scale;
        let pattern = px.sin() * py.sin() * 4.0;

        let [r, g, b] = read(pixel);
        let average = (r + g + b) / 3.0;
        let value = average * 10.0 - 5.0 + pattern;
        *pixel = write([value; 3]);
    }
}
