use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{SceneWorld, SheetLayout, Sprite, SpriteAnchor};
use crate::sprite_keys::sprite_image_path;

use super::{world_to_screen, Viewport, PLACEHOLDER_HALF_SIZE_PX};

const CLEAR_COLOR: [u8; 4] = [24, 36, 28, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    asset_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let viewport = self.viewport;
        let zoom = world.camera().effective_zoom();
        let frame = self.pixels.frame_mut();
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&CLEAR_COLOR);
        }

        let sprites = world.sprites();
        for index in world.draw_order() {
            let sprite = &sprites[index];
            let (screen_x, screen_y) = world_to_screen(sprite.position(), world.camera(), viewport);
            match resolve_cached_sprite(
                &mut self.sprite_cache,
                &mut self.warned_missing_sprite_keys,
                &self.asset_root,
                sprite.texture(),
            ) {
                Some(image) => {
                    let source = sheet_frame_rect(image, sprite.sheet(), sprite.frame());
                    let (draw_w, draw_h) = scaled_dimensions(source, zoom);
                    let (left, top) =
                        anchored_top_left((screen_x, screen_y), sprite.anchor(), draw_w, draw_h);
                    draw_sprite_region_scaled(
                        frame,
                        viewport,
                        (left, top),
                        image,
                        source,
                        zoom,
                    );
                }
                None => draw_placeholder(frame, viewport, sprite, (screen_x, screen_y)),
            }
        }

        self.pixels.render()
    }
}

fn draw_placeholder(frame: &mut [u8], viewport: Viewport, sprite: &Sprite, screen: (i32, i32)) {
    let (cx, cy) = match sprite.anchor() {
        SpriteAnchor::Center => screen,
        SpriteAnchor::TopLeft => (
            screen.0 + PLACEHOLDER_HALF_SIZE_PX,
            screen.1 + PLACEHOLDER_HALF_SIZE_PX,
        ),
    };
    draw_square(
        frame,
        viewport,
        cx,
        cy,
        PLACEHOLDER_HALF_SIZE_PX,
        PLACEHOLDER_COLOR,
    );
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let sprite = match sprite_image_path(asset_root, key) {
            Ok(path) => match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    warn_sprite_load_once(warned_missing_sprite_keys, key, Some(&path), &reason);
                    None
                }
            },
            Err(error) => {
                let reason = format!("invalid_key:{error}");
                warn_sprite_load_once(warned_missing_sprite_keys, key, None, &reason);
                None
            }
        };
        cache.insert(key.to_string(), sprite);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

/// Source rectangle of `frame` in a sheet laid out row-major. Sprites without a
/// sheet use the whole image.
fn sheet_frame_rect(image: &LoadedSprite, sheet: Option<SheetLayout>, frame: u32) -> SourceRect {
    let whole = SourceRect {
        x: 0,
        y: 0,
        width: image.width,
        height: image.height,
    };
    let Some(sheet) = sheet.filter(|sheet| sheet.columns > 0 && sheet.rows > 0) else {
        return whole;
    };
    let frame_w = image.width / sheet.columns;
    let frame_h = image.height / sheet.rows;
    let frame = frame % (sheet.columns * sheet.rows);
    SourceRect {
        x: (frame % sheet.columns) * frame_w,
        y: (frame / sheet.columns) * frame_h,
        width: frame_w,
        height: frame_h,
    }
}

fn scaled_dimensions(source: SourceRect, scale: f32) -> (u32, u32) {
    let scale = normalized_sprite_scale(scale);
    let width = (source.width as f32 * scale).round().max(1.0) as u32;
    let height = (source.height as f32 * scale).round().max(1.0) as u32;
    (width, height)
}

fn anchored_top_left(screen: (i32, i32), anchor: SpriteAnchor, width: u32, height: u32) -> (i32, i32) {
    match anchor {
        SpriteAnchor::Center => (screen.0 - width as i32 / 2, screen.1 - height as i32 / 2),
        SpriteAnchor::TopLeft => screen,
    }
}

fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(target) = frame.get_mut(byte_offset..byte_offset + 4) {
        target.copy_from_slice(&color);
    }
}

fn draw_square(frame: &mut [u8], viewport: Viewport, cx: i32, cy: i32, half_size: i32, color: [u8; 4]) {
    for y in (cy - half_size)..=(cy + half_size) {
        if y < 0 || y >= viewport.height as i32 {
            continue;
        }
        for x in (cx - half_size)..=(cx + half_size) {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn draw_sprite_region_scaled(
    frame: &mut [u8],
    viewport: Viewport,
    top_left: (i32, i32),
    image: &LoadedSprite,
    source: SourceRect,
    scale: f32,
) {
    if source.width == 0 || source.height == 0 || viewport.width == 0 || viewport.height == 0 {
        return;
    }
    if image.rgba.len() < image.width as usize * image.height as usize * 4 {
        return;
    }

    let inv_scale = normalized_sprite_scale(scale).recip();
    let (scaled_w, scaled_h) = scaled_dimensions(source, scale);
    let (left, top) = top_left;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + scaled_w as i32).min(viewport.width as i32);
    let draw_bottom = (top + scaled_h as i32).min(viewport.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = viewport.width as usize;
    let image_width = image.width as usize;
    for out_y in draw_top..draw_bottom {
        let src_y = (((out_y - top) as f32 * inv_scale).floor() as u32).min(source.height - 1);
        let src_row = (source.y + src_y) as usize * image_width;
        let dst_row = out_y as usize * frame_width;
        for out_x in draw_left..draw_right {
            let src_x = (((out_x - left) as f32 * inv_scale).floor() as u32).min(source.width - 1);
            let src = (src_row + (source.x + src_x) as usize) * 4;
            let alpha = image.rgba[src + 3];
            if alpha == 0 {
                continue;
            }
            let dst = (dst_row + out_x as usize) * 4;
            frame[dst..dst + 3].copy_from_slice(&image.rgba[src..src + 3]);
            frame[dst + 3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{EngineBindings, SpriteDesc, Vec2};

    const VIEWPORT: Viewport = Viewport {
        width: 8,
        height: 8,
    };

    fn solid_sprite(width: u32, height: u32, color: [u8; 4]) -> LoadedSprite {
        LoadedSprite {
            width,
            height,
            rgba: color.repeat((width * height) as usize),
        }
    }

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn sheet_frame_rect_walks_row_major() {
        let image = solid_sprite(128, 192, [0; 4]);
        let sheet = Some(SheetLayout {
            columns: 4,
            rows: 4,
        });
        assert_eq!(
            sheet_frame_rect(&image, sheet, 9),
            SourceRect {
                x: 32,
                y: 96,
                width: 32,
                height: 48
            }
        );
        assert_eq!(sheet_frame_rect(&image, None, 9).width, 128);
    }

    #[test]
    fn anchors_offset_top_left() {
        assert_eq!(anchored_top_left((10, 10), SpriteAnchor::Center, 4, 6), (8, 7));
        assert_eq!(anchored_top_left((10, 10), SpriteAnchor::TopLeft, 4, 6), (10, 10));
    }

    #[test]
    fn scaled_dimensions_never_collapse_to_zero() {
        let source = SourceRect {
            x: 0,
            y: 0,
            width: 3,
            height: 3,
        };
        assert_eq!(scaled_dimensions(source, 0.1), (1, 1));
        assert_eq!(scaled_dimensions(source, 2.0), (6, 6));
        assert_eq!(scaled_dimensions(source, f32::NAN), (3, 3));
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds() {
        let mut frame = vec![0u8; 4 * 4];
        write_pixel_rgba_clipped(&mut frame, 2, -1, 0, [9; 4]);
        write_pixel_rgba_clipped(&mut frame, 2, 2, 0, [9; 4]);
        write_pixel_rgba_clipped(&mut frame, 2, 0, 2, [9; 4]);
        assert!(frame.iter().all(|byte| *byte == 0));
        write_pixel_rgba_clipped(&mut frame, 2, 1, 1, [9; 4]);
        assert_eq!(&frame[12..16], &[9; 4]);
    }

    #[test]
    fn sprite_region_draw_clips_and_skips_transparent_pixels() {
        let mut frame = vec![0u8; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        let mut image = solid_sprite(2, 2, [200, 100, 50, 255]);
        image.rgba[3] = 0;
        let source = SourceRect {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        draw_sprite_region_scaled(&mut frame, VIEWPORT, (-1, 6), &image, source, 2.0);

        assert_eq!(pixel(&frame, 0, 6), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 1, 6), [200, 100, 50, 255]);
        assert_eq!(pixel(&frame, 2, 7), [200, 100, 50, 255]);
        assert_eq!(pixel(&frame, 3, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn missing_sprite_is_cached_and_warned_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        assert!(resolve_cached_sprite(&mut cache, &mut warned, dir.path(), "tree").is_none());
        assert!(resolve_cached_sprite(&mut cache, &mut warned, dir.path(), "tree").is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(warned.len(), 1);
    }

    #[test]
    fn top_left_placeholder_sits_inside_its_cell() {
        let mut world = SceneWorld::default();
        let handle = world.create_sprite(
            SpriteDesc::new("house-1", Vec2::default()).with_anchor(SpriteAnchor::TopLeft),
        );
        let sprite = world.sprite(handle).expect("sprite");
        let mut frame = vec![0u8; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        draw_placeholder(&mut frame, VIEWPORT, sprite, (0, 0));
        assert_eq!(pixel(&frame, 0, 0), PLACEHOLDER_COLOR);
    }
}
