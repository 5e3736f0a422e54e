//! The desk scene: two consoles on a shelf, a monitor on each console,
//! keyboard, mouse and mouse pad on the desk, a back wall and a carpet.
//!
//! Vertical positions follow a stacking chain. Each object's base sits on the
//! top of whatever supports it, so changing one height moves everything above
//! it. [`DeskLayout`] holds that chain; [`DeskScene::render`] recomputes it on
//! every call.

use std::fmt::Debug;
use std::path::Path;

use deskscene_assets::{TextureBackend, TextureRegistry};
use deskscene_common::{MeshKind, Placement};
use glam::{Vec2, Vec3, Vec4};

use crate::bridge::ShaderBridge;
use crate::renderer::{DrawTarget, MeshProvider};

/// Texture files and the tags they are registered under, in slot order.
pub const SCENE_TEXTURES: [(&str, &str); 8] = [
    ("wood_oak.jpg", "TEX_WOOD"),
    ("black_plastic.jpg", "TEX_PLASTIC"),
    ("fabric_dark.jpg", "TEX_FABRIC"),
    ("paint_wall.jpg", "TEX_WALL"),
    ("carpet.jpg", "TEX_CARPET"),
    ("monitor_bezel.png", "TEX_BEZEL"),
    ("monitor_screen.jpg", "TEX_SCREEN"),
    ("gloss_reflection.png", "TEX_GLOSS"),
];

const BLACK: Vec4 = Vec4::new(0.05, 0.05, 0.06, 1.0);
const WHITE: Vec4 = Vec4::new(0.92, 0.92, 0.94, 1.0);
const GREEN: Vec4 = Vec4::new(0.10, 0.90, 0.20, 1.0);

/// Uniform scale of the consoles, monitors and desk accessories.
const ACCESSORY_SCALE: f32 = 1.30;
/// Distance of each console/monitor pair from the center line.
const PAIR_X: f32 = 0.38;

const DESK_SIZE: Vec3 = Vec3::new(1.60, 0.03, 0.60);
const SHELF_SIZE: Vec3 = Vec3::new(1.50, 0.05, 0.45);
const SHELF_CENTER: Vec3 = Vec3::new(0.0, 0.32, -0.05);
const CONSOLE_Z: f32 = -0.08;
const STAND_Z: f32 = -0.05;
const SCREEN_OFFSET_Z: f32 = 0.0118;
const GLOSS_OFFSET_Z: f32 = 0.0130;
const GLOSS_ALPHA: f32 = 0.35;
/// Clearance between the mouse base and its shell.
const MOUSE_SHELL_GAP: f32 = 0.004;

fn scaled(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z) * ACCESSORY_SCALE
}

/// Vertical stack of one monitor: foot, post, panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandLayout {
    pub base_x: f32,
    /// Top of the surface the foot rests on.
    pub base_top_y: f32,
    pub foot_size: Vec3,
    pub post_height: f32,
    pub post_radius: f32,
    pub panel_size: Vec3,
    /// Top of the post, where the panel's bottom edge sits.
    pub support_top_y: f32,
    pub panel_center: Vec3,
}

impl StandLayout {
    pub fn on(base_x: f32, base_top_y: f32) -> Self {
        let foot_size = scaled(0.20, 0.02, 0.12);
        let post_height = ACCESSORY_SCALE * 0.03;
        let panel_size = scaled(0.53, 0.33, 0.02);
        let support_top_y = base_top_y + foot_size.y + post_height;
        Self {
            base_x,
            base_top_y,
            foot_size,
            post_height,
            post_radius: ACCESSORY_SCALE * 0.020,
            panel_size,
            support_top_y,
            panel_center: Vec3::new(base_x, support_top_y + panel_size.y * 0.5, STAND_Z),
        }
    }

    pub fn foot_center(&self) -> Vec3 {
        Vec3::new(self.base_x, self.base_top_y + self.foot_size.y * 0.5, STAND_Z)
    }

    /// The cylinder mesh grows upward from its origin.
    pub fn post_base(&self) -> Vec3 {
        Vec3::new(self.base_x, self.base_top_y + self.foot_size.y, STAND_Z)
    }
}

/// The stacking chain of the whole scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeskLayout {
    pub desk_top_y: f32,
    pub shelf_top_y: f32,
    pub left_console_size: Vec3,
    pub left_console_top_y: f32,
    pub right_console_size: Vec3,
    pub right_console_top_y: f32,
    pub left_stand: StandLayout,
    pub right_stand: StandLayout,
}

impl Default for DeskLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl DeskLayout {
    pub fn new() -> Self {
        // The desk is centered on the origin.
        let desk_top_y = DESK_SIZE.y * 0.5;
        let shelf_top_y = SHELF_CENTER.y + SHELF_SIZE.y * 0.5;

        let left_console_size = scaled(0.33, 0.08, 0.27);
        let right_console_size = scaled(0.31, 0.08, 0.26);
        let left_console_top_y = shelf_top_y + left_console_size.y;
        let right_console_top_y = shelf_top_y + right_console_size.y;

        Self {
            desk_top_y,
            shelf_top_y,
            left_console_size,
            left_console_top_y,
            right_console_size,
            right_console_top_y,
            left_stand: StandLayout::on(-PAIR_X, left_console_top_y),
            right_stand: StandLayout::on(PAIR_X, right_console_top_y),
        }
    }

    /// Center of an object of height `height` resting on the desk.
    pub fn on_desk(&self, height: f32) -> f32 {
        self.desk_top_y + height * 0.5
    }

    /// Center of an object of height `height` resting on the shelf.
    pub fn on_shelf(&self, height: f32) -> f32 {
        self.shelf_top_y + height * 0.5
    }
}

/// Texture, material, tiling and opacity of a textured draw.
#[derive(Debug, Clone, Copy)]
struct Skin {
    texture: &'static str,
    material: &'static str,
    uv: Vec2,
    alpha: f32,
}

impl Skin {
    const fn new(texture: &'static str, material: &'static str) -> Self {
        Self {
            texture,
            material,
            uv: Vec2::ONE,
            alpha: 1.0,
        }
    }

    const fn tiled(self, u: f32, v: f32) -> Self {
        Self {
            uv: Vec2::new(u, v),
            ..self
        }
    }

    const fn alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

fn draw_textured<T, H>(
    bridge: &mut ShaderBridge<'_, T, H>,
    kind: MeshKind,
    placement: Placement,
    skin: Skin,
) where
    T: DrawTarget + ?Sized,
    H: Clone + Debug,
{
    bridge.set_transform(&placement);
    bridge.set_uv_scale(skin.uv);
    bridge.set_color(Vec4::new(1.0, 1.0, 1.0, skin.alpha));
    bridge.set_texture(skin.texture);
    bridge.set_material(skin.material);
    bridge.draw(kind);
    bridge.set_uv_scale(Vec2::ONE);
}

fn draw_solid<T, H>(
    bridge: &mut ShaderBridge<'_, T, H>,
    kind: MeshKind,
    placement: Placement,
    color: Vec4,
    material: &str,
) where
    T: DrawTarget + ?Sized,
    H: Clone + Debug,
{
    bridge.set_transform(&placement);
    bridge.set_color(color);
    bridge.set_material(material);
    bridge.draw(kind);
}

/// Stateless composer for the desk scene.
pub struct DeskScene;

impl DeskScene {
    /// Load every primitive kind the scene draws.
    pub fn load_meshes<M: MeshProvider + ?Sized>(meshes: &mut M) {
        for kind in MeshKind::ALL {
            meshes.load(kind);
        }
    }

    /// Load the scene textures from `base` and bind them to their units.
    ///
    /// Failures are logged and skipped. Returns how many textures loaded.
    pub fn load_textures<B: TextureBackend + ?Sized>(
        textures: &mut TextureRegistry<B::Handle>,
        backend: &mut B,
        base: &Path,
    ) -> usize {
        let _span = tracing::info_span!("load_scene_textures").entered();
        let mut loaded = 0;
        for (file, tag) in SCENE_TEXTURES {
            let path = base.join(file);
            match textures.load(backend, &path, tag) {
                Ok(slot) => {
                    tracing::info!("loaded {} as '{tag}' in slot {slot}", path.display());
                    loaded += 1;
                }
                Err(e) => tracing::warn!("texture '{tag}' unavailable: {e}"),
            }
        }
        textures.bind_all(backend);
        loaded
    }

    /// Issue the scene's draw calls, in a fixed order.
    pub fn render<T, H>(bridge: &mut ShaderBridge<'_, T, H>)
    where
        T: DrawTarget + ?Sized,
        H: Clone + Debug,
    {
        let layout = DeskLayout::new();
        bridge.set_lighting(true);

        // Back wall and floor.
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(Vec3::new(4.0, 2.2, 0.03), Vec3::new(0.0, 1.1, -0.80)),
            Skin::new("TEX_WALL", "wall").tiled(3.0, 1.5),
        );
        draw_textured(
            bridge,
            MeshKind::Plane,
            Placement::at(Vec3::new(8.0, 1.0, 8.0), Vec3::new(0.0, -0.002, 0.0)),
            Skin::new("TEX_CARPET", "carpet").tiled(6.0, 6.0),
        );

        // Desk and shelf.
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(DESK_SIZE, Vec3::ZERO),
            Skin::new("TEX_WOOD", "wood").tiled(4.0, 1.5),
        );
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(SHELF_SIZE, SHELF_CENTER),
            Skin::new("TEX_WOOD", "wood").tiled(3.0, 1.0),
        );

        // Consoles on the shelf.
        let left = layout.left_console_size;
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(left, Vec3::new(-PAIR_X, layout.on_shelf(left.y), CONSOLE_Z)),
            Skin::new("TEX_PLASTIC", "plastic"),
        );
        let right = layout.right_console_size;
        let right_center_y = layout.on_shelf(right.y);
        draw_solid(
            bridge,
            MeshKind::Box,
            Placement::at(right, Vec3::new(PAIR_X, right_center_y, CONSOLE_Z)),
            WHITE,
            "plastic",
        );

        // Power ring and button on the right console's front face.
        draw_solid(
            bridge,
            MeshKind::Cylinder,
            Placement::new(
                scaled(0.013, 0.005, 0.013),
                Vec3::new(90.0, 0.0, 0.0),
                Vec3::new(PAIR_X + 0.12, right_center_y, 0.02),
            ),
            GREEN,
            "plastic",
        );
        draw_solid(
            bridge,
            MeshKind::Sphere,
            Placement::at(
                scaled(0.012, 0.012, 0.012),
                Vec3::new(PAIR_X + 0.12, right_center_y, 0.027),
            ),
            WHITE,
            "plastic",
        );

        // Monitors on the consoles.
        Self::draw_stand(bridge, &layout.left_stand);
        Self::draw_stand(bridge, &layout.right_stand);

        // Mouse pad, keyboard and mouse on the desk.
        let pad = scaled(0.33, 0.01, 0.27);
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(pad, Vec3::new(0.55, layout.on_desk(pad.y), 0.05)),
            Skin::new("TEX_FABRIC", "fabric").tiled(2.5, 2.0),
        );
        let keyboard = scaled(0.47, 0.025, 0.15);
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::new(
                keyboard,
                Vec3::new(-3.0, 10.0, 0.0),
                Vec3::new(-0.10, layout.on_desk(keyboard.y), 0.06),
            ),
            Skin::new("TEX_PLASTIC", "plastic"),
        );
        let mouse_base = scaled(0.06, 0.007, 0.09);
        let mouse_turn = Vec3::new(0.0, -20.0, 0.0);
        draw_solid(
            bridge,
            MeshKind::Box,
            Placement::new(
                mouse_base,
                mouse_turn,
                Vec3::new(0.60, layout.on_desk(mouse_base.y), 0.05),
            ),
            BLACK,
            "plastic",
        );
        let shell = scaled(0.05, 0.025, 0.075);
        let shell_y = layout.desk_top_y + mouse_base.y + shell.y * 0.5 + MOUSE_SHELL_GAP;
        draw_solid(
            bridge,
            MeshKind::Sphere,
            Placement::new(shell, mouse_turn, Vec3::new(0.60, shell_y, 0.05)),
            BLACK,
            "plastic",
        );
    }

    fn draw_stand<T, H>(bridge: &mut ShaderBridge<'_, T, H>, stand: &StandLayout)
    where
        T: DrawTarget + ?Sized,
        H: Clone + Debug,
    {
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(stand.foot_size, stand.foot_center()),
            Skin::new("TEX_PLASTIC", "plastic"),
        );
        draw_solid(
            bridge,
            MeshKind::Cylinder,
            Placement::at(
                Vec3::new(stand.post_radius, stand.post_height, stand.post_radius),
                stand.post_base(),
            ),
            BLACK,
            "plastic",
        );

        let panel = stand.panel_center;
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(stand.panel_size, panel),
            Skin::new("TEX_BEZEL", "plastic"),
        );
        // Screen and gloss are thin boxes layered just in front of the bezel.
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(
                scaled(0.495, 0.315, 0.0008),
                panel + Vec3::new(0.0, 0.0, SCREEN_OFFSET_Z),
            ),
            Skin::new("TEX_SCREEN", "screen"),
        );

        // The gloss blends over the screen without writing depth.
        bridge.set_depth_write(false);
        draw_textured(
            bridge,
            MeshKind::Box,
            Placement::at(
                scaled(0.495, 0.315, 0.0006),
                panel + Vec3::new(0.0, 0.0, GLOSS_OFFSET_Z),
            ),
            Skin::new("TEX_GLOSS", "glass").alpha(GLOSS_ALPHA),
        );
        bridge.set_depth_write(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawRecord, RecordingTarget, UniformValue, uniforms};
    use deskscene_assets::{CpuTextureBackend, DecodedImage, MaterialRegistry};

    const EPS: f32 = 1e-5;

    fn full_registry() -> TextureRegistry<u32> {
        let mut backend = CpuTextureBackend::new();
        let mut textures = TextureRegistry::new();
        for (_, tag) in SCENE_TEXTURES {
            textures
                .insert(&mut backend, tag, &DecodedImage::solid(1, 1, [200; 4]))
                .unwrap();
        }
        textures
    }

    fn render_once(textures: &TextureRegistry<u32>) -> RecordingTarget {
        let materials = MaterialRegistry::desk_presets();
        let mut target = RecordingTarget::new();
        DeskScene::load_meshes(&mut target);
        DeskScene::render(&mut ShaderBridge::new(&mut target, textures, &materials));
        target
    }

    fn bottom_of(record: &DrawRecord, height: f32) -> f32 {
        record.position().y - height * 0.5
    }

    #[test]
    fn draw_list_is_deterministic() {
        let textures = full_registry();
        let first = render_once(&textures);
        let second = render_once(&textures);
        assert_eq!(first.records().len(), 22);
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn draw_order_and_kinds() {
        let target = render_once(&full_registry());
        let kinds: Vec<MeshKind> = target.records().iter().map(|r| r.kind).collect();
        let (b, p, c, s) = (
            MeshKind::Box,
            MeshKind::Plane,
            MeshKind::Cylinder,
            MeshKind::Sphere,
        );
        let stand = [b, c, b, b, b];
        let mut expected = vec![b, p, b, b, b, b, c, s];
        expected.extend(stand);
        expected.extend(stand);
        expected.extend([b, b, b, s]);
        assert_eq!(kinds, expected);
    }

    #[test]
    fn textured_draws_use_registered_units() {
        let textures = full_registry();
        let target = render_once(&textures);
        let records = target.records();
        let unit = |tag: &str| textures.find_slot(tag).map(|s| s as u32);
        assert_eq!(records[0].texture_unit, unit("TEX_WALL"));
        assert_eq!(records[1].texture_unit, unit("TEX_CARPET"));
        assert_eq!(records[2].texture_unit, unit("TEX_WOOD"));
        assert_eq!(records[4].texture_unit, unit("TEX_PLASTIC"));
        assert_eq!(records[5].texture_unit, None);
        assert_eq!(records[5].color, WHITE);
        assert_eq!(records[10].texture_unit, unit("TEX_BEZEL"));
        assert_eq!(records[11].texture_unit, unit("TEX_SCREEN"));
        assert_eq!(records[12].texture_unit, unit("TEX_GLOSS"));
        assert_eq!(records[18].texture_unit, unit("TEX_FABRIC"));
        assert_eq!(records[1].uv_scale, Vec2::new(6.0, 6.0));
    }

    #[test]
    fn consoles_rest_on_shelf() {
        let layout = DeskLayout::new();
        let target = render_once(&full_registry());
        let records = target.records();
        assert!((layout.shelf_top_y - 0.345).abs() < EPS);
        let left = bottom_of(&records[4], layout.left_console_size.y);
        let right = bottom_of(&records[5], layout.right_console_size.y);
        assert!((left - layout.shelf_top_y).abs() < EPS);
        assert!((right - layout.shelf_top_y).abs() < EPS);
    }

    #[test]
    fn monitors_stack_on_consoles() {
        let layout = DeskLayout::new();
        for stand in [layout.left_stand, layout.right_stand] {
            let foot_bottom = stand.foot_center().y - stand.foot_size.y * 0.5;
            assert!((foot_bottom - stand.base_top_y).abs() < EPS);
            assert!((stand.post_base().y + stand.post_height - stand.support_top_y).abs() < EPS);
            let panel_bottom = stand.panel_center.y - stand.panel_size.y * 0.5;
            assert!((panel_bottom - stand.support_top_y).abs() < EPS);
        }
        assert_eq!(layout.left_stand.base_top_y, layout.left_console_top_y);
        assert_eq!(layout.right_stand.base_top_y, layout.right_console_top_y);

        let target = render_once(&full_registry());
        let records = target.records();
        assert!(records[10].position().abs_diff_eq(layout.left_stand.panel_center, EPS));
        assert!(records[15].position().abs_diff_eq(layout.right_stand.panel_center, EPS));
    }

    #[test]
    fn desk_items_rest_on_desk() {
        let layout = DeskLayout::new();
        let target = render_once(&full_registry());
        let records = target.records();
        let pad_h = ACCESSORY_SCALE * 0.01;
        assert!((bottom_of(&records[18], pad_h) - layout.desk_top_y).abs() < EPS);
        let mouse_base_h = ACCESSORY_SCALE * 0.007;
        let mouse_bottom = bottom_of(&records[20], mouse_base_h);
        assert!((mouse_bottom - layout.desk_top_y).abs() < EPS);
        let shell_h = ACCESSORY_SCALE * 0.025;
        let shell_bottom = bottom_of(&records[21], shell_h);
        let shell_rest = layout.desk_top_y + mouse_base_h + MOUSE_SHELL_GAP;
        assert!((shell_bottom - shell_rest).abs() < EPS);
    }

    #[test]
    fn gloss_overlay_skips_depth_writes_only() {
        let target = render_once(&full_registry());
        let no_depth: Vec<usize> = target
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.depth_write)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(no_depth, vec![12, 17]);
        assert!((target.records()[12].color.w - GLOSS_ALPHA).abs() < EPS);
        assert!(target.depth_write());
    }

    #[test]
    fn uv_scale_is_reset_after_render() {
        let target = render_once(&full_registry());
        assert_eq!(
            target.uniform(uniforms::UV_SCALE),
            Some(UniformValue::Vec2(Vec2::ONE))
        );
    }

    #[test]
    fn missing_textures_still_render_every_object() {
        let target = render_once(&TextureRegistry::new());
        assert_eq!(target.records().len(), 22);
        assert!(target.records().iter().all(|r| r.texture_unit.is_none()));
    }

    #[test]
    fn load_textures_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["wood_oak.jpg", "monitor_bezel.png"] {
            image::RgbImage::from_pixel(2, 2, image::Rgb([90, 60, 30]))
                .save(dir.path().join(file))
                .unwrap();
        }
        let mut backend = CpuTextureBackend::new();
        let mut textures = TextureRegistry::new();
        let loaded = DeskScene::load_textures(&mut textures, &mut backend, dir.path());
        assert_eq!(loaded, 2);
        assert_eq!(textures.find_slot("TEX_WOOD"), Some(0));
        assert_eq!(textures.find_slot("TEX_BEZEL"), Some(1));
        assert_eq!(textures.find_slot("TEX_CARPET"), None);
        assert_eq!(backend.bound(1), textures.find_handle("TEX_BEZEL").copied());
    }
}
