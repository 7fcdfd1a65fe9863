//! Built-in sprite sheet, palettes and text tables
//!
//! The simulation only needs sprite dimensions; the renderer needs the cell
//! grids and palettes. Both go through `SpriteAssets` so a different art set
//! can be plugged in without touching gameplay code.

use serde::{Deserialize, Serialize};

use crate::renderer::pixel::Rgba;
use crate::renderer::sprite::{Palette, PaletteId, Sprite};

/// Every sprite the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteName {
    Motorcycle,
    MotorcycleDuck,
    Car,
    Truck,
    Van,
    Bus,
    SemiTruck,
    BirdUp,
    BirdDown,
    Billboard,
}

impl SpriteName {
    pub const ALL: [SpriteName; 10] = [
        SpriteName::Motorcycle,
        SpriteName::MotorcycleDuck,
        SpriteName::Car,
        SpriteName::Truck,
        SpriteName::Van,
        SpriteName::Bus,
        SpriteName::SemiTruck,
        SpriteName::BirdUp,
        SpriteName::BirdDown,
        SpriteName::Billboard,
    ];
}

/// Palette slots that vehicle paint variants override
pub const BODY_INDEX: usize = 3;
pub const ACCENT_INDEX: usize = 8;

/// One vehicle paint job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleColors {
    pub body: Rgba,
    pub accent: Rgba,
}

pub const VEHICLE_COLORS: [VehicleColors; 8] = [
    VehicleColors { body: Rgba::hex(0xd32f2f), accent: Rgba::hex(0x8e1f1f) },
    VehicleColors { body: Rgba::hex(0x1976d2), accent: Rgba::hex(0x0d47a1) },
    VehicleColors { body: Rgba::hex(0x388e3c), accent: Rgba::hex(0x1b5e20) },
    VehicleColors { body: Rgba::hex(0xfbc02d), accent: Rgba::hex(0xf57f17) },
    VehicleColors { body: Rgba::hex(0xeeeeee), accent: Rgba::hex(0x9e9e9e) },
    VehicleColors { body: Rgba::hex(0x424242), accent: Rgba::hex(0x212121) },
    VehicleColors { body: Rgba::hex(0xb0bec5), accent: Rgba::hex(0x607d8b) },
    VehicleColors { body: Rgba::hex(0xf57c00), accent: Rgba::hex(0xbf360c) },
];

/// Billboard messages (1-3 lines each)
pub const BILLBOARD_MESSAGES: &[&[&str]] = &[
    &["Eastside", "Harley"],
    &["Emerald City", "Harley"],
    &["Harley", "Davidson", "Motorcycles"],
    &["Life is", "short, roads", "are long."],
    &["Two wheels,", "One love", "#BikerLife"],
    &["YOU GOT", "THIS!"],
    &["Eat. Sleep.", "Ride.", "Repeat."],
    &["NICE", "MOVES!"],
    &["LEGENDARY!"],
    &["STAY", "FOCUSED!"],
    &["KEEP", "GOING!"],
    &["RIDE ON!"],
    &["SKILLED", "RIDER!"],
    &["TOO FAST!"],
    &["BEAST", "MODE!"],
    &["DANGER", "ZONE!"],
];

/// Provider of sprite grids and palettes
pub trait SpriteAssets {
    fn sprite(&self, name: SpriteName) -> &Sprite;

    fn default_palette(&self) -> &Palette;

    /// Paint jobs available to vehicles
    fn vehicle_colors(&self) -> &[VehicleColors];

    /// Default palette with the body/accent slots repainted
    fn palette_variant(&self, variant: u8) -> Palette {
        let mut palette = self.default_palette().clone();
        let colors = self.vehicle_colors();
        if let Some(paint) = colors.get(variant as usize % colors.len().max(1)) {
            if palette.colors.len() > ACCENT_INDEX {
                palette.colors[BODY_INDEX] = paint.body;
                palette.colors[ACCENT_INDEX] = paint.accent;
            }
        }
        palette.id = PaletteId::Vehicle(variant);
        palette
    }

    /// Pixel size of a sprite at `scale`
    fn dimensions(&self, name: SpriteName, scale: u32) -> (f32, f32) {
        self.sprite(name).dimensions(scale)
    }
}

const MOTORCYCLE: &[&str] = &[
    "........fff",
    ".......fffff",
    ".......ff44f",
    ".......fffff",
    "........99",
    ".......6666",
    "......66666",
    "......666666",
    "......666.666",
    "......666..6699",
    "......666...55",
    ".....66666..55",
    "....eeeeeeeee5",
    "...eeeeeeeeeeee7",
    "..222..555555.222",
    ".22222.......22222",
    "2225222.....2225222",
    "2255522.....2255522",
    ".22222.......22222",
    "..222.........222",
];

const MOTORCYCLE_DUCK: &[&str] = &[
    ".........fff",
    "........fffff",
    ".....66fff44f",
    "....666666699",
    "....6666666655",
    "....666.....55",
    "...eeeeeeeeee5",
    "..eeeeeeeeeeeee7",
    "..222..555555.222",
    ".22222.......22222",
    "2225222.....2225222",
    ".22222.......22222",
    "..222.........222",
];

const CAR: &[&str] = &[
    "..........11111111",
    ".........1444414441",
    "........14444144441",
    "...11111333333333331111",
    ".1333333333333333333333",
    "73333333388888333333333",
    "13333333333333333333331",
    "1188222888888888882228811",
    "...25552..........25552",
    "....222............222",
];

const TRUCK: &[&str] = &[
    "..11111111",
    ".1444441331",
    ".1444441333",
    "1133333333311111111111111",
    "1333333333333333333333331",
    "7333333333333333333333333",
    "1333333388888888888888331",
    "1133822288888888888222831",
    "...222522..........22252",
    "...255552..........25555",
    "....2222............2222",
];

const VAN: &[&str] = &[
    "..1111111111111111111111",
    ".14441444414444144441331",
    "144441444414444144441331",
    "133333333333333333333331",
    "733333333333333333333331",
    "133333333388883333333331",
    "133333333388883333333331",
    "118822288888888882228811",
    "...25552..........25552",
    "....222............222",
];

const BUS: &[&str] = &[
    ".11111111111111111111111111111111111111",
    "1333333333333333333333333333333333333331",
    "1344441444414444144441444414444144441331",
    "1344441444414444144441444414444144441331",
    "1344441444414444144441444414444144441331",
    "1333333333333333333333333333333333333331",
    "1888888888888888888888888888888888888881",
    "7333333333333333333333333333333333333331",
    "1333333333333333333333333333333333333331",
    "1333333333333333333333333333333333333331",
    "1888822288888888888888888888888222888881",
    "...2255522...................2255522",
    "...2555552...................2555552",
    "....22222.....................22222",
];

const SEMI_TRUCK: &[&str] = &[
    ".........................11111111111111111111111111",
    "..1111111...............1888888888888888888888888881",
    ".1444441311.............1888888888888888888888888881",
    ".14444413331............1888888888888888888888888881",
    "1133333333331...........1888888888888888888888888881",
    "13333333333331..........1888888888888888888888888881",
    "733333333333331.........1888888888888888888888888881",
    "1333333333333311111111111888888888888888888888888881",
    "1333333333333355555555555188888888888888888888888881",
    "11882228888888822222222221111122211111111122211111",
    "...2555522.............................2555522",
    "...2555522.............................2555522",
    "....22222...............................22222",
];

const BIRD_UP: &[&str] = &[
    "a........a",
    ".aa....aa",
    "..aaaaaa",
    "baaaaaa",
    "...aaaa",
];

const BIRD_DOWN: &[&str] = &[
    "..aaaaaa",
    "baaaaaaa",
    "aa.aaaa.aa",
    "a........a",
    "..........",
];

/// Board width in cells
const BILLBOARD_WIDTH: usize = 40;
/// Board height in cells (posts hang below it)
const BILLBOARD_BOARD_ROWS: usize = 20;
/// Post height in cells
pub const BILLBOARD_POST_ROWS: usize = 10;

fn billboard_rows() -> Vec<String> {
    let mut rows = Vec::with_capacity(BILLBOARD_BOARD_ROWS + BILLBOARD_POST_ROWS);
    let edge = "c".repeat(BILLBOARD_WIDTH);
    let inner = format!("c{}c", "5".repeat(BILLBOARD_WIDTH - 2));
    rows.push(edge.clone());
    for _ in 1..BILLBOARD_BOARD_ROWS - 1 {
        rows.push(inner.clone());
    }
    rows.push(edge);
    let post = format!("{}ddd{}ddd", ".".repeat(8), ".".repeat(18));
    for _ in 0..BILLBOARD_POST_ROWS {
        rows.push(post.clone());
    }
    rows
}

fn default_palette() -> Palette {
    Palette {
        id: PaletteId::Default,
        colors: vec![
            Rgba::TRANSPARENT,
            Rgba::hex(0x1a1a1a), // 1 outline
            Rgba::hex(0x3a3a3a), // 2 tire
            Rgba::hex(0xd32f2f), // 3 body
            Rgba::hex(0x9ad4f5), // 4 window
            Rgba::hex(0xc0c0c0), // 5 chrome
            Rgba::hex(0x2d2d2d), // 6 jacket
            Rgba::hex(0xffeb3b), // 7 headlight
            Rgba::hex(0x8e1f1f), // 8 accent
            Rgba::hex(0xf1c27d), // 9 skin
            Rgba::hex(0x5d4037), // a bird
            Rgba::hex(0xff9800), // b beak
            Rgba::hex(0x6d4c41), // c billboard frame
            Rgba::hex(0x8d6e63), // d post
            Rgba::hex(0xff6f00), // e bike paint
            Rgba::hex(0xfafafa), // f helmet
        ],
    }
}

/// The art shipped with the game
#[derive(Debug, Clone)]
pub struct BuiltinSprites {
    sprites: Vec<Sprite>,
    palette: Palette,
}

impl Default for BuiltinSprites {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinSprites {
    pub fn new() -> Self {
        let billboard = billboard_rows();
        let sprites = SpriteName::ALL
            .iter()
            .map(|&name| match name {
                SpriteName::Motorcycle => Sprite::from_rows(name, MOTORCYCLE),
                SpriteName::MotorcycleDuck => Sprite::from_rows(name, MOTORCYCLE_DUCK),
                SpriteName::Car => Sprite::from_rows(name, CAR),
                SpriteName::Truck => Sprite::from_rows(name, TRUCK),
                SpriteName::Van => Sprite::from_rows(name, VAN),
                SpriteName::Bus => Sprite::from_rows(name, BUS),
                SpriteName::SemiTruck => Sprite::from_rows(name, SEMI_TRUCK),
                SpriteName::BirdUp => Sprite::from_rows(name, BIRD_UP),
                SpriteName::BirdDown => Sprite::from_rows(name, BIRD_DOWN),
                SpriteName::Billboard => Sprite::from_rows(name, &billboard),
            })
            .collect();
        Self {
            sprites,
            palette: default_palette(),
        }
    }
}

impl SpriteAssets for BuiltinSprites {
    fn sprite(&self, name: SpriteName) -> &Sprite {
        // `sprites` is built in `SpriteName::ALL` order
        &self.sprites[name as usize]
    }

    fn default_palette(&self) -> &Palette {
        &self.palette
    }

    fn vehicle_colors(&self) -> &[VehicleColors] {
        &VEHICLE_COLORS
    }
}
