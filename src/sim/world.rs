//! World map: a fixed grid of screens banded into difficulty zones
//!
//! Zones are concentric rings around the map center. The innermost ring is
//! the easiest; the outer ring is the hardest and locks its screens until
//! they are cleared.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::variation::Rgb;

/// Terrain zone, doubling as the difficulty tier (0 = easiest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Zone {
    #[default]
    Meadow,
    Forest,
    Badlands,
    Abyss,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Meadow, Zone::Forest, Zone::Badlands, Zone::Abyss];

    /// Difficulty tier 0..=3
    pub fn tier(self) -> u8 {
        match self {
            Zone::Meadow => 0,
            Zone::Forest => 1,
            Zone::Badlands => 2,
            Zone::Abyss => 3,
        }
    }

    /// Zone for a tier, saturating at the hardest zone
    pub fn from_tier(tier: u8) -> Zone {
        match tier {
            0 => Zone::Meadow,
            1 => Zone::Forest,
            2 => Zone::Badlands,
            _ => Zone::Abyss,
        }
    }

    pub fn is_hardest(self) -> bool {
        self == Zone::Abyss
    }

    pub fn name(self) -> &'static str {
        match self {
            Zone::Meadow => "Meadow",
            Zone::Forest => "Forest",
            Zone::Badlands => "Badlands",
            Zone::Abyss => "Abyss",
        }
    }

    /// Tint used when coloring enemies generated in this zone
    pub fn tint(self) -> Rgb {
        match self {
            Zone::Meadow => Rgb::new(120, 200, 90),
            Zone::Forest => Rgb::new(40, 120, 60),
            Zone::Badlands => Rgb::new(190, 120, 60),
            Zone::Abyss => Rgb::new(90, 40, 140),
        }
    }
}

/// One cell of the world grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenCell {
    pub zone: Zone,
    /// Cosmetic variation in [0, 1)
    pub variation: f32,
}

/// Fixed-size grid of screen descriptors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMap {
    width: u32,
    height: u32,
    /// Row-major cells
    cells: Vec<ScreenCell>,
}

impl WorldMap {
    /// Generate the grid. Zone banding is deterministic; only the cosmetic
    /// variation draws from `rng`.
    pub fn generate<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut cells = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                cells.push(ScreenCell {
                    zone: zone_for(x, y, width, height),
                    variation: rng.random::<f32>(),
                });
            }
        }

        log::info!("Generated {}x{} world", width, height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Screen the player starts on (grid center, always the easiest zone)
    pub fn center(&self) -> IVec2 {
        IVec2::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    pub fn contains(&self, screen: IVec2) -> bool {
        screen.x >= 0
            && screen.y >= 0
            && (screen.x as u32) < self.width
            && (screen.y as u32) < self.height
    }

    /// Clamp a screen coordinate into the grid
    pub fn clamp(&self, screen: IVec2) -> IVec2 {
        screen.clamp(
            IVec2::ZERO,
            IVec2::new(self.width as i32 - 1, self.height as i32 - 1),
        )
    }

    pub fn cell(&self, screen: IVec2) -> Option<&ScreenCell> {
        if !self.contains(screen) {
            return None;
        }
        self.cells
            .get(screen.y as usize * self.width as usize + screen.x as usize)
    }

    /// Zone of a screen; out-of-grid coordinates read as the hardest zone
    pub fn zone_at(&self, screen: IVec2) -> Zone {
        self.cell(screen).map(|c| c.zone).unwrap_or(Zone::Abyss)
    }
}

/// Band the Euclidean distance from the grid center into four rings
fn zone_for(x: u32, y: u32, width: u32, height: u32) -> Zone {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();
    if max_dist <= f32::EPSILON {
        return Zone::Meadow;
    }

    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    let normalized = (dx * dx + dy * dy).sqrt() / max_dist;
    let tier = (normalized * 4.0).floor().min(3.0) as u8;
    Zone::from_tier(tier)
}

/// Persistence key for a screen: `"x,y"`
pub fn screen_key(screen: IVec2) -> String {
    format!("{},{}", screen.x, screen.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> WorldMap {
        let mut rng = Pcg32::seed_from_u64(1);
        WorldMap::generate(10, 10, &mut rng)
    }

    #[test]
    fn test_center_is_easiest() {
        let w = world();
        assert_eq!(w.zone_at(w.center()), Zone::Meadow);
    }

    #[test]
    fn test_corners_are_hardest() {
        let w = world();
        for corner in [IVec2::new(0, 0), IVec2::new(9, 0), IVec2::new(0, 9), IVec2::new(9, 9)] {
            assert_eq!(w.zone_at(corner), Zone::Abyss);
        }
    }

    #[test]
    fn test_zones_non_decreasing_outward() {
        let w = world();
        let row = 4;
        let mut last = Zone::Meadow;
        for x in (0..=4).rev() {
            let z = w.zone_at(IVec2::new(x, row));
            assert!(z >= last);
            last = z;
        }
    }

    #[test]
    fn test_all_zones_present() {
        let w = world();
        for zone in Zone::ALL {
            let found = (0..10).any(|y| (0..10).any(|x| w.zone_at(IVec2::new(x, y)) == zone));
            assert!(found, "missing zone {:?}", zone);
        }
    }

    #[test]
    fn test_clamp_and_contains() {
        let w = world();
        assert!(!w.contains(IVec2::new(-1, 3)));
        assert_eq!(w.clamp(IVec2::new(-1, 12)), IVec2::new(0, 9));
        assert!(w.cell(IVec2::new(10, 0)).is_none());
    }

    #[test]
    fn test_variation_range() {
        let w = world();
        for y in 0..10 {
            for x in 0..10 {
                let v = w.cell(IVec2::new(x, y)).map(|c| c.variation).unwrap_or(-1.0);
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_single_cell_world() {
        let mut rng = Pcg32::seed_from_u64(2);
        let w = WorldMap::generate(1, 1, &mut rng);
        assert_eq!(w.zone_at(IVec2::ZERO), Zone::Meadow);
        assert_eq!(w.center(), IVec2::ZERO);
    }

    #[test]
    fn test_screen_key_format() {
        assert_eq!(screen_key(IVec2::new(3, 7)), "3,7");
    }
}
