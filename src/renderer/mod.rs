//! Draw-list building
//!
//! The core never draws. This module turns reel state into positioned
//! sprites for whatever renderer the host runs, resolving textures through
//! a [`TextureProvider`]. Texture failures drop the sprite and are logged.

pub mod text;

use glam::Vec2;

use crate::assets::{SymbolId, TextureHandle, TextureProvider};
use crate::sim::Reel;

pub use text::TextRenderer;

/// One symbol to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelSprite {
    pub reel: usize,
    pub symbol: SymbolId,
    pub texture: TextureHandle,
    /// Top-left corner in screen space
    pub pos: Vec2,
}

/// Sprites for every symbol overlapping `[0, view_width)` of each reel.
///
/// A symbol near the end of the belt is also drawn one belt-width to the
/// left so it enters the view seamlessly.
pub fn collect_sprites(
    reels: &[Reel],
    textures: &impl TextureProvider,
    view_width: f32,
) -> Vec<ReelSprite> {
    let mut sprites = Vec::new();
    for reel in reels {
        let size = reel.params().symbol_size;
        let total = reel.total_width();
        for (symbol, x) in reel.symbol_positions() {
            for x in [x, x - total] {
                if x + size <= 0.0 || x >= view_width {
                    continue;
                }
                match textures.texture(symbol) {
                    Ok(texture) => sprites.push(ReelSprite {
                        reel: reel.index(),
                        symbol,
                        texture,
                        pos: reel.origin() + Vec2::new(x, 0.0),
                    }),
                    Err(err) => log::warn!("reel {}: skipping sprite: {}", reel.index(), err),
                }
            }
        }
    }
    sprites
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::assets::{SymbolRegistry, TextureTable};
    use crate::sim::ReelParams;

    fn reel(origin: Vec2) -> Reel {
        let params = ReelParams {
            speed_jitter: 0.0,
            ..Default::default()
        };
        let belt = (0..6).map(SymbolId).collect();
        Reel::new(0, params, belt, Pcg32::seed_from_u64(0)).with_origin(origin)
    }

    fn table() -> TextureTable {
        let registry = SymbolRegistry::from_names(["a", "b", "c", "d", "e", "f"]).unwrap();
        TextureTable::preload(&registry)
    }

    #[test]
    fn test_idle_reel_fills_view() {
        let reel = reel(Vec2::new(0.0, 100.0));
        let sprites = collect_sprites(std::slice::from_ref(&reel), &table(), 450.0);
        let xs: Vec<f32> = sprites.iter().map(|s| s.pos.x).collect();
        assert_eq!(xs, vec![0.0, 150.0, 300.0]);
        assert!(sprites.iter().all(|s| s.pos.y == 100.0));
    }

    #[test]
    fn test_wrapping_symbol_drawn_on_left() {
        let mut reel = reel(Vec2::ZERO);
        reel.start_spin();
        reel.update(1.0); // offset -50
        let sprites = collect_sprites(std::slice::from_ref(&reel), &table(), 300.0);
        // Symbol 0 wrapped to x = 850 and re-enters at -50
        let first = sprites.iter().find(|s| s.symbol == SymbolId(0)).unwrap();
        assert_eq!(first.pos.x, -50.0);
        assert_eq!(sprites.len(), 3);
    }

    #[test]
    fn test_missing_texture_skips_sprite() {
        let reel = reel(Vec2::ZERO);
        let mut textures = table();
        textures.mark_missing(SymbolId(1), "b");
        let sprites = collect_sprites(std::slice::from_ref(&reel), &textures, 450.0);
        assert_eq!(sprites.len(), 2);
        assert!(sprites.iter().all(|s| s.symbol != SymbolId(1)));
    }
}
