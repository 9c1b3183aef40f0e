//! Plain-text reel display for headless runs

use crate::assets::SymbolRegistry;
use crate::sim::Reel;

/// Renders the landed symbol window of each reel as a line of text
pub struct TextRenderer<'a> {
    registry: &'a SymbolRegistry,
    window: usize,
}

impl<'a> TextRenderer<'a> {
    pub fn new(registry: &'a SymbolRegistry, window: usize) -> Self {
        Self { registry, window }
    }

    pub fn render_reel(&self, reel: &Reel) -> String {
        let names: Vec<String> = reel
            .landed_symbols(self.window)
            .into_iter()
            .map(|id| match self.registry.name(id) {
                Some(name) => format!("{name:^9}"),
                None => format!("{:^9}", format!("#{}", id.0)),
            })
            .collect();
        format!("reel {} |{}|", reel.index(), names.join("|"))
    }

    pub fn render(&self, reels: &[Reel]) -> String {
        reels
            .iter()
            .map(|reel| self.render_reel(reel))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
