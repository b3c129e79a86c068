//! Output surfaces: where rendered cards end up.
//!
//! A surface receives finished `CardView`s and lays them out. Presenting never
//! fails: a surface that cannot lay something out degrades to printing the
//! message it has.
//!
//! - **HtmlSurface**: markup for embedding in a page
//! - **JsonSurface**: the views themselves, serialized

pub mod html;
pub mod json;

pub use html::HtmlSurface;
pub use json::JsonSurface;

use crate::view::{CardView, DashboardView};

/// A target that cards are rendered into.
pub trait Surface {
    /// Lay out one card's content.
    fn present(&mut self, view: &CardView);

    /// Lay out a whole dashboard. The default presents each card in order.
    fn present_dashboard(&mut self, dashboard: &DashboardView) {
        for card in &dashboard.cards {
            self.present(&card.view);
        }
    }
}
