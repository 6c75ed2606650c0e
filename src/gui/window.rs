use crate::geometry::Size;
use crate::gui::dial::FALLBACK_VIEWPORT;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};

/// Covers the whole output: an overlay layer where the compositor supports
/// layer-shell, a fullscreen window elsewhere.
pub fn init_surface(window: &gtk::ApplicationWindow, overlay: bool) {
    if overlay && gtk4_layer_shell::is_supported() {
        init_layer_shell(window);
    } else {
        if overlay {
            log::warn!("Layer shell not supported, falling back to a fullscreen window");
        }
        window.fullscreen();
    }
}

fn init_layer_shell(window: &gtk::ApplicationWindow) {
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace(Some("unveil"));
    window.set_exclusive_zone(-1);
    for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
        window.set_anchor(edge, true);
    }
    window.set_keyboard_mode(KeyboardMode::Exclusive);
}

/// Size of the first monitor, used until the drawing area reports its own.
pub fn initial_viewport() -> Size {
    gdk::Display::default()
        .and_then(|d| d.monitors().item(0))
        .and_then(|item| item.downcast::<gdk::Monitor>().ok())
        .map(|m| {
            let geometry = m.geometry();
            Size::new(geometry.width() as f64, geometry.height() as f64)
        })
        .unwrap_or(Size::new(FALLBACK_VIEWPORT.0, FALLBACK_VIEWPORT.1))
}
