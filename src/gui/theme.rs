use crate::config::{Color, ColorConfig};
use gtk::gdk;
use gtk4 as gtk;
use palette::{Srgba, WithAlpha};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub track: Srgba<f64>,
    pub fill: Srgba<f64>,
    pub knob: Srgba<f64>,
    pub knob_center: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_config(colors: &ColorConfig) -> Self {
        Self {
            background: Self::opaque(colors.background),
            track: Self::opaque(colors.track),
            fill: Self::opaque(colors.fill),
            knob: Self::opaque(colors.knob),
            knob_center: Self::opaque(colors.knob_center),
        }
    }

    fn opaque(color: Color) -> Srgba<f64> {
        color.0.into_format::<f64>().with_alpha(1.0)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.unveil-window, .unveil-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
