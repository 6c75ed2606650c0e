use relm4::prelude::*;
use unveil::config;
use unveil::gui::app::AppModel;
use unveil::sys::runtime;

fn main() {
    env_logger::init();

    let config = config::load_or_setup();

    let (tx, rx) = async_channel::bounded(8);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.unveil.Unveil");

    app.run::<AppModel>((config, rx));
}
