use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::geometry::{Point, Size};
use crate::gui::dial::{self, Layout, State};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gdk_pixbuf::Pixbuf;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// What the draw function needs, shared with the component.
pub struct Frame {
    pub state: State,
    pub colors: ThemeColors,
    pub image: Option<Pixbuf>,
}

impl Frame {
    fn new(config: &Config, viewport: Size) -> Self {
        Self {
            state: State::new(layout_for(config, viewport)),
            colors: ThemeColors::from_config(&config.colors),
            image: load_image(config),
        }
    }

    fn apply(&mut self, config: &Config) {
        self.colors = ThemeColors::from_config(&config.colors);
        self.image = load_image(config);
        let viewport = self.state.layout.viewport;
        self.state.relayout(layout_for(config, viewport));
    }
}

fn layout_for(config: &Config, viewport: Size) -> Layout {
    Layout::for_viewport(viewport, &config.dial, config.image.size as f64)
}

fn load_image(config: &Config) -> Option<Pixbuf> {
    dial::load_image(&config.image)
        .inspect_err(|e| log::warn!("No image: {:#}", e))
        .ok()
}

pub struct AppModel {
    pub frame: Rc<RefCell<Frame>>,
    pub config: Config,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    DragBegin,
    DragUpdate { absolute_x: f64, translation: Point },
    DragEnd,
    Resize(Size),
    ConfigReload,
    Close,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Unveil"),
            add_css_class: "unveil-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Close);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "unveil-drawing-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resize(Size::new(width as f64, height as f64)));
                },

                add_controller = gtk::GestureDrag {
                    connect_drag_begin[sender] => move |_, _, _| {
                        sender.input(AppMsg::DragBegin);
                    },
                    connect_drag_update[sender] => move |gesture, dx, dy| {
                        if let Some((start_x, _)) = gesture.start_point() {
                            sender.input(AppMsg::DragUpdate {
                                absolute_x: start_x + dx,
                                translation: Point::new(dx, dy),
                            });
                        }
                    },
                    connect_drag_end[sender] => move |_, _, _| {
                        sender.input(AppMsg::DragEnd);
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, rx) = init;

        theme::load_css();
        window::init_surface(&root, config.window.overlay);

        let frame = Rc::new(RefCell::new(Frame::new(
            &config,
            window::initial_viewport(),
        )));

        let model = AppModel {
            frame,
            config,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let frame_draw = model.frame.clone();
        widgets.drawing_area.set_draw_func(move |_, cr, _, _| {
            let frame = frame_draw.borrow();
            let scene = dial::compose(&frame.state, &frame.colors);
            if let Err(e) = dial::draw(cr, &scene, frame.image.as_ref()) {
                log::error!("Drawing error: {}", e);
            }
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::DragBegin => self.frame.borrow_mut().state.begin_drag(),
            AppMsg::DragUpdate {
                absolute_x,
                translation,
            } => {
                let action = self
                    .frame
                    .borrow_mut()
                    .state
                    .update_drag(absolute_x, translation);
                if action.completed {
                    log::info!("Dial completed");
                    if self.config.window.close_on_complete {
                        self.root.close();
                        return;
                    }
                }
                if action.should_redraw {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::DragEnd => self.frame.borrow_mut().state.end_drag(),
            AppMsg::Resize(viewport) => {
                let layout = layout_for(&self.config, viewport);
                self.frame.borrow_mut().state.relayout(layout);
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.frame.borrow_mut().apply(&new_config);
                    self.config = new_config;
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Close => self.root.close(),
        }
    }
}
