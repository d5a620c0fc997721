use crate::config;
use crate::events::AppEvent;
use crate::gui::painter::PixbufLoader;
use crate::gui::theme;
use crate::gui::wheel::{self, RESIZE_DEBOUNCE_MS, WheelState};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::RelmWidgetExt;
use relm4::prelude::*;
use rota_core::assets::AssetLoader;
use rota_core::{Item, WheelEvent};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub struct AppModel {
    pub state: Rc<RefCell<WheelState>>,
    pub loader: PixbufLoader,
    pub status: String,
    pub history: String,
    pub spinning: bool,
    /// A config change arrived mid-spin and is applied once it settles.
    pub reload_deferred: bool,
    pub resize_generation: u64,
    pub pending_size: (i32, i32),
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Spin,
    Settled { index: usize, item: Item },
    ClearHistory,
    ConfigReload,
    Resized(i32, i32),
    ResizeSettled(u64),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Spin => AppMsg::Spin,
            AppEvent::ClearHistory => AppMsg::ClearHistory,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    /// Drives the spin from the frame clock until it settles, then detaches.
    fn start_ticking(&self, sender: &ComponentSender<Self>) {
        let state = self.state.clone();
        let sender = sender.clone();
        self.drawing_area.add_tick_callback(move |area, clock| {
            let now_ms = clock.frame_time() as f64 / 1000.0;
            let event = state.borrow_mut().advance(now_ms);
            area.queue_draw();
            match event {
                Some(WheelEvent::Frame { .. }) => glib::ControlFlow::Continue,
                Some(WheelEvent::Settled { index, item }) => {
                    sender.input(AppMsg::Settled { index, item });
                    glib::ControlFlow::Break
                }
                None => glib::ControlFlow::Break,
            }
        });
    }

    fn load_images(&self) {
        let fresh = self.state.borrow_mut().request_images();
        for image in fresh {
            let state = self.state.clone();
            let loader = self.loader.clone();
            let area = self.drawing_area.clone();
            glib::idle_add_local_once(move || {
                let result = loader.load(&image);
                state.borrow_mut().assets.complete(image, result);
                area.queue_draw();
            });
        }
    }

    fn reload_config(&mut self) {
        match config::load_config() {
            Ok(new_config) => {
                self.state.borrow_mut().apply_config(&new_config);
                self.load_images();
                self.drawing_area.queue_draw();
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Failed to reload config: {}", e),
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (WheelState, PixbufLoader, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Rota"),
            set_default_size: (720, 820),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::space || key == gtk::gdk::Key::Return {
                        sender.input(AppMsg::Spin);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 8,
                set_margin_all: 12,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    add_css_class: "rota-drawing-area",

                    connect_resize[sender] => move |_, w, h| {
                        sender.input(AppMsg::Resized(w, h));
                    }
                },

                gtk::Label {
                    add_css_class: "rota-status",
                    #[watch]
                    set_label: &model.status,
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 8,
                    set_halign: gtk::Align::Center,

                    gtk::Button {
                        set_label: "Spin",
                        add_css_class: "suggested-action",
                        #[watch]
                        set_sensitive: !model.spinning,
                        connect_clicked => AppMsg::Spin,
                    },

                    gtk::Button {
                        set_label: "Clear history",
                        connect_clicked => AppMsg::ClearHistory,
                    },
                },

                gtk::Label {
                    add_css_class: "rota-history",
                    set_halign: gtk::Align::Start,
                    #[watch]
                    set_label: &model.history,
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, loader, rx) = init;

        theme::load_css();

        let model = AppModel {
            history: state.history_text(),
            state: Rc::new(RefCell::new(state)),
            loader,
            status: "Press Spin or Space".to_string(),
            spinning: false,
            reload_deferred: false,
            resize_generation: 0,
            pending_size: (0, 0),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, w, h| {
                let colors = theme::wheel_theme(&drawing_area.style_context());
                let mut state = state_draw.borrow_mut();
                if let Err(e) = wheel::draw(cr, &mut state, w as f64, h as f64, colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        model.load_images();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Spin => {
                let result = self.state.borrow_mut().spin();
                match result {
                    Ok(()) => {
                        self.spinning = true;
                        self.status = "Spinning...".to_string();
                        self.start_ticking(&sender);
                    }
                    Err(e) => {
                        if !self.spinning {
                            self.status = e.to_string();
                        }
                    }
                }
            }
            AppMsg::Settled { index, item } => {
                self.spinning = false;
                self.status = format!("#{} {}", index + 1, item.label());
                {
                    let mut state = self.state.borrow_mut();
                    state.record(item);
                    self.history = state.history_text();
                }
                if std::mem::take(&mut self.reload_deferred) {
                    self.reload_config();
                }
            }
            AppMsg::ClearHistory => {
                let mut state = self.state.borrow_mut();
                state.clear_history();
                self.history = state.history_text();
            }
            AppMsg::ConfigReload => {
                if self.spinning {
                    log::info!("Config changed mid-spin, reloading once it settles");
                    self.reload_deferred = true;
                } else {
                    self.reload_config();
                }
            }
            AppMsg::Resized(w, h) => {
                self.pending_size = (w, h);
                self.resize_generation += 1;
                let generation = self.resize_generation;
                let sender = sender.clone();
                glib::timeout_add_local_once(Duration::from_millis(RESIZE_DEBOUNCE_MS), move || {
                    sender.input(AppMsg::ResizeSettled(generation));
                });
            }
            AppMsg::ResizeSettled(generation) => {
                // a newer resize is still pending
                if generation != self.resize_generation {
                    return;
                }
                let (w, h) = self.pending_size;
                self.state.borrow_mut().commit_size(w as f64, h as f64);
                self.drawing_area.queue_draw();
            }
        }
    }
}
