//! Browser binding
//!
//! `PetDodgeGame` mounts a canvas into a container element, loads the pet
//! image, drives the host from `requestAnimationFrame` and forwards the final
//! score to a JS callback. `destroy()` (or dropping the handle) cancels the
//! pending frame, detaches every listener and removes the canvas.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlImageElement, KeyboardEvent, PointerEvent,
    ResizeObserver,
};

use super::{GameHost, SessionId};
use crate::api::{ScoreClient, Week};
use crate::error::{AssetError, HostError, js_error_string};
use crate::highscores::HighScores;
use crate::platform::{KeyRoute, KeyTarget, PlatformCapability, route_key_down};
use crate::renderer::{CanvasSurface, svg_icon};
use crate::settings::Settings;
use crate::sim::{GameStatus, ObstacleKind};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // A second module instance on the page already installed the logger
    let _ = console_log::init_with_level(log::Level::Info);
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// An attached DOM listener, removed again on teardown
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, HostError> {
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Classify the element a keyboard event was aimed at
fn key_target(event: &Event, canvas: &HtmlCanvasElement) -> KeyTarget {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        // Window or document
        return KeyTarget::Game;
    };
    if element.is_same_node(Some(canvas.as_ref())) {
        return KeyTarget::Game;
    }
    match element.tag_name().as_str() {
        "INPUT" | "TEXTAREA" | "SELECT" => return KeyTarget::Editable,
        "BODY" | "HTML" => return KeyTarget::Game,
        _ => {}
    }
    if element
        .dyn_ref::<HtmlElement>()
        .is_some_and(|el| el.is_content_editable())
    {
        KeyTarget::Editable
    } else {
        KeyTarget::Other
    }
}

async fn load_image(url: &str) -> Result<HtmlImageElement, AssetError> {
    let failed = |reason: String| AssetError::ImageLoad {
        url: url.to_string(),
        reason,
    };

    let img = HtmlImageElement::new().map_err(|e| failed(js_error_string(&e)))?;
    img.set_cross_origin(Some("anonymous"));
    let loaded = js_sys::Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(url);

    let result = JsFuture::from(loaded).await;
    img.set_onload(None);
    img.set_onerror(None);
    result.map_err(|_| failed("image could not be decoded".into()))?;
    Ok(img)
}

struct Inner {
    host: RefCell<GameHost<CanvasSurface>>,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    pet_image_url: String,
    pet_id: Option<String>,
    on_game_over: js_sys::Function,
    /// Filled by the host's game-over handler, drained after the frame
    pending_score: Rc<Cell<Option<u64>>>,
    raf_id: Cell<Option<i32>>,
    raf_cb: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<Listener>>,
    resize_observer: RefCell<Option<(ResizeObserver, Closure<dyn FnMut(JsValue)>)>>,
    destroyed: Cell<bool>,
}

impl Inner {
    fn schedule(&self) {
        if self.destroyed.get() || self.raf_id.get().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(cb) = self.raf_cb.borrow().as_ref() {
            match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => self.raf_id.set(Some(id)),
                Err(e) => log::error!("requestAnimationFrame failed: {}", js_error_string(&e)),
            }
        }
    }

    fn on_frame(&self, now: f64) {
        self.raf_id.set(None);
        if self.destroyed.get() {
            return;
        }

        let keep_going = self.host.borrow_mut().frame(now);

        // Host borrow released: the page may call back into us (restart, destroy)
        if let Some(score) = self.pending_score.take() {
            self.report(score);
        }
        if keep_going {
            self.schedule();
        }
    }

    fn report(&self, score: u64) {
        let mut board = HighScores::load();
        if let Some(rank) = board.add_score(score, self.pet_id.as_deref(), js_sys::Date::now()) {
            log::info!("New personal best list entry at rank {}", rank);
            board.save();
        }

        match self
            .on_game_over
            .call1(&JsValue::NULL, &JsValue::from_f64(score as f64))
        {
            Ok(ret) => {
                // Async handlers: surface rejections in the log
                if let Ok(promise) = ret.dyn_into::<js_sys::Promise>() {
                    spawn_local(async move {
                        if let Err(e) = JsFuture::from(promise).await {
                            log::error!("{}", HostError::Callback(js_error_string(&e)));
                        }
                    });
                }
            }
            Err(e) => log::error!("{}", HostError::Callback(js_error_string(&e))),
        }
    }

    fn fit(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        // Measure the container without the canvas, or an auto-height
        // container would report the canvas's own height back
        let style = self.canvas.style();
        let _ = style.set_property("display", "none");
        let w = self.container.client_width() as f32;
        let h = self.container.client_height() as f32;
        let _ = style.set_property("display", "block");

        self.host
            .borrow_mut()
            .resize(w, h, window.device_pixel_ratio() as f32);
    }

    fn load_assets(inner: &Rc<Inner>, id: SessionId) {
        let weak = Rc::downgrade(inner);
        let url = inner.pet_image_url.clone();
        spawn_local(async move {
            let result = load_image(&url).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.destroyed.get() {
                return;
            }
            inner.host.borrow_mut().assets_ready(id, result);
        });
    }

    /// Refit whenever the container itself changes size
    fn observe_container(inner: &Rc<Inner>) -> Result<(), HostError> {
        let weak = Rc::downgrade(inner);
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |_entries: JsValue| {
            if let Some(inner) = weak.upgrade() {
                if !inner.destroyed.get() {
                    inner.fit();
                }
            }
        });
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&inner.container);
        *inner.resize_observer.borrow_mut() = Some((observer, callback));
        Ok(())
    }

    fn attach_listeners(inner: &Rc<Inner>) -> Result<(), HostError> {
        let window = web_sys::window().ok_or(HostError::NotMounted)?;
        let canvas: &EventTarget = inner.canvas.as_ref();
        let mut listeners = Vec::new();

        let on = |weak: Weak<Inner>, f: fn(&Inner, Event)| {
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                if let Some(inner) = weak.upgrade() {
                    f(&inner, event);
                }
            })
        };

        listeners.push(Listener::attach(
            &window,
            "keydown",
            on(Rc::downgrade(inner), |inner, event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    let key = event.key();
                    let target = key_target(event, &inner.canvas);
                    let running = inner.host.borrow().is_running();
                    if let KeyRoute::Handle { prevent_default } = route_key_down(&key, target, running) {
                        inner.host.borrow_mut().key_down(&key);
                        if prevent_default {
                            event.prevent_default();
                        }
                    }
                }
            }),
        )?);
        listeners.push(Listener::attach(
            &window,
            "keyup",
            on(Rc::downgrade(inner), |inner, event| {
                // Releases always go through so a hold can't get stuck
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    inner.host.borrow_mut().key_up(&event.key());
                }
            }),
        )?);
        listeners.push(Listener::attach(
            &window,
            "blur",
            on(Rc::downgrade(inner), |inner, _| inner.host.borrow_mut().blur()),
        )?);
        listeners.push(Listener::attach(
            &window,
            "resize",
            on(Rc::downgrade(inner), |inner, _| inner.fit()),
        )?);
        listeners.push(Listener::attach(
            canvas,
            "pointerdown",
            on(Rc::downgrade(inner), |inner, event| {
                if let Some(event) = event.dyn_ref::<PointerEvent>() {
                    event.prevent_default();
                    let _ = inner.canvas.set_pointer_capture(event.pointer_id());
                    inner.host.borrow_mut().pointer_down(
                        event.pointer_id(),
                        event.offset_x() as f32,
                        event.offset_y() as f32,
                    );
                }
            }),
        )?);
        for name in ["pointerup", "pointercancel"] {
            listeners.push(Listener::attach(
                canvas,
                name,
                on(Rc::downgrade(inner), |inner, event| {
                    if let Some(event) = event.dyn_ref::<PointerEvent>() {
                        inner.host.borrow_mut().pointer_up(event.pointer_id());
                    }
                }),
            )?);
        }

        inner.listeners.borrow_mut().extend(listeners);
        Ok(())
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.raf_cb.borrow_mut().take();

        for listener in self.listeners.borrow_mut().drain(..) {
            listener.detach();
        }
        if let Some((observer, _callback)) = self.resize_observer.borrow_mut().take() {
            observer.disconnect();
        }

        self.pending_score.set(None);
        self.host.borrow_mut().unmount();
        self.canvas.remove();
        log::info!("Game destroyed");
    }
}

/// A mounted game, owned by the embedding page
#[wasm_bindgen]
pub struct PetDodgeGame {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl PetDodgeGame {
    /// Mount a new game into the element with id `container_id`
    ///
    /// `on_game_over(score)` is called once per round. `settings_json`
    /// overrides the stored settings; `pet_id` tags local high scores.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        pet_image_url: String,
        on_game_over: js_sys::Function,
        settings_json: Option<String>,
        pet_id: Option<String>,
    ) -> Result<PetDodgeGame, JsValue> {
        let capability = PlatformCapability::detect();
        capability.ensure().map_err(to_js)?;

        let window = web_sys::window().ok_or_else(|| to_js(HostError::NotMounted))?;
        let document = window.document().ok_or_else(|| to_js(HostError::NotMounted))?;
        let container: HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or_else(|| to_js(HostError::Binding(format!("no element with id '{container_id}'"))))?
            .dyn_into()
            .map_err(|_| to_js(HostError::Binding(format!("'{container_id}' is not an HTML element"))))?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_attribute("tabindex", "0")?;
        canvas.style().set_property("display", "block")?;
        canvas.style().set_property("touch-action", "none")?;
        container.append_child(&canvas)?;

        let surface = match CanvasSurface::new(canvas.clone()) {
            Ok(surface) => surface,
            Err(e) => {
                canvas.remove();
                return Err(to_js(e));
            }
        };

        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings: {}", e);
                Settings::load()
            }),
            None => Settings::load(),
        };

        let pending_score = Rc::new(Cell::new(None));
        let sink = pending_score.clone();
        let host = GameHost::new(
            settings,
            capability,
            Box::new(move |score| {
                sink.set(Some(score));
                Ok(())
            }),
        );

        let inner = Rc::new(Inner {
            host: RefCell::new(host),
            container,
            canvas,
            pet_image_url,
            pet_id,
            on_game_over,
            pending_score,
            raf_id: Cell::new(None),
            raf_cb: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            resize_observer: RefCell::new(None),
            destroyed: Cell::new(false),
        });

        let weak = Rc::downgrade(&inner);
        *inner.raf_cb.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            if let Some(inner) = weak.upgrade() {
                inner.on_frame(now);
            }
        }));

        if let Err(e) = Inner::attach_listeners(&inner).and_then(|_| Inner::observe_container(&inner)) {
            inner.destroy();
            return Err(to_js(e));
        }
        inner.fit();

        let seed = js_sys::Date::now() as u64;
        let mounted = inner.host.borrow_mut().mount(surface, seed);
        let id = match mounted {
            Ok(id) => id,
            Err(e) => {
                inner.destroy();
                return Err(to_js(e));
            }
        };
        Inner::load_assets(&inner, id);
        inner.schedule();

        Ok(PetDodgeGame { inner })
    }

    /// On-screen left button pressed
    #[wasm_bindgen(js_name = pressLeft)]
    pub fn press_left(&self) {
        self.inner.host.borrow_mut().press_left();
    }

    #[wasm_bindgen(js_name = pressRight)]
    pub fn press_right(&self) {
        self.inner.host.borrow_mut().press_right();
    }

    /// On-screen button released
    pub fn release(&self) {
        self.inner.host.borrow_mut().release();
    }

    /// Play again with the same pet
    pub fn restart(&self) -> Result<(), JsValue> {
        if self.inner.destroyed.get() {
            return Err(to_js(HostError::NotMounted));
        }
        let seed = js_sys::Date::now() as u64;
        let id = self.inner.host.borrow_mut().restart(seed).map_err(to_js)?;
        if self.inner.host.borrow().status() == Some(GameStatus::Loading) {
            Inner::load_assets(&self.inner, id);
        }
        self.inner.schedule();
        Ok(())
    }

    /// Apply and persist settings (JSON, missing fields take defaults)
    ///
    /// Display preferences apply immediately, tuning from the next round.
    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(&self, settings_json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(settings_json).map_err(to_js)?;
        settings.save();
        self.inner.host.borrow_mut().set_settings(settings);
        Ok(())
    }

    /// Tear everything down; safe to call more than once
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// "loading", "running", "over", "failed" or "destroyed"
    pub fn status(&self) -> String {
        self.inner
            .host
            .borrow()
            .status()
            .map_or("destroyed", |s| s.as_str())
            .to_string()
    }

    pub fn score(&self) -> f64 {
        self.inner.host.borrow().score().unwrap_or(0) as f64
    }

    /// Why the game failed to start, if it did
    #[wasm_bindgen(js_name = failureReason)]
    pub fn failure_reason(&self) -> Option<String> {
        self.inner.host.borrow().failure().map(|e| e.to_string())
    }

    /// Best local score for this game's pet
    #[wasm_bindgen(js_name = personalBest)]
    pub fn personal_best(&self) -> Option<f64> {
        HighScores::load()
            .personal_best(self.inner.pet_id.as_deref())
            .map(|s| s as f64)
    }
}

impl Drop for PetDodgeGame {
    fn drop(&mut self) {
        self.inner.destroy();
    }
}

/// SVG markup for an obstacle icon ("paw", "bone", "heart", "fish", "ball")
#[wasm_bindgen(js_name = obstacleSvg)]
pub fn obstacle_svg(kind: &str, size: f32) -> Result<String, JsValue> {
    let kind = ObstacleKind::parse(kind).ok_or_else(|| to_js(format!("unknown obstacle kind '{kind}'")))?;
    Ok(svg_icon(kind, size))
}

fn client(base_url: String, token: Option<String>) -> ScoreClient {
    let client = ScoreClient::new(base_url);
    match token {
        Some(token) => client.with_token(token),
        None => client,
    }
}

fn json_value(value: &impl serde::Serialize) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(to_js)?;
    js_sys::JSON::parse(&json)
}

/// Resolves to `{ saved, newScore? }`
#[wasm_bindgen(js_name = saveScore)]
pub async fn save_score(
    base_url: String,
    token: Option<String>,
    score: f64,
    pet_id: String,
) -> Result<JsValue, JsValue> {
    let response = client(base_url, token)
        .save_score(score.max(0.0) as u64, &pet_id)
        .await
        .map_err(to_js)?;
    json_value(&response)
}

/// Resolves to the ranking entries for `week` ("current" or "previous")
#[wasm_bindgen(js_name = fetchRankings)]
pub async fn fetch_rankings(base_url: String, token: Option<String>, week: String) -> Result<JsValue, JsValue> {
    let week = match week.as_str() {
        "previous" => Week::Previous,
        _ => Week::Current,
    };
    let entries = client(base_url, token).rankings(week).await.map_err(to_js)?;
    json_value(&entries)
}
