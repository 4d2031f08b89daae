//! Page wiring
//!
//! Every DOM and media event is turned into one [`PageEvent`] and handed to
//! the shared `PlayerSession`. Async handlers hold the session lock for their
//! whole duration, so events are handled one at a time in arrival order.
//! Page teardown, the timer and the overlay unlock cannot wait and use
//! `try_lock` instead.

use super::{
    js_message, HttpVisitCounter, JsClock, WebMediaSink, WebPageControls, WebStorage, WebTicker,
};
use crate::{
    events::PlaybackEvent, gesture::GateInput, platform::Platform, session::PlayerSession,
    types::PlayerConfig, visits::VisitBadge, ThreadRandom,
};
use futures_util::lock::Mutex;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{
    Document, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent,
    PageTransitionEvent, Url,
};

type Shared = Rc<Mutex<PlayerSession>>;

const CONFIG_ATTR: &str = "data-player-config";
const PLAYLIST_ATTR: &str = "data-audio";
const STATE_ATTR: &str = "data-player-state";
const TRACK_ATTR: &str = "data-track";

/// Events that are handled under the session lock
#[derive(Debug)]
enum PageEvent {
    Boot(Option<String>),
    Overlay(GateInput),
    /// Gate already opened inside the input handler
    Unlocked,
    ResumeClicked,
    FileSelected(String),
    Ended,
    MetadataLoaded,
    VisibilityChanged { hidden: bool },
    /// Back from the back/forward cache
    Restored,
}

#[derive(Clone)]
struct Page {
    session: Shared,
    body: HtmlElement,
}

impl Page {
    /// Queue `event` behind anything still being handled
    fn send(&self, event: PageEvent) {
        let page = self.clone();
        wasm_bindgen_futures::spawn_local(async move { page.dispatch(event).await });
    }

    async fn dispatch(self, event: PageEvent) {
        let mut session = self.session.lock().await;
        match event {
            PageEvent::Boot(playlist) => {
                let outcome = session.boot(playlist.as_deref()).await;
                debug!(?outcome, "Booted");
            }
            PageEvent::Overlay(input) => {
                if let Some(Err(e)) = session.activate_overlay(input).await {
                    debug!("First play: {}", e);
                }
            }
            PageEvent::Unlocked => {
                if let Err(e) = session.start_after_unlock().await {
                    debug!("First play: {}", e);
                }
            }
            PageEvent::ResumeClicked => {
                if let Err(e) = session.resume_clicked().await {
                    debug!("Manual resume: {}", e);
                }
            }
            PageEvent::FileSelected(object_url) => {
                if let Err(e) = session.file_selected(object_url).await {
                    debug!("Picked file: {}", e);
                }
            }
            PageEvent::Ended => session.media_ended().await,
            PageEvent::MetadataLoaded => session.metadata_loaded(),
            PageEvent::VisibilityChanged { hidden } => session.visibility_changed(hidden),
            PageEvent::Restored => session.restored().await,
        }
        publish(&mut session, &self.body);
    }

    /// Hide the overlay and store the flag before the handler returns
    fn overlay_input(&self, input: GateInput) {
        let Some(mut session) = self.session.try_lock() else {
            self.send(PageEvent::Overlay(input));
            return;
        };
        let unlocked = session.unlock_gate(&input);
        drop(session);
        if unlocked {
            self.send(PageEvent::Unlocked);
        }
    }

    /// Handle a synchronous callback now, or drop it if the session is busy
    fn run_now(&self, f: fn(&mut PlayerSession)) {
        match self.session.try_lock() {
            Some(mut session) => {
                f(&mut session);
                publish(&mut session, &self.body);
            }
            None => debug!("Session busy, callback dropped"),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let config = read_config(&body);
    let page_playlist = body.get_attribute(PLAYLIST_ATTR);

    let sink = WebMediaSink::detached()?;
    let audio = sink.element().clone();
    let controls = WebPageControls::new(document.clone(), config.page.clone())?;
    let ids = controls.ids().clone();

    // The ticker lives inside the session it ticks
    let tick_target: Rc<RefCell<Weak<Mutex<PlayerSession>>>> =
        Rc::new(RefCell::new(Weak::new()));
    let ticker = WebTicker::new({
        let tick_target = Rc::clone(&tick_target);
        let body = body.clone();
        move || {
            let Some(session) = tick_target.borrow().upgrade() else {
                return;
            };
            let page = Page {
                session,
                body: body.clone(),
            };
            page.run_now(PlayerSession::tick);
        }
    });

    let platform = Platform {
        sink: Box::new(sink),
        store: Box::new(WebStorage),
        ticker: Box::new(ticker),
        clock: Box::new(JsClock),
        random: Box::new(ThreadRandom),
    };
    let session: Shared = Rc::new(Mutex::new(PlayerSession::new(
        config.clone(),
        platform,
        Box::new(controls),
    )));
    *tick_target.borrow_mut() = Rc::downgrade(&session);

    let page = Page {
        session,
        body: body.clone(),
    };

    // Overlay
    if let Some(overlay) = element(&document, &ids.overlay) {
        let on_click = page.clone();
        listen(&overlay, "click", move |_| {
            on_click.overlay_input(GateInput::Click);
        })?;

        let on_key = page.clone();
        listen(&overlay, "keydown", move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let input = GateInput::Key(key);
            if input.activates() {
                event.prevent_default();
                on_key.overlay_input(input);
            }
        })?;
    } else {
        debug!(id = %ids.overlay, "No gesture overlay on page");
    }

    // Manual resume
    if let Some(button) = element(&document, &ids.resume_button) {
        let on_click = page.clone();
        listen(&button, "click", move |_| on_click.send(PageEvent::ResumeClicked))?;
    }

    // File picker fallback
    if let Some(input) = element(&document, &ids.file_input) {
        let on_change = page.clone();
        listen(&input, "change", move |event: Event| {
            if let Some(object_url) = picked_file_url(&event) {
                on_change.send(PageEvent::FileSelected(object_url));
            }
        })?;
    }

    // Media
    let on_ended = page.clone();
    listen(&audio, "ended", move |_| on_ended.send(PageEvent::Ended))?;
    let on_metadata = page.clone();
    listen(&audio, "loadedmetadata", move |_| {
        on_metadata.send(PageEvent::MetadataLoaded);
    })?;

    // Page lifecycle
    let on_visibility = page.clone();
    let visibility_document = document.clone();
    listen(&document, "visibilitychange", move |_| {
        on_visibility.send(PageEvent::VisibilityChanged {
            hidden: visibility_document.hidden(),
        });
    })?;
    let on_unload = page.clone();
    listen(&window, "beforeunload", move |_| {
        on_unload.run_now(PlayerSession::checkpoint);
    })?;
    let on_pagehide = page.clone();
    listen(&window, "pagehide", move |event: Event| {
        let handler: fn(&mut PlayerSession) = if persisted(&event) {
            PlayerSession::suspend
        } else {
            PlayerSession::teardown
        };
        on_pagehide.run_now(handler);
    })?;
    let on_pageshow = page.clone();
    listen(&window, "pageshow", move |event: Event| {
        if persisted(&event) {
            on_pageshow.send(PageEvent::Restored);
        }
    })?;

    page.send(PageEvent::Boot(page_playlist));

    if let Some(endpoint) = config.visits_endpoint {
        if let Some(badge_element) = element(&document, &ids.visit_count) {
            wasm_bindgen_futures::spawn_local(async move {
                let counter = HttpVisitCounter::new(endpoint);
                let mut badge = VisitBadge::new();
                badge.refresh(&counter).await;
                if let Some(label) = badge.label() {
                    badge_element.set_text_content(Some(&label));
                }
            });
        }
    }

    Ok(())
}

fn read_config(body: &HtmlElement) -> PlayerConfig {
    let Some(raw) = body.get_attribute(CONFIG_ATTR) else {
        return PlayerConfig::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed {}: {}", CONFIG_ATTR, e);
        PlayerConfig::default()
    })
}

/// Whether a page transition involves the back/forward cache
fn persisted(event: &Event) -> bool {
    event
        .dyn_ref::<PageTransitionEvent>()
        .is_some_and(PageTransitionEvent::persisted)
}

fn element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

fn picked_file_url(event: &Event) -> Option<String> {
    let input = event.target()?.dyn_into::<HtmlInputElement>().ok()?;
    let file = input.files()?.get(0)?;
    match Url::create_object_url_with_blob(&file) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Could not reference picked file: {}", js_message(&e));
            None
        }
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Mirror drained events onto `<body>` attributes
fn publish(session: &mut PlayerSession, body: &HtmlElement) {
    for event in session.drain_events() {
        let result = match &event {
            PlaybackEvent::StateChanged { state } => {
                body.set_attribute(STATE_ATTR, PlaybackEvent::state_label(*state))
            }
            PlaybackEvent::TrackChanged { track_id, .. } => body.set_attribute(TRACK_ATTR, track_id),
            _ => Ok(()),
        };
        debug!(?event, "Player event");
        if let Err(e) = result {
            debug!("Could not publish player state: {}", js_message(&e));
        }
    }
}
