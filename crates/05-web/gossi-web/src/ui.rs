//! DOM views (wasm32 only).
//!
//! The tree is built once at mount; afterwards every store change re-renders
//! text and visibility from [`AppState`]. Event closures are leaked because
//! the views live as long as the page.

use std::rc::Rc;

use app::{AppContext, AppState, Mount, MountError};
use gossi::Program;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlOptionElement,
    HtmlSelectElement,
};

use crate::view_model;

/// Mounts the root view into the anchor element.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomMount;

impl Mount for DomMount {
    fn mount(&self, anchor: &str, ctx: &AppContext) -> Result<(), MountError> {
        let window = web_sys::window().ok_or_else(|| MountError::render("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| MountError::render("no document"))?;
        let root = document
            .query_selector(anchor)
            .map_err(js_err)?
            .ok_or_else(|| MountError::AnchorNotFound(anchor.to_owned()))?;

        let view = Rc::new(View::build(&document, &root, ctx).map_err(js_err)?);
        view.render(&ctx.store.snapshot());

        let renderer = view.clone();
        ctx.store.subscribe(move |state| renderer.render(state));

        wire_run(&view, ctx).map_err(js_err)?;
        wire_hashchange(&window, ctx).map_err(js_err)?;

        let hash = window.location().hash().unwrap_or_default();
        if !hash.is_empty() {
            if let Err(err) = ctx.navigate(&hash) {
                log::warn!("initial route: {err}");
            }
        }
        Ok(())
    }
}

struct View {
    document: Document,
    home: HtmlElement,
    about: HtmlElement,
    program: HtmlSelectElement,
    data: HtmlInputElement,
    button: HtmlButtonElement,
    result: Element,
    status: Element,
    history: Element,
}

impl View {
    fn build(document: &Document, root: &Element, ctx: &AppContext) -> Result<Self, JsValue> {
        root.set_text_content(None);

        let nav = document.create_element("nav")?;
        for route in ctx.router.routes() {
            let link = document.create_element("a")?;
            link.set_attribute("href", &route.href())?;
            link.set_text_content(Some(&route.name));
            nav.append_child(&link)?;
            nav.append_child(&document.create_text_node(" "))?;
        }
        root.append_child(&nav)?;

        let status = document.create_element("p")?;
        status.set_class_name("module-status");
        root.append_child(&status)?;

        let home: HtmlElement = document.create_element("section")?.dyn_into()?;
        home.set_attribute("data-view", "home")?;
        let program: HtmlSelectElement = document.create_element("select")?.dyn_into()?;
        for known in Program::KNOWN {
            let name = known.to_string();
            let option: HtmlOptionElement = document.create_element("option")?.dyn_into()?;
            option.set_value(&name);
            option.set_text(&name);
            program.append_child(&option)?;
        }
        let data: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        data.set_placeholder("data");
        let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
        button.set_text_content(Some("run"));
        let result = document.create_element("pre")?;
        result.set_class_name("result");
        home.append_child(&program)?;
        home.append_child(&data)?;
        home.append_child(&button)?;
        home.append_child(&result)?;
        root.append_child(&home)?;

        let about: HtmlElement = document.create_element("section")?.dyn_into()?;
        about.set_attribute("data-view", "about")?;
        let heading = document.create_element("h2")?;
        heading.set_text_content(Some("history"));
        let history = document.create_element("ul")?;
        about.append_child(&heading)?;
        about.append_child(&history)?;
        root.append_child(&about)?;

        Ok(Self {
            document: document.clone(),
            home,
            about,
            program,
            data,
            button,
            result,
            status,
            history,
        })
    }

    fn render(&self, state: &AppState) {
        let home = view_model::shows_home(state);
        self.home.set_hidden(!home);
        self.about.set_hidden(home);

        self.status
            .set_text_content(Some(&view_model::status_line(state)));
        self.result
            .set_text_content(Some(&view_model::result_line(state)));

        self.history.set_text_content(None);
        for line in view_model::history_lines(state) {
            let item = match self.document.create_element("li") {
                Ok(item) => item,
                Err(err) => {
                    log::warn!("history render: {err:?}");
                    return;
                }
            };
            item.set_text_content(Some(&line));
            if let Err(err) = self.history.append_child(&item) {
                log::warn!("history render: {err:?}");
                return;
            }
        }
    }
}

fn wire_run(view: &Rc<View>, ctx: &AppContext) -> Result<(), JsValue> {
    let view_ref = view.clone();
    let ctx = ctx.clone();
    let on_click = Closure::<dyn Fn()>::new(move || {
        let program = view_ref.program.value();
        let data = view_ref.data.value();
        // The store records the outcome; the subscription re-renders.
        if let Err(err) = ctx.run(&program, &data) {
            log::trace!("run {program:?} from ui: {err}");
        }
    });
    view.button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

fn wire_hashchange(window: &web_sys::Window, ctx: &AppContext) -> Result<(), JsValue> {
    let ctx = ctx.clone();
    let location = window.location();
    let on_hash = Closure::<dyn Fn()>::new(move || {
        let hash = location.hash().unwrap_or_default();
        if let Err(err) = ctx.navigate(&hash) {
            log::warn!("navigation: {err}");
        }
    });
    window.add_event_listener_with_callback("hashchange", on_hash.as_ref().unchecked_ref())?;
    on_hash.forget();
    Ok(())
}

fn js_err(err: JsValue) -> MountError {
    MountError::render(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}
