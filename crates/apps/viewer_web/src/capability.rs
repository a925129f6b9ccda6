//! Graphics capability check and the static fallback message.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Support {
    WebGpu,
    WebGl2,
    /// The browser knows WebGL but no context could be created.
    NoContext,
    /// The browser has no WebGL at all.
    NoApi,
}

impl Support {
    pub fn is_supported(self) -> bool {
        matches!(self, Support::WebGpu | Support::WebGl2)
    }
}

/// A browser graphics API the renderer can be built on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GraphicsBackend {
    WebGpu,
    WebGl2,
}

/// Backends to try, in order, for a detected level of support.
///
/// `navigator.gpu` may exist without any adapter behind it, so WebGPU is
/// always followed by WebGL2.
pub fn backend_attempts(support: Support) -> &'static [GraphicsBackend] {
    match support {
        Support::WebGpu => &[GraphicsBackend::WebGpu, GraphicsBackend::WebGl2],
        Support::WebGl2 => &[GraphicsBackend::WebGl2],
        Support::NoContext | Support::NoApi => &[],
    }
}

/// HTML placed into the container when 3D rendering is unavailable.
pub fn unsupported_message(support: Support) -> &'static str {
    match support {
        Support::NoApi => {
            "Your browser does not seem to support \
             <a href=\"http://khronos.org/webgl/wiki/Getting_a_WebGL_Implementation\">WebGL</a>.<br/>\
             Find out how to get it <a href=\"http://get.webgl.org/\">here</a>."
        }
        _ => {
            "Your graphics card does not seem to support \
             <a href=\"http://khronos.org/webgl/wiki/Getting_a_WebGL_Implementation\">WebGL</a>.<br/>\
             Find out how to get it <a href=\"http://get.webgl.org/\">here</a>."
        }
    }
}

pub fn detect(window: &Window, document: &Document) -> Support {
    let navigator = window.navigator();
    if js_sys::Reflect::has(navigator.as_ref(), &"gpu".into()).unwrap_or(false) {
        return Support::WebGpu;
    }

    let webgl2 = document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .and_then(|canvas| canvas.get_context("webgl2").ok().flatten());
    if webgl2.is_some() {
        return Support::WebGl2;
    }

    let has_api = js_sys::Reflect::has(window.as_ref(), &"WebGLRenderingContext".into())
        .unwrap_or(false);
    if has_api {
        Support::NoContext
    } else {
        Support::NoApi
    }
}

/// Replace everything inside `container` with the fallback message.
pub fn show_unsupported(container: &Element, support: Support) {
    container.set_inner_html(&format!(
        "<div class=\"webgl-error\">{}</div>",
        unsupported_message(support)
    ));
}

#[cfg(test)]
mod tests {
    use super::{GraphicsBackend, Support, backend_attempts, unsupported_message};

    #[test]
    fn only_real_contexts_count_as_support() {
        assert!(Support::WebGpu.is_supported());
        assert!(Support::WebGl2.is_supported());
        assert!(!Support::NoContext.is_supported());
        assert!(!Support::NoApi.is_supported());
    }

    #[test]
    fn webgpu_falls_back_to_webgl2() {
        assert_eq!(
            backend_attempts(Support::WebGpu),
            &[GraphicsBackend::WebGpu, GraphicsBackend::WebGl2]
        );
        assert_eq!(backend_attempts(Support::WebGl2), &[GraphicsBackend::WebGl2]);
        assert!(backend_attempts(Support::NoContext).is_empty());
        assert!(backend_attempts(Support::NoApi).is_empty());
    }

    #[test]
    fn message_names_the_missing_piece() {
        assert!(unsupported_message(Support::NoApi).starts_with("Your browser"));
        assert!(unsupported_message(Support::NoContext).starts_with("Your graphics card"));
        assert!(unsupported_message(Support::NoContext).contains("get.webgl.org"));
    }
}
