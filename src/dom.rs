use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlImageElement, NodeList};

use xpreview_core::{BindingMark, GalleryImage, PreviewConfig};

/// A page `<img>` viewed through the gallery resolver.
#[derive(Clone, Debug)]
pub(crate) struct DomImage {
    element: HtmlImageElement,
}

impl DomImage {
    pub(crate) fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }

    pub(crate) fn element(&self) -> &HtmlImageElement {
        &self.element
    }

    fn enclosing_post(&self, config: &PreviewConfig) -> Option<Element> {
        self.element.closest(&config.post_selector).ok().flatten()
    }
}

impl GalleryImage for DomImage {
    fn src(&self) -> String {
        self.element.src()
    }

    fn post_images(&self, config: &PreviewConfig) -> Option<Vec<Self>> {
        let post = self.enclosing_post(config)?;
        let images = images_under(&post).ok()?;
        Some(images.into_iter().map(DomImage::new).collect())
    }

    fn in_video_context(&self, config: &PreviewConfig) -> bool {
        let selector = config.video_context_selector();
        if !selector.is_empty() && matches!(self.element.closest(&selector), Ok(Some(_))) {
            return true;
        }
        let Some(post) = self.enclosing_post(config) else {
            return false;
        };
        matches!(post.query_selector("video"), Ok(Some(_)))
    }
}

impl BindingMark for DomImage {
    fn is_bound(&self, marker: &str) -> bool {
        self.element.has_attribute(marker)
    }

    fn mark_bound(&self, marker: &str) {
        let _ = self.element.set_attribute(marker, "1");
    }
}

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("missing document"))
}

/// `root` itself when it is an image, followed by every image below it.
pub(crate) fn images_in_subtree(root: &Element) -> Result<Vec<HtmlImageElement>, JsValue> {
    let mut images = Vec::new();
    if let Some(image) = root.dyn_ref::<HtmlImageElement>() {
        images.push(image.clone());
    }
    images.extend(images_under(root)?);
    Ok(images)
}

pub(crate) fn document_images(document: &Document) -> Result<Vec<HtmlImageElement>, JsValue> {
    Ok(collect_images(&document.query_selector_all("img")?))
}

fn images_under(root: &Element) -> Result<Vec<HtmlImageElement>, JsValue> {
    Ok(collect_images(&root.query_selector_all("img")?))
}

fn collect_images(nodes: &NodeList) -> Vec<HtmlImageElement> {
    (0..nodes.length())
        .filter_map(|idx| nodes.item(idx))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .collect()
}

pub(crate) fn js_err(error: JsValue) -> String {
    if let Some(value) = error.as_string() {
        return value;
    }
    if let Ok(json) = js_sys::JSON::stringify(&error) {
        if let Some(value) = json.as_string() {
            return value;
        }
    }
    "js error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use xpreview_core::resolve_gallery;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(html: &str) -> Element {
        let document = document().expect("document available");
        let root = document.create_element("div").expect("create test root");
        root.set_inner_html(html);
        document
            .body()
            .expect("body available")
            .append_child(&root)
            .expect("append test root");
        root
    }

    fn image(root: &Element, selector: &str) -> DomImage {
        let element = root
            .query_selector(selector)
            .expect("valid selector")
            .expect("image present")
            .dyn_into::<HtmlImageElement>()
            .expect("is an image");
        DomImage::new(element)
    }

    #[wasm_bindgen_test]
    fn gallery_from_article_markup() {
        let root = mount(
            r#"<article>
                <img id="avatar" src="https://pbs.twimg.com/profile_images/1/me_normal.jpg">
                <img id="a" src="https://pbs.twimg.com/media/A?format=jpg&amp;name=small">
                <div data-testid="videoPlayer">
                    <img id="v" src="https://pbs.twimg.com/media/V?format=jpg&amp;name=small">
                </div>
                <img id="b" src="https://pbs.twimg.com/media/B?format=jpg&amp;name=small">
                <img id="a2" src="https://pbs.twimg.com/media/A?format=jpg&amp;name=small">
            </article>"#,
        );
        let config = PreviewConfig::default();
        let hovered = image(&root, "#b");
        let gallery = resolve_gallery(&hovered, &config);
        assert_eq!(
            gallery.entries(),
            &[
                "https://pbs.twimg.com/media/A?format=jpg&name=orig".to_string(),
                "https://pbs.twimg.com/media/B?format=jpg&name=orig".to_string(),
            ]
        );
        assert_eq!(gallery.index(), 1);
        assert!(image(&root, "#v").in_video_context(&config));
        assert!(!hovered.in_video_context(&config));
        root.remove();
    }

    #[wasm_bindgen_test]
    fn aria_label_and_native_video_mark_video_context() {
        let root = mount(
            r#"<article id="labelled">
                <div aria-label="Embedded VIDEO"><img id="l" src="https://pbs.twimg.com/media/L.jpg"></div>
            </article>
            <article id="native">
                <img id="n" src="https://pbs.twimg.com/media/N.jpg">
                <video></video>
            </article>
            <img id="lone" src="https://pbs.twimg.com/media/Z.jpg">"#,
        );
        let config = PreviewConfig::default();
        assert!(image(&root, "#l").in_video_context(&config));
        assert!(image(&root, "#n").in_video_context(&config));
        let lone = image(&root, "#lone");
        assert!(!lone.in_video_context(&config));
        assert!(lone.post_images(&config).is_none());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn subtree_includes_root_image() {
        let root = mount(r#"<p><img id="x" src="https://pbs.twimg.com/media/X.jpg"></p>"#);
        let img = root
            .query_selector("#x")
            .expect("valid selector")
            .expect("image present");
        assert_eq!(images_in_subtree(&img).expect("query").len(), 1);
        assert_eq!(images_in_subtree(&root).expect("query").len(), 1);
        root.remove();
    }
}
