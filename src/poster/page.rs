//! Page-level edits on a loaded PDF: image and text overlays in top-left page units.

use anyhow::{anyhow, Context};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::text;
use super::Rect;
use crate::qr::{EncodedImage, OutputFormat};

const US_LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
const FONT_RESOURCE: &str = "QrpHeBo";

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Looks `key` up on the page, then up the `Parent` chain.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value).clone());
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
}

/// Editor for a single page. Coordinates passed in are top-left based, y down.
pub struct PageEditor<'a> {
    doc: &'a mut Document,
    page_id: ObjectId,
    media_box: [f32; 4],
    font_registered: bool,
    overlay: Vec<Operation>,
}

impl<'a> PageEditor<'a> {
    pub fn first_page(doc: &'a mut Document) -> anyhow::Result<Self> {
        let page_id = *doc.get_pages().get(&1).context("document has no pages")?;
        let media_box = match inherited(doc, page_id, b"MediaBox") {
            Some(Object::Array(values)) if values.len() == 4 => {
                let mut out = US_LETTER;
                for (slot, value) in out.iter_mut().zip(values.iter()) {
                    *slot = number(resolve(doc, value)).unwrap_or(*slot);
                }
                out
            }
            _ => US_LETTER,
        };
        Ok(Self { doc, page_id, media_box, font_registered: false, overlay: Vec::new() })
    }

    /// Converts a top-left based rect to PDF user space `(x, y_bottom, w, h)`.
    pub fn to_user_space(&self, rect: Rect) -> (f32, f32, f32, f32) {
        let [llx, _, _, ury] = self.media_box;
        (llx + rect.x, ury - rect.y - rect.h, rect.w, rect.h)
    }

    /// Places the image inside `rect`, keeping its aspect ratio and centering it.
    pub fn insert_image(&mut self, rect: Rect, image: &EncodedImage) -> anyhow::Result<()> {
        let stream = image_stream(image)?;
        let image_id = self.doc.add_object(Object::Stream(stream));
        let name = format!("QrpIm{}", image_id.0);
        self.register_resource(b"XObject", &name, image_id)?;

        let scale = (rect.w / image.width as f32).min(rect.h / image.height as f32);
        let (w, h) = (image.width as f32 * scale, image.height as f32 * scale);
        let (x, y, _, _) = self.to_user_space(rect);
        let x = x + (rect.w - w) / 2.0;
        let y = y + (rect.h - h) / 2.0;

        self.overlay.extend([
            Operation::new("q", vec![]),
            Operation::new("cm", vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()]),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    /// Draws `content` left-aligned in `rect`. Returns `false` and draws nothing when the
    /// wrapped text is taller than the rect.
    pub fn insert_textbox(
        &mut self,
        rect: Rect,
        content: &str,
        fontsize: f32,
        color: (u8, u8, u8),
    ) -> anyhow::Result<bool> {
        let lines = text::wrap(content, rect.w, fontsize);
        if text::block_height(lines.len(), fontsize) > rect.h {
            return Ok(false);
        }
        if !self.font_registered {
            let font_id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => text::FONT_NAME,
                "Encoding" => "WinAnsiEncoding",
            });
            self.register_resource(b"Font", FONT_RESOURCE, font_id)?;
            self.font_registered = true;
        }

        let (x, bottom, _, h) = self.to_user_space(rect);
        let top = bottom + h;
        let (r, g, b) = color;
        let channel = |c: u8| Object::Real((c as f32 / 255.0).into());

        self.overlay.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![channel(r), channel(g), channel(b)]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_RESOURCE.into()), fontsize.into()]),
        ]);
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - text::ASCENT * fontsize - i as f32 * text::LEADING * fontsize;
            self.overlay.extend([
                Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), baseline.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(text::encode_win_ansi(line), StringFormat::Literal)],
                ),
            ]);
        }
        self.overlay.extend([Operation::new("ET", vec![]), Operation::new("Q", vec![])]);
        Ok(true)
    }

    /// Writes the collected overlay after the page's own content, which is wrapped in
    /// `q … Q` so its graphics state cannot leak into the overlay.
    pub fn commit(self) -> anyhow::Result<()> {
        if self.overlay.is_empty() {
            return Ok(());
        }
        let save = Content { operations: vec![Operation::new("q", vec![])] };
        let mut overlay = vec![Operation::new("Q", vec![])];
        overlay.extend(self.overlay);
        let overlay = Content { operations: overlay };

        let save_id = self.doc.add_object(Stream::new(Dictionary::new(), save.encode()?));
        let overlay_id = self.doc.add_object(Stream::new(Dictionary::new(), overlay.encode()?));

        let existing = self.doc.get_dictionary(self.page_id)?.get(b"Contents").ok().cloned();
        let mut contents = vec![Object::Reference(save_id)];
        match existing {
            Some(Object::Array(items)) => contents.extend(items),
            Some(Object::Reference(id)) => match self.doc.get_object(id) {
                // an indirect array of content streams
                Ok(Object::Array(items)) => contents.extend(items.clone()),
                _ => contents.push(Object::Reference(id)),
            },
            Some(other) => contents.push(other),
            None => {}
        }
        contents.push(Object::Reference(overlay_id));

        self.doc
            .get_object_mut(self.page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Adds `name -> id` under the page's `/Resources/<category>`, copying inherited
    /// resources onto the page first.
    fn register_resource(&mut self, category: &[u8], name: &str, id: ObjectId) -> anyhow::Result<()> {
        let resources_ref = match self.doc.get_dictionary(self.page_id)?.get(b"Resources") {
            Ok(Object::Reference(res_id)) => Slot::Indirect(*res_id),
            Ok(Object::Dictionary(_)) => Slot::Inline,
            _ => Slot::Missing,
        };
        let resources_ref = match resources_ref {
            Slot::Indirect(res_id) => Some(res_id),
            Slot::Inline => None,
            Slot::Missing => {
                let inherited = match inherited(self.doc, self.page_id, b"Resources") {
                    Some(Object::Dictionary(dict)) => dict,
                    _ => Dictionary::new(),
                };
                self.doc
                    .get_object_mut(self.page_id)?
                    .as_dict_mut()?
                    .set("Resources", Object::Dictionary(inherited));
                None
            }
        };

        let category_ref = match self.resources_mut(resources_ref)?.get(category) {
            Ok(Object::Reference(cat_id)) => Some(*cat_id),
            _ => None,
        };
        let category_dict = match category_ref {
            Some(cat_id) => self.doc.get_object_mut(cat_id)?.as_dict_mut()?,
            None => {
                let resources = self.resources_mut(resources_ref)?;
                if !matches!(resources.get(category), Ok(Object::Dictionary(_))) {
                    resources.set(category.to_vec(), Object::Dictionary(Dictionary::new()));
                }
                resources.get_mut(category)?.as_dict_mut()?
            }
        };
        category_dict.set(name.as_bytes().to_vec(), Object::Reference(id));
        Ok(())
    }

    fn resources_mut(&mut self, resources_ref: Option<ObjectId>) -> anyhow::Result<&mut Dictionary> {
        let dict = match resources_ref {
            Some(res_id) => self.doc.get_object_mut(res_id)?.as_dict_mut()?,
            None => self
                .doc
                .get_object_mut(self.page_id)?
                .as_dict_mut()?
                .get_mut(b"Resources")?
                .as_dict_mut()?,
        };
        Ok(dict)
    }
}

enum Slot {
    Indirect(ObjectId),
    Inline,
    Missing,
}

/// JPEG output is embedded as is; every other format is re-encoded as Flate RGB.
fn image_stream(image: &EncodedImage) -> anyhow::Result<Stream> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if image.format == OutputFormat::Jpeg {
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        return Ok(Stream::new(dict, image.bytes.clone()).with_compression(false));
    }
    let raw = image::load_from_memory_with_format(&image.bytes, image.format.image_format())
        .map_err(|e| anyhow!("re-reading composed qr image: {e}"))?
        .to_rgb8()
        .into_raw();
    let mut stream = Stream::new(dict, raw);
    stream.compress()?;
    Ok(stream)
}
