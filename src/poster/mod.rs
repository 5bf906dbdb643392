//! Poster assembly: QR codes and text boxes laid over page one of a PDF template.

pub mod page;
pub mod text;

use std::io::Write;

use image::RgbaImage;
use lopdf::Document;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::qr::{self, StyleConfig};
use page::PageEditor;

/// Rectangle in page units, top-left origin, y growing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<Position> for Rect {
    fn from(p: Position) -> Self {
        Rect { x: p.x as f32, y: p.y as f32, w: p.w as f32, h: p.h as f32 }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Qr,
    Text,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TextStyles {
    pub fontsize: i32,
    pub color: (u8, u8, u8),
}

impl Default for TextStyles {
    fn default() -> Self {
        Self { fontsize: 14, color: (0, 0, 0) }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TemplateElement {
    pub content: String,
    pub element_type: ElementType,
    pub pos: Position,
    #[serde(default)]
    pub qr_styles: StyleConfig,
    #[serde(default)]
    pub text_styles: TextStyles,
}

impl TemplateElement {
    pub fn validate(&self, index: usize) -> Result<(), AppError> {
        if self.pos.w <= 0 || self.pos.h <= 0 {
            return Err(AppError::Validation(format!(
                "elements[{index}]: pos.w and pos.h must be positive"
            )));
        }
        if self.element_type == ElementType::Text && self.text_styles.fontsize <= 0 {
            return Err(AppError::Validation(format!(
                "elements[{index}]: text_styles.fontsize must be positive"
            )));
        }
        Ok(())
    }
}

/// An element together with anything fetched for it ahead of assembly.
pub struct PreparedElement {
    pub element: TemplateElement,
    pub logo: Option<RgbaImage>,
}

/// Loads the template through a scoped temporary file, removed when this returns.
pub fn open_template(bytes: &[u8]) -> Result<Document, AppError> {
    let mut file = tempfile::Builder::new()
        .prefix("qrposter-")
        .suffix(".pdf")
        .tempfile()
        .map_err(anyhow::Error::from)?;
    file.write_all(bytes).map_err(anyhow::Error::from)?;
    file.flush().map_err(anyhow::Error::from)?;

    let doc = Document::load(file.path()).map_err(|e| AppError::InvalidDocument(e.to_string()))?;
    if doc.get_pages().is_empty() {
        return Err(AppError::InvalidDocument("template has no pages".into()));
    }
    Ok(doc)
}

/// Draws one element on the page.
pub fn insert_element(
    page: &mut PageEditor<'_>,
    element: &TemplateElement,
    logo: Option<&RgbaImage>,
) -> Result<(), AppError> {
    let rect = Rect::from(element.pos);
    match element.element_type {
        ElementType::Qr => {
            let image = qr::build_image(&element.content, &element.qr_styles, logo)?;
            page.insert_image(rect, &image)?;
        }
        ElementType::Text => {
            let styles = &element.text_styles;
            let drawn = page.insert_textbox(rect, &element.content, styles.fontsize as f32, styles.color)?;
            if !drawn {
                warn!(?rect, fontsize = styles.fontsize, "text does not fit its box, skipped");
            }
        }
    }
    Ok(())
}

/// Applies every element to page one and serializes the document.
pub fn assemble(mut doc: Document, elements: &[PreparedElement]) -> Result<Vec<u8>, AppError> {
    let mut page = PageEditor::first_page(&mut doc).map_err(|e| AppError::InvalidDocument(e.to_string()))?;
    for prepared in elements {
        insert_element(&mut page, &prepared.element, prepared.logo.as_ref())?;
    }
    page.commit()?;

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| anyhow::anyhow!("serializing poster: {e}"))?;
    debug!(elements = elements.len(), bytes = out.len(), "poster assembled");
    Ok(out)
}

#[cfg(test)]
pub(crate) mod testing {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    /// Single page document whose MediaBox lives on the page tree root.
    pub(crate) fn one_page_pdf(media_box: [i64; 4]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Content {
            operations: vec![Operation::new("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()])],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => media_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub(crate) fn one_page_pdf_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        one_page_pdf([0, 0, 595, 842]).save_to(&mut out).unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use lopdf::{dictionary, Object};

    use super::*;

    fn element(json: &str) -> TemplateElement {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn element_defaults_apply() {
        let el = element(r#"{"content":"hi","element_type":"text","pos":{"x":1,"y":2,"w":3,"h":4}}"#);
        assert_eq!(el.text_styles, TextStyles::default());
        assert_eq!(el.qr_styles, StyleConfig::default());
        assert_eq!(Rect::from(el.pos), Rect { x: 1.0, y: 2.0, w: 3.0, h: 4.0 });
    }

    #[test]
    fn unknown_element_types_are_rejected() {
        let res = serde_json::from_str::<TemplateElement>(
            r#"{"content":"hi","element_type":"video","pos":{"x":1,"y":2,"w":3,"h":4}}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn validation_rejects_empty_boxes_and_fontsizes() {
        let el = element(r#"{"content":"hi","element_type":"qr","pos":{"x":1,"y":2,"w":0,"h":4}}"#);
        assert!(matches!(el.validate(0), Err(AppError::Validation(_))));
        let el = element(
            r#"{"content":"hi","element_type":"text","pos":{"x":1,"y":2,"w":3,"h":4},"text_styles":{"fontsize":0}}"#,
        );
        assert!(matches!(el.validate(1), Err(AppError::Validation(_))));
    }

    #[test]
    fn garbage_templates_are_invalid_documents() {
        assert!(matches!(open_template(b"<html>nope</html>"), Err(AppError::InvalidDocument(_))));
    }

    #[test]
    fn templates_without_pages_are_invalid_documents() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        assert!(matches!(open_template(&bytes), Err(AppError::InvalidDocument(_))));
    }

    #[test]
    fn assembles_qr_and_text_onto_page_one() {
        let doc = open_template(&testing::one_page_pdf_bytes()).unwrap();
        let elements = vec![
            PreparedElement {
                element: element(r#"{"content":"https://example.com","element_type":"qr","pos":{"x":10,"y":10,"w":100,"h":100}}"#),
                logo: None,
            },
            PreparedElement {
                element: element(r#"{"content":"Scan me","element_type":"text","pos":{"x":10,"y":120,"w":200,"h":30},"text_styles":{"fontsize":12,"color":[255,0,0]}}"#),
                logo: None,
            },
        ];
        let bytes = assemble(doc, &elements).unwrap();
        let out = Document::load_mem(&bytes).unwrap();
        let page_id = out.get_pages()[&1];
        let ops = out.get_and_decode_page_content(page_id).unwrap().operations;
        assert!(ops.iter().any(|op| op.operator == "Do"));
        assert!(ops.iter().any(|op| op.operator == "Tj"));
    }

    #[test]
    fn encoding_errors_abort_the_poster() {
        let doc = open_template(&testing::one_page_pdf_bytes()).unwrap();
        let elements = vec![PreparedElement {
            element: element(r#"{"content":"","element_type":"qr","pos":{"x":10,"y":10,"w":100,"h":100}}"#),
            logo: None,
        }];
        assert!(matches!(
            assemble(doc, &elements),
            Err(AppError::Compose(qr::ComposeError::Encoding(_)))
        ));
    }
}
