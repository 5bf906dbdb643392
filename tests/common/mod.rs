#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use qrposter::{app, config::Config, state::AppState};
use tiny_http::{Response, Server};
use tower::ServiceExt;

/// Serves fixed `(status, body)` pairs by path on an ephemeral port; unknown paths 404.
pub fn serve(routes: Vec<(&'static str, u16, Vec<u8>)>) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let routes: HashMap<_, _> = routes.into_iter().map(|(p, s, b)| (p.to_string(), (s, b))).collect();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let (status, body) = routes.get(request.url()).cloned().unwrap_or((404, b"missing".to_vec()));
            let _ = request.respond(Response::new(tiny_http::StatusCode(status), vec![], Cursor::new(body.clone()), Some(body.len()), None));
        }
    });
    format!("http://{addr}")
}

/// Like `serve` for a single path, but every response is held back for `delay`.
pub fn serve_slow(path: &'static str, delay: Duration, body: Vec<u8>) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            std::thread::sleep(delay);
            let (status, body) = if request.url() == path { (200, body.clone()) } else { (404, b"missing".to_vec()) };
            let _ = request.respond(Response::new(tiny_http::StatusCode(status), vec![], Cursor::new(body.clone()), Some(body.len()), None));
        }
    });
    format!("http://{addr}{path}")
}

pub fn test_app() -> Router {
    app_with(Config::default())
}

pub fn app_with(config: Config) -> Router {
    app(AppState::new(config).unwrap())
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (u16, String, Vec<u8>) {
    let body = body.to_string();
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, bytes)
}

pub fn template_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content = Content { operations: vec![Operation::new("re", vec![0.into(), 0.into(), 10.into(), 10.into()]), Operation::new("f", vec![])] };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Contents" => content_id,
        "Resources" => Dictionary::new(),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn png_logo() -> Vec<u8> {
    let logo = image::RgbaImage::from_pixel(64, 64, image::Rgba([200, 30, 30, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(logo)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}
