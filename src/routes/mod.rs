pub mod poster;
pub mod qr;

pub async fn health() -> &'static str {
    "ok"
}
