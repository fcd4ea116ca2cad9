#[tokio::main]
async fn main() {
    imgconvert::server::start().await;
}
