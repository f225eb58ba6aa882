#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  songbook_lib::run().await
}
