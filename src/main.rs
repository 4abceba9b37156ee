use anyhow::Result;
use geoflow::cli::{App, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();
    let app = App::from_args(&args)?;

    app.run(&args).await?;

    Ok(())
}
