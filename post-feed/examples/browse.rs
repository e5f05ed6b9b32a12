// Example: browse the live post collection, open a post, then come back to the same rows.
//
// RUST_LOG=post_feed=debug,virtual_list=debug cargo run -p post-feed --example browse
use post_feed::{AppShell, FeedConfig, HttpPostApi, Screen};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = FeedConfig::default();
    let api = HttpPostApi::new(&config)?;
    let mut shell = AppShell::new(api, config)?;

    shell.open("/").await?;
    println!("{}\n----", shell.render());

    for _ in 0..3 {
        shell.scroll_to(u64::MAX).await;
    }
    let offset = shell.scroll_to(40).await;
    println!("loaded {} posts, window at {offset}", shell.feed().len());

    let Screen::List(list) = shell.render() else {
        anyhow::bail!("list did not load: {}", shell.render());
    };
    let Some(row) = list.rows.first() else {
        anyhow::bail!("no rows rendered");
    };
    if let Some(route) = shell.activate(row.index).await {
        println!("opened {route}\n{}\n----", shell.render());
    }

    shell.back().await;
    println!("back at {}\n{}", shell.window_scroll(), shell.render());
    Ok(())
}
