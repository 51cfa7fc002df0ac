use anyhow::Result;

use crate::core::config::Config;
use crate::core::search::KeywordSearcher;
use crate::mcp::McpServer;

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let searcher = KeywordSearcher::from_config(&config);

    log::debug!(
        "Snippet radius {}, max file size {:?}",
        config.effective_snippet_radius(),
        searcher.reader().max_file_size()
    );

    // The server loop is blocking stdio; keep it off the async workers.
    let server = McpServer::new(searcher);
    tokio::task::spawn_blocking(move || server.run()).await?
}
