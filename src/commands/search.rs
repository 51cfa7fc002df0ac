use anyhow::Result;

use crate::core::config::Config;
use crate::core::search::{KeywordSearcher, SearchRequest};
use crate::ui::search_display;

pub struct SearchOptions {
    pub keyword: String,
    pub path: String,
    pub case_sensitive: bool,
    pub json: bool,
}

pub async fn run(options: SearchOptions) -> Result<()> {
    let config = Config::load()?;
    let searcher = KeywordSearcher::from_config(&config);

    let request = SearchRequest::new(&options.keyword, options.path, options.case_sensitive)?;
    let result = searcher.search(&request)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        search_display::display_results(&result, config.effective_snippet_radius());
    }

    Ok(())
}
