use anyhow::Result;
use std::io::{self, Write};

use crate::core::config::Config;
use crate::core::reader::FileReader;

pub struct ReadOptions {
    pub path: String,
}

pub async fn run(options: ReadOptions) -> Result<()> {
    let config = Config::load()?;
    let reader = FileReader::new().with_max_file_size(config.effective_max_file_size());

    let text = reader.read(&options.path)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
