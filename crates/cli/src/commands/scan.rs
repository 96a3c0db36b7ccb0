use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use shopsense_core::recognition::MockRecognizer;

use crate::commands::session::Session;
use crate::commands::{build_runtime, load_config, to_details, CommandFailure, CommandResult};

pub fn run(image: Option<PathBuf>, seed: Option<u64>) -> CommandResult {
    let config = match load_config("scan") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let frame = match image.as_deref().map(read_frame).transpose() {
        Ok(frame) => frame.unwrap_or_default(),
        Err(error) => return CommandResult::failure("scan", "image_read", format!("{error:#}"), 9),
    };
    let runtime = match build_runtime("scan") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let recognizer = match seed {
        Some(seed) => MockRecognizer::seeded(seed),
        None => MockRecognizer::new(),
    };

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let mut assistant = session.assistant(&config, Arc::new(recognizer)).await;
        let scanned = assistant
            .scan(&frame)
            .await
            .map_err(|error| ("recognition", error.to_string(), 7u8));
        session.close().await;
        Ok::<_, CommandFailure>(scanned?)
    });

    match result {
        Ok(Some(scan)) => {
            CommandResult::success_with("scan", "product recognized", to_details(&scan))
        }
        Ok(None) => CommandResult::success("scan", "no product recognized"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("scan", error_class, message, exit_code)
        }
    }
}

fn read_frame(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("could not read image `{}`", path.display()))
}
