use crate::commands::session::Session;
use crate::commands::{build_runtime, load_config, to_details, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("history") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("history") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let assistant = session.default_assistant(&config).await;
        let messages = assistant.history().to_vec();
        session.close().await;
        Ok::<_, CommandFailure>(messages)
    });

    match result {
        Ok(messages) => CommandResult::success_with(
            "history",
            format!("{} messages", messages.len()),
            to_details(&messages),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("history", error_class, message, exit_code)
        }
    }
}

pub fn clear() -> CommandResult {
    let config = match load_config("clear") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("clear") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let mut assistant = session.default_assistant(&config).await;
        let cleared =
            assistant.clear().await.map_err(|error| ("persistence", error.to_string(), 8u8));
        session.close().await;
        cleared
    });

    match result {
        Ok(()) => CommandResult::success("clear", "conversation history cleared"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("clear", error_class, message, exit_code)
        }
    }
}
