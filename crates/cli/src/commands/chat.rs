use chrono::Utc;
use shopsense_core::errors::ApplicationError;

use crate::commands::session::Session;
use crate::commands::{build_runtime, load_config, to_details, CommandFailure, CommandResult};

pub fn run(message: &str) -> CommandResult {
    let config = match load_config("chat") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("chat") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let mut assistant = session.default_assistant(&config).await;
        let turn = assistant.send(message).await.map_err(describe_failure);
        session.close().await;
        Ok::<_, CommandFailure>(turn?)
    });

    match result {
        Ok(turn) => CommandResult::success_with("chat", turn.reply.text.clone(), to_details(&turn)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}

fn describe_failure(error: ApplicationError) -> CommandFailure {
    let (error_class, exit_code) = match error {
        ApplicationError::Domain(_) => ("input_rejected", 6u8),
        _ => ("assistant", 7u8),
    };
    let correlation_id = format!("chat-{}", Utc::now().timestamp_millis());
    let interface = error.into_interface(correlation_id.as_str());

    (error_class, format!("{interface} [{correlation_id}]"), exit_code)
}
