use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use colloq::cli::{
    self, failure_report, parse_args, parse_command, CliCommand, ReplCommand, HELP_TEXT,
};
use colloq::config::ChatConfig;
use colloq::error::ChatError;
use colloq::prompts::{suggested_prompt, SUGGESTED_PROMPTS};
use colloq::session::{ExchangeOutcome, SessionController};
use colloq::sse::StreamEvent;

#[tokio::main]
async fn main() -> Result<()> {
    match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", cli::version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", cli::usage());
            return Ok(());
        }
        CliCommand::Run => {}
    }

    color_eyre::install()?;

    // Logs go to stderr so answers on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::from_env();
    config.validate()?;
    info!(api_url = %config.api_url, data_dir = ?config.data_dir, "Starting colloq");

    let controller = SessionController::from_config(&config);
    run_repl(&controller).await
}

async fn run_repl(controller: &SessionController) -> Result<()> {
    println!(
        "{} - {}. Type /help for commands.",
        cli::version_line(),
        controller.active_thread().title
    );
    if !controller.has_conversation() {
        print_prompts();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_command(&line) {
            ReplCommand::Ask(prompt) => ask(controller, Some(&prompt)).await,
            ReplCommand::AskComposer => ask(controller, None).await,
            ReplCommand::NewThread => {
                controller.new_thread();
                println!("Started a new conversation.");
            }
            ReplCommand::ListThreads => print_threads(controller),
            ReplCommand::Switch(n) => match thread_id_at(controller, n) {
                Some(id) => {
                    controller.select_thread(&id);
                    print_active(controller);
                }
                None => println!("No conversation {}.", n),
            },
            ReplCommand::Delete(n) => match thread_id_at(controller, n) {
                Some(id) => {
                    controller.delete_thread(&id);
                    println!("Deleted conversation {}.", n);
                    print_active(controller);
                }
                None => println!("No conversation {}.", n),
            },
            ReplCommand::Clear => {
                controller.clear_conversation();
                println!("Conversation cleared.");
            }
            ReplCommand::Retry => {
                if controller.retry() {
                    println!(
                        "Composer: {}\n(press Enter to send it)",
                        controller.composer()
                    );
                } else {
                    println!("Nothing to retry.");
                }
            }
            ReplCommand::ListPrompts => print_prompts(),
            ReplCommand::UsePrompt(n) => match suggested_prompt(n) {
                Some(prompt) => {
                    controller.insert_prompt(prompt.text);
                    println!("Composer: {}\n(press Enter to send it)", prompt.text);
                }
                None => println!("No suggested prompt {}.", n),
            },
            ReplCommand::Help => println!("{}", HELP_TEXT),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => println!("{}", message),
        }
    }

    Ok(())
}

/// Run one exchange, echoing fragments as they arrive. Ctrl+C stops it.
async fn ask(controller: &SessionController, prompt: Option<&str>) {
    let printed = AtomicBool::new(false);
    let exchange = controller.ask_with(prompt, |event| {
        if let StreamEvent::Delta(fragment) = event {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
            printed.store(true, Ordering::Relaxed);
        }
    });
    tokio::pin!(exchange);

    let result = loop {
        tokio::select! {
            result = &mut exchange => break result,
            _ = tokio::signal::ctrl_c() => controller.stop(),
        }
    };
    let printed = printed.load(Ordering::Relaxed);

    match result {
        Ok(ExchangeOutcome::Completed { text }) => {
            if printed {
                println!();
            } else {
                println!("{}", text);
            }
        }
        Ok(ExchangeOutcome::Aborted) => {
            if printed {
                println!();
            }
            println!("[{}]", ChatError::Cancelled.user_message());
        }
        Err(err) => {
            if printed {
                println!();
            }
            let notice = controller.notice().map(|notice| notice.message);
            for line in failure_report(&err, notice.as_deref()) {
                println!("{}", line);
            }
        }
    }
}

fn thread_id_at(controller: &SessionController, n: usize) -> Option<String> {
    let threads = controller.threads();
    n.checked_sub(1)
        .and_then(|i| threads.get(i))
        .map(|thread| thread.id.clone())
}

fn print_threads(controller: &SessionController) {
    let active = controller.active_thread().id;
    for (i, thread) in controller.threads().iter().enumerate() {
        let marker = if thread.id == active { '*' } else { ' ' };
        println!(
            "{} {:>2}. {} ({} messages)",
            marker,
            i + 1,
            thread.title,
            thread.messages.len()
        );
    }
}

fn print_active(controller: &SessionController) {
    let thread = controller.active_thread();
    println!("Now in: {}", thread.title);
    for message in &thread.messages {
        let who = if message.is_user() { "you" } else { "model" };
        println!("  [{}] {}", who, message.text);
    }
}

fn print_prompts() {
    println!("Suggested prompts:");
    for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
        println!("  {}. {}: {}", i + 1, prompt.head, prompt.text);
    }
    println!("Use /use <n> to pick one.");
}
