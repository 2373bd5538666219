//! Telegram alerts example
//!
//! Logs everything to the console and forwards errors to Telegram chats in
//! batches, flushing the queue on shutdown.
//!
//! Run with:
//! TELEGRAM_BOT_TOKEN=123:abc TELEGRAM_CHAT_IDS=-1001234567890 cargo run --example telegram_alerts

use rust_telegram_logger::prelude::*;
use rust_telegram_logger::{error, fields, info, warn};
use std::env;
use std::thread;
use std::time::Duration;

fn chat_ids_from_env() -> Result<Vec<i64>> {
    let raw = env::var("TELEGRAM_CHAT_IDS").unwrap_or_default();
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map_err(|e| LoggerError::config("TELEGRAM_CHAT_IDS", format!("{}: {}", id, e)))
        })
        .collect()
}

fn main() -> Result<()> {
    println!("=== Rust Telegram Logger - Alerts Example ===\n");

    let token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
    let chat_ids = chat_ids_from_env()?;

    // Verify the token before wiring the router
    let bot = TelegramTransport::new(token.clone())?.get_me()?;
    println!("1. Connected as @{}", bot.username.unwrap_or(bot.first_name));

    let shutdown = CancelToken::new();
    let router = TelegramRouter::builder(token, chat_ids)
        .level(LogLevel::Error)
        .notify_on([LogLevel::Fatal, LogLevel::Panic])
        .layout(MessageLayout::Detailed)
        .queue(QueueOptions::new(shutdown.clone(), Duration::from_secs(2), 100))
        .build()?;

    let console = ConsoleSink::new(LogLevel::Debug);
    let logger = Logger::new(Tee::new(Vec::new()).and(console).and(router.clone())).named("alerts-demo");

    println!("\n2. Logging from several workers:");
    let handles: Vec<_> = (0..3)
        .map(|worker| {
            let logger = logger.with(fields! { "worker" => worker });
            thread::spawn(move || {
                for job in 0..3 {
                    info!(logger, "job {} started", job);
                    if job == 2 {
                        error!(logger, "job {} failed: upstream timeout", job);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    warn!(logger, "{} entries waiting for the next batch", router.queue_len());
    logger.fatal("shutting down after failures");

    println!("\n3. Shutting down:");
    shutdown.cancel();
    if let Some(reason) = router.join_drain_loop()? {
        println!("   Drain loop stopped: {}", reason);
    }

    let metrics = router.metrics();
    println!(
        "   Delivered {} messages, {} failed",
        metrics.delivered_count(),
        metrics.failed_count()
    );

    println!("\n=== Example completed successfully ===");
    Ok(())
}
