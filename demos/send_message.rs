use std::io;

use semaphore_sms::SemaphoreClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("SEMAPHORE_API_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SEMAPHORE_API_KEY environment variable is required",
        )
    })?;
    let recipient = std::env::var("SEMAPHORE_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SEMAPHORE_PHONE environment variable is required",
        )
    })?;
    let message = std::env::var("SEMAPHORE_MESSAGE")
        .unwrap_or_else(|_| "Hello from the semaphore-sms example.".to_owned());
    let sender = std::env::var("SEMAPHORE_SENDER").unwrap_or_default();

    let client = SemaphoreClient::builder(api_key)
        .sender_name(sender)
        .build()?;

    let report = client.send_one(recipient, message).await?;
    println!(
        "status: {:?}, attempts: {}, message_id: {:?}",
        report.status, report.attempts, report.message_id
    );
    if !report.success() {
        println!("detail: {}", report.detail);
    }

    Ok(())
}
