//! QuickClip Integration Tests
//!
//! Exercises a running QuickClip server through the quickclip-client library.
//! Point it at a server with `QUICKCLIP_SERVER_URL`. The expiry check needs
//! the server started with `QUICKCLIP_MIN_TIMER=1`; otherwise it is skipped.

use anyhow::Result;
use futures::future::join_all;
use quickclip_client::{Error, QuickClipClient, QuickClipClientOptions};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickclip_integration_tests=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = QuickClipClientOptions::from_env();

    tracing::info!("🧪 QuickClip Integration Tests (Rust)");
    tracing::info!("   Server: {}", options.url);
    println!();

    test_basic_operations().await?;
    test_repeatable_reads().await?;
    test_validation().await?;
    test_parallel_create_get().await?;
    test_data_isolation().await?;
    test_expiration().await?;

    println!();
    tracing::info!("✅ All tests passed!");

    Ok(())
}

async fn create_client() -> Result<QuickClipClient> {
    let client = QuickClipClient::with_options(QuickClipClientOptions::from_env()).await?;
    Ok(client)
}

/// Create, read and delete a single clip
async fn test_basic_operations() -> Result<()> {
    tracing::info!("Test: Basic Operations");

    let client = create_client().await?;
    let text = format!("hello world {}", uuid::Uuid::new_v4());

    let created = client.create(&text, 60).await?;
    assert_eq!(created.code.len(), 6, "Codes are 6 characters");
    assert_eq!(created.timer, 60);
    tracing::info!("   CREATE → {} (expires {})", created.code, created.expires_at);

    let clip = client.get(&created.code).await?;
    let clip = clip.ok_or_else(|| anyhow::anyhow!("Clip {} should be found", created.code))?;
    assert_eq!(clip.text, text, "Text should match");
    assert!(clip.remaining_seconds <= 60);
    tracing::info!(
        "   GET {} → {} chars, {}s left",
        clip.code,
        clip.text.len(),
        clip.remaining_seconds
    );

    client.delete(&created.code).await?;
    tracing::info!("   DELETE {}", created.code);

    assert!(client.get(&created.code).await?.is_none(), "Clip should be gone after delete");

    // Deleting again still succeeds
    client.delete(&created.code).await?;

    tracing::info!("   ✓ Basic operations work correctly");
    Ok(())
}

/// Reads do not consume a clip and codes are case-insensitive
async fn test_repeatable_reads() -> Result<()> {
    tracing::info!("Test: Repeatable, case-insensitive reads");

    let client = create_client().await?;
    let created = client.create("read me twice", 120).await?;

    for code in [created.code.clone(), created.code.to_lowercase()] {
        let clip = client.get(&code).await?;
        assert_eq!(
            clip.map(|c| c.text).as_deref(),
            Some("read me twice"),
            "Lookup by {code} should succeed"
        );
    }

    client.delete(&created.code).await?;
    tracing::info!("   ✓ Reads are non-destructive and case-insensitive");
    Ok(())
}

/// The server rejects bad input with 400
async fn test_validation() -> Result<()> {
    tracing::info!("Test: Validation");

    let client = create_client().await?;

    let err = client.create("   ", 60).await.expect_err("blank text is rejected");
    assert!(matches!(err, Error::InvalidInput(_)), "unexpected error: {err}");
    tracing::info!("   blank text → {}", err);

    let err = client.create("ok", 100_000).await.expect_err("huge timer is rejected");
    assert!(matches!(err, Error::InvalidInput(_)), "unexpected error: {err}");
    tracing::info!("   timer 100000 → {}", err);

    let err = client.get("ABC").await.expect_err("short code is rejected");
    assert!(matches!(err, Error::InvalidInput(_)), "unexpected error: {err}");
    tracing::info!("   code ABC → {}", err);

    tracing::info!("   ✓ Invalid input is rejected");
    Ok(())
}

/// Many concurrent creates get distinct codes, and every clip reads back
async fn test_parallel_create_get() -> Result<()> {
    tracing::info!("Test: Parallel CREATE/GET (300 concurrent operations)");

    let num_operations = 300;
    let semaphore = Arc::new(Semaphore::new(64));
    let start = Instant::now();

    let texts: Vec<String> = (0..num_operations)
        .map(|i| format!("parallel-{}-{}", i, uuid::Uuid::new_v4()))
        .collect();

    let create_futures: Vec<_> = texts
        .iter()
        .map(|text| {
            let text = text.clone();
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await?;
                let client = create_client().await?;
                let created = client.create(&text, 300).await?;
                Ok::<_, anyhow::Error>((created.code, text))
            }
        })
        .collect();

    let created = join_all(create_futures)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let create_elapsed = start.elapsed();
    tracing::info!("   CREATE {} clips in {:?}", num_operations, create_elapsed);

    let distinct: HashSet<&str> = created.iter().map(|(code, _)| code.as_str()).collect();
    assert_eq!(distinct.len(), created.len(), "Every create should get its own code");

    let get_start = Instant::now();
    let errors = Arc::new(AtomicUsize::new(0));

    let get_futures: Vec<_> = created
        .iter()
        .map(|(code, expected)| {
            let code = code.clone();
            let expected = expected.clone();
            let errors = Arc::clone(&errors);
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await?;
                let client = create_client().await?;
                match client.get(&code).await? {
                    None => {
                        tracing::error!("Clip not found: {}", code);
                        errors.fetch_add(1, Ordering::SeqCst);
                    }
                    Some(clip) if clip.text != expected => {
                        tracing::error!(
                            "Text mismatch for {}: expected '{}', got '{}'",
                            code,
                            expected,
                            clip.text
                        );
                        errors.fetch_add(1, Ordering::SeqCst);
                    }
                    Some(_) => {}
                }
                client.delete(&code).await?;
                Ok::<_, anyhow::Error>(())
            }
        })
        .collect();

    join_all(get_futures)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let get_elapsed = get_start.elapsed();
    tracing::info!("   GET+DELETE {} clips in {:?}", num_operations, get_elapsed);
    tracing::info!(
        "   Throughput: {:.0} ops/sec (CREATE)",
        num_operations as f64 / create_elapsed.as_secs_f64()
    );

    assert_eq!(errors.load(Ordering::SeqCst), 0, "No errors should occur");
    tracing::info!("   ✓ All {} clips verified correctly", num_operations);

    Ok(())
}

/// Concurrent clients never see each other's text
async fn test_data_isolation() -> Result<()> {
    tracing::info!("Test: Data Isolation (concurrent clients)");

    let num_clients = 25;
    let ops_per_client = 10;
    let semaphore = Arc::new(Semaphore::new(50));
    let results = Arc::new(tokio::sync::Mutex::new(HashMap::new()));

    let client_futures: Vec<_> = (0..num_clients)
        .map(|client_id| {
            let results = Arc::clone(&results);
            let semaphore = Arc::clone(&semaphore);

            async move {
                let _permit = semaphore.acquire().await?;
                let client = create_client().await?;

                for op in 0..ops_per_client {
                    let text = format!("client{}-text{}-{}", client_id, op, uuid::Uuid::new_v4());
                    let created = client.create(&text, 300).await?;
                    results.lock().await.insert(created.code, text);
                }

                Ok::<_, anyhow::Error>(())
            }
        })
        .collect();

    join_all(client_futures)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let expected = results.lock().await;
    let client = create_client().await?;
    let mut errors = 0;

    for (code, text) in expected.iter() {
        let clip = client.get(code).await?;
        if clip.as_ref().map(|c| c.text.as_str()) != Some(text.as_str()) {
            tracing::error!("Isolation failure: code={}, expected={}, got={:?}", code, text, clip);
            errors += 1;
        }
        client.delete(code).await?;
    }

    assert_eq!(errors, 0, "No isolation failures should occur");
    tracing::info!("   ✓ {} clips verified, no cross-contamination", expected.len());

    Ok(())
}

/// Clips disappear once their timer runs out
async fn test_expiration() -> Result<()> {
    tracing::info!("Test: Expiration");

    let client = create_client().await?;

    let created = match client.create("temporary", 1).await {
        Ok(created) => created,
        Err(Error::InvalidInput(detail)) => {
            tracing::warn!("   Skipped: server refuses a 1s timer ({})", detail);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    assert!(client.get(&created.code).await?.is_some(), "Clip should exist immediately");
    tracing::info!("   CREATE {} with timer=1s", created.code);

    tracing::info!("   Waiting 2 seconds for expiration...");
    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

    assert!(client.get(&created.code).await?.is_none(), "Clip should be gone after its timer");

    tracing::info!("   ✓ Expiration works correctly");
    Ok(())
}
