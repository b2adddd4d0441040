use reelforge::{init_tracing, init_tracing_with_filter};

#[test]
fn subscriber_installs_once_per_process() -> anyhow::Result<()> {
    init_tracing_with_filter("reelforge=trace")?;
    tracing::info!("subscriber installed");

    assert!(init_tracing(true).is_err());
    assert!(init_tracing_with_filter("info").is_err());
    Ok(())
}
