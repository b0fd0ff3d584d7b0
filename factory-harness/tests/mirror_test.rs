use factory_harness::MirrorClient;
use ledger_core::{ContractInterface, EntityId, PollConfig, PollOutcome};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn factory_interface() -> ContractInterface {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("artifacts")
        .join("contracts");
    ContractInterface::load("FactoryContract", &dir).unwrap()
}

// Nothing listens on port 1, so every request fails immediately.
fn unreachable_mirror() -> MirrorClient {
    MirrorClient::new("http://127.0.0.1:1")
}

#[tokio::test]
async fn unreachable_mirror_check_returns_normally() {
    let mirror = unreachable_mirror();
    let factory = factory_interface();

    // best-effort path: the failure is logged and swallowed
    mirror
        .check_last_event(&factory, EntityId::new(0, 0, 1234))
        .await;
}

#[tokio::test]
async fn unreachable_mirror_wait_times_out_instead_of_failing() {
    let mirror = unreachable_mirror();
    let factory = factory_interface();
    let token = CancellationToken::new();

    let outcome = mirror
        .wait_for_log(
            &factory,
            EntityId::new(0, 0, 1234),
            PollConfig::new(50, 300).without_jitter(),
            &token,
        )
        .await;

    assert!(matches!(outcome, PollOutcome::TimedOut));
}

#[tokio::test]
async fn mirror_wait_stops_on_cancellation() {
    let mirror = unreachable_mirror();
    let factory = factory_interface();
    let token = CancellationToken::new();
    token.cancel();

    let outcome = mirror
        .wait_for_log(
            &factory,
            EntityId::new(0, 0, 1234),
            PollConfig::new(50, 60_000).without_jitter(),
            &token,
        )
        .await;

    assert!(matches!(outcome, PollOutcome::Cancelled));
}
