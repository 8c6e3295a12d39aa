// ABOUTME: Property tests for the output side of the terminal proxy.
// ABOUTME: Interleaved remote stdout/stderr chunks must land intact on each local stream.

mod support;

use bytes::Bytes;
use proptest::prelude::*;
use remsh::ssh::{
    ChannelEvent, CredentialResolver, ExitStatus, InteractiveSessionRunner, KeyEnv,
    LocalStreams, connect_and_run,
};
use support::fake_agent::FakeAgentConnector;
use support::fake_transport::{FakeTransport, Script};
use support::test_key_path;

/// (is_stderr, bytes) pairs as sent by the remote shell.
fn chunks() -> impl Strategy<Value = Vec<(bool, Vec<u8>)>> {
    prop::collection::vec(
        (any::<bool>(), prop::collection::vec(any::<u8>(), 1..64)),
        0..24,
    )
}

fn run_session(chunks: &[(bool, Vec<u8>)], code: u32) -> (ExitStatus, Vec<u8>, Vec<u8>) {
    let mut events: Vec<ChannelEvent> = chunks
        .iter()
        .map(|(is_stderr, data)| {
            let data = Bytes::copy_from_slice(data);
            if *is_stderr {
                ChannelEvent::Stderr(data)
            } else {
                ChannelEvent::Stdout(data)
            }
        })
        .collect();
    events.extend([
        ChannelEvent::ExitStatus(code),
        ChannelEvent::Eof,
        ChannelEvent::Closed,
    ]);

    let transport = FakeTransport::new(Script {
        events,
        ..Script::default()
    });
    let resolver = CredentialResolver::with_connector(
        None,
        test_key_path(),
        FakeAgentConnector::unreachable(),
    );
    let runner = InteractiveSessionRunner::new(KeyEnv::new("BASE64_SSH_KEY", test_key_path()));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = rt
        .block_on(connect_and_run(
            &transport,
            &resolver,
            &runner,
            "build-box",
            LocalStreams::new(&b""[..], &mut stdout, &mut stderr),
        ))
        .unwrap();
    (status, stdout, stderr)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn each_stream_receives_its_own_bytes_in_order(chunks in chunks(), code in 0u32..256) {
        let (status, stdout, stderr) = run_session(&chunks, code);

        let expected_out: Vec<u8> = chunks
            .iter()
            .filter(|(is_stderr, _)| !is_stderr)
            .flat_map(|(_, data)| data.clone())
            .collect();
        let expected_err: Vec<u8> = chunks
            .iter()
            .filter(|(is_stderr, _)| *is_stderr)
            .flat_map(|(_, data)| data.clone())
            .collect();

        prop_assert_eq!(status, ExitStatus::Code(code));
        prop_assert_eq!(stdout, expected_out);
        prop_assert_eq!(stderr, expected_err);
    }
}
