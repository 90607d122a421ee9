use std::{

    collections::{VecDeque},
    net::{Ipv4Addr},

    time::{

        Duration,
        Instant,
    },
};

use ekko_probe::{ error::{ProbeError},

    SessionConfig,
    ProbeSession,
    SessionState,
    TrialOutcome,
    EchoRequest,
    Resolver,
    Transport,
    Received,

    ICMP_ECHO_REPLY,
    checksum,
    decode,
};

/// What the network does with one request.
#[derive(Clone, Copy)]
enum Script {
    ReplyAfter(u64),
    StrayThenReplyAfter(u64, u64),
    Silence,
}

/// Answers each request according to its script, echoing the request's identifier.
struct ScriptedTransport {
    script: VecDeque<Script>,
    pending: VecDeque<Received>,
    identifier: u16,
}

impl ScriptedTransport {
    fn new<I: IntoIterator<Item = Script>>(script: I) -> ScriptedTransport {
        ScriptedTransport {
            script: script.into_iter().collect(),
            pending: VecDeque::new(),
            identifier: 0,
        }
    }
}

fn reply(identifier: u16) -> Vec<u8> {
    let mut message = EchoRequest::new(identifier).as_slice().to_vec();
    message[0] = ICMP_ECHO_REPLY;
    message[2..4].copy_from_slice(&[0, 0]);
    let sum = checksum(&message);
    message[2..4].copy_from_slice(&sum.to_be_bytes());

    let mut datagram = vec![
        0x45, 0x00, 0x00, 0xDC, 0x00, 0x01, 0x00, 0x00,
        0x3A, 0x01, 0x00, 0x00, 0x5D, 0xB8, 0xD8, 0x22,
        0xC0, 0xA8, 0x01, 0x02,
    ];

    datagram.extend_from_slice(&message);
    datagram
}

impl Transport for ScriptedTransport {
    fn send(&mut self, _target: Ipv4Addr, packet: &[u8]) -> Result<(), ProbeError> {
        assert_eq!(checksum(packet), 0);
        self.identifier = u16::from_be_bytes([packet[4], packet[5]]);

        let now = Instant::now();
        match self.script.pop_front().unwrap_or(Script::Silence) {

            Script::ReplyAfter(ms) => self.pending.push_back(Received {
                datagram: reply(self.identifier),
                received_at: now + Duration::from_millis(ms),
            }),

            Script::StrayThenReplyAfter(stray_ms, ms) => {
                self.pending.push_back(Received {
                    datagram: reply(self.identifier.wrapping_add(1)),
                    received_at: now + Duration::from_millis(stray_ms),
                });

                self.pending.push_back(Received {
                    datagram: reply(self.identifier),
                    received_at: now + Duration::from_millis(ms),
                });
            }

            Script::Silence => (),
        }

        Ok(())
    }

    fn receive(&mut self, _remaining: Duration) -> Result<Option<Received>, ProbeError> {
        Ok(self.pending.pop_front())
    }
}

struct NoNames;

impl Resolver for NoNames {
    fn lookup_address(&self, host: &str) -> Result<Ipv4Addr, ProbeError> {
        Err(ProbeError::ResolverIpLookup(host.to_string()))
    }

    fn lookup_name(&self, address: Ipv4Addr) -> Result<String, ProbeError> {
        Err(ProbeError::ResolverDomainLookup(address.to_string()))
    }
}

fn session(target: &str, trials: u32, timeout_secs: u64) -> ProbeSession {
    let config = SessionConfig::new(target)
        .with_trials(trials)
        .with_timeout_secs(timeout_secs)
        .with_pause(Duration::ZERO);

    ProbeSession::with_parts(config, Box::new(NoNames), Box::new(true))
}

#[test]
fn test_every_trial_replies() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new(vec![Script::ReplyAfter(50); 4]);
    let result = session("93.184.216.34", 4, 4).run_with(|| Ok(transport))?;

    assert_eq!(result.host, "93.184.216.34");
    assert_eq!(result.ttl, 58);
    assert_eq!((result.sent, result.received, result.lost), (4, 4, 0));
    assert_eq!(result.loss_percentage, 0.0);
    assert_eq!((result.min_ms, result.max_ms, result.average_ms), (50, 50, 50));
    Ok(())
}

#[test]
fn test_every_trial_times_out() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new(vec![Script::Silence; 4]);
    let result = session("93.184.216.34", 4, 4).run_with(|| Ok(transport))?;

    assert_eq!((result.sent, result.received, result.lost), (4, 0, 4));
    assert_eq!(result.loss_percentage, 100.0);
    assert_eq!((result.min_ms, result.max_ms, result.average_ms), (4000, 4000, 4000));
    assert_eq!(result.ttl, 0);
    Ok(())
}

#[test]
fn test_partial_loss() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new(vec![
        Script::ReplyAfter(10),
        Script::Silence,
        Script::ReplyAfter(30),
        Script::Silence,
    ]);

    let result = session("93.184.216.34", 4, 4).run_with(|| Ok(transport))?;

    assert_eq!(result.trials, vec![
        TrialOutcome::Delay { milliseconds: 10, corrected: false },
        TrialOutcome::Lost,
        TrialOutcome::Delay { milliseconds: 30, corrected: false },
        TrialOutcome::Lost,
    ]);

    assert_eq!((result.received, result.lost), (2, 2));
    assert_eq!(result.loss_percentage, 50.0);
    assert_eq!((result.min_ms, result.max_ms, result.average_ms), (10, 30, 10));
    Ok(())
}

#[test]
fn test_unresolvable_name() -> anyhow::Result<()> {
    let mut session = session("no-such-host.invalid", 4, 4);
    let result = session.run_with(|| Ok(ScriptedTransport::new(Vec::new())))?;

    assert_eq!(session.state(), SessionState::Done);
    assert!(!result.is_resolved());
    assert_eq!(result.address, Ipv4Addr::new(0, 0, 0, 0));
    assert_eq!(result.payload_size, 0);
    assert_eq!((result.sent, result.received, result.lost), (4, 0, 4));
    assert_eq!(result.received + result.lost, result.sent);
    assert_eq!(result.loss_percentage, 100.0);
    assert_eq!((result.min_ms, result.max_ms, result.average_ms), (4000, 4000, 4000));
    assert!(result.trials.is_empty());
    Ok(())
}

#[test]
fn test_stray_reply_is_skipped() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new(vec![
        Script::StrayThenReplyAfter(5, 20),
        Script::ReplyAfter(40),
    ]);

    let result = session("93.184.216.34", 2, 1).run_with(|| Ok(transport))?;

    assert_eq!(result.trials, vec![
        TrialOutcome::Delay { milliseconds: 20, corrected: false },
        TrialOutcome::Delay { milliseconds: 40, corrected: false },
    ]);

    assert_eq!(result.average_ms, 30);
    Ok(())
}

#[test]
fn test_counts_always_add_up() -> anyhow::Result<()> {
    let patterns: Vec<Vec<Script>> = vec![
        vec![Script::Silence],
        vec![Script::ReplyAfter(1), Script::Silence, Script::Silence],
        vec![Script::ReplyAfter(3); 5],
    ];

    for pattern in patterns {
        let trials = pattern.len() as u32;
        let result = session("10.9.8.7", trials, 1).run_with(|| Ok(ScriptedTransport::new(pattern)))?;

        assert_eq!(result.sent, trials);
        assert_eq!(result.received + result.lost, result.sent);
        assert_eq!(result.loss_percentage, result.lost as f64 * 100.0 / trials as f64);
        assert_eq!(result.trials.len(), trials as usize);
    }

    Ok(())
}

#[test]
fn test_reply_decodes_as_sent() -> anyhow::Result<()> {
    let (ip, icmp) = decode(&reply(0x4242))?;

    assert_eq!(ip.ttl, 58);
    assert_eq!(ip.source, Ipv4Addr::new(93, 184, 216, 34));
    assert!(icmp.is_echo_reply());
    assert_eq!(icmp.identifier, 0x4242);
    Ok(())
}
