use oracle_core::{
    AdviceOutcome, AdviceRequest, AdviceResult, AdviceUnavailable, Advisor, SessionToken,
};
use serde::Serialize;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_ADVISOR_TIMEOUT_MS: u64 = 30_000;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// External program that answers one hand per invocation: request JSON on
/// stdin, reply JSON on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct AdvisorPayload {
    dealer: String,
    player: Vec<String>,
}

impl From<&AdviceRequest> for AdvisorPayload {
    fn from(request: &AdviceRequest) -> Self {
        Self {
            dealer: request.dealer.face().code(),
            player: request
                .player
                .iter()
                .map(|card| card.face().code())
                .collect(),
        }
    }
}

impl AdvisorCommand {
    /// Splits `command_line` on whitespace; `None` when it is blank.
    pub fn parse(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }

    pub fn describe(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }

    pub fn run(&self, request: &AdviceRequest) -> AdviceOutcome {
        let body = serde_json::to_string(&AdvisorPayload::from(request))
            .map_err(|err| AdviceUnavailable::new(format!("encode request: {err}")))?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| AdviceUnavailable::new(format!("spawn {}: {err}", self.program)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdviceUnavailable::new("advisor stdout unavailable"))?;
        let reader = thread::spawn(move || {
            let mut out = String::new();
            stdout.read_to_string(&mut out).map(|_| out)
        });

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(body.as_bytes()) {
                log::debug!("advisor did not take the whole request: {err}");
            }
        }

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AdviceUnavailable::new(format!(
                        "advisor timed out after {} ms",
                        self.timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    return Err(AdviceUnavailable::new(format!("wait for advisor: {err}")));
                }
            }
        };

        let output = reader
            .join()
            .map_err(|_| AdviceUnavailable::new("advisor output reader panicked"))?
            .map_err(|err| AdviceUnavailable::new(format!("read advisor output: {err}")))?;
        if !status.success() {
            return Err(AdviceUnavailable::new(format!("advisor exited with {status}")));
        }
        parse_reply(&output)
    }
}

/// Parses an advisor reply, tolerating text around the JSON object (model
/// providers like to wrap it in code fences).
pub fn parse_reply(text: &str) -> AdviceOutcome {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(AdviceUnavailable::new("advisor reply has no JSON object")),
    };
    serde_json::from_str::<AdviceResult>(json)
        .map_err(|err| AdviceUnavailable::new(format!("malformed advisor reply: {err}")))
}

#[derive(Debug)]
pub struct AdviceCompletion {
    pub token: SessionToken,
    pub outcome: AdviceOutcome,
}

/// Runs each request on its own worker thread and hands outcomes back over
/// a channel drained by the UI loop.
pub struct ProcessAdvisor {
    command: Option<AdvisorCommand>,
    sender: Sender<AdviceCompletion>,
    receiver: Receiver<AdviceCompletion>,
}

impl ProcessAdvisor {
    pub fn new(command: Option<AdvisorCommand>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            command,
            sender,
            receiver,
        }
    }

    pub fn command(&self) -> Option<&AdvisorCommand> {
        self.command.as_ref()
    }

    pub fn try_completions(&self) -> Vec<AdviceCompletion> {
        self.receiver.try_iter().collect()
    }

    fn fail(&self, token: SessionToken, reason: impl Into<String>) {
        let _ = self.sender.send(AdviceCompletion {
            token,
            outcome: Err(AdviceUnavailable::new(reason)),
        });
    }
}

impl Advisor for ProcessAdvisor {
    fn submit(&mut self, request: AdviceRequest) {
        let token = request.token;
        let Some(command) = self.command.clone() else {
            self.fail(token, "no advisor configured (use --advisor or ORACLE_ADVISOR)");
            return;
        };
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("advisor-{}", token.get()))
            .spawn(move || {
                let outcome = command.run(&request);
                let _ = sender.send(AdviceCompletion { token, outcome });
            });
        if let Err(err) = spawned {
            self.fail(token, format!("start advisor worker: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::{AdviceAction, AdviceSession, PlayerSlot, SelectionTarget, Table};

    fn ready_table() -> Table {
        let mut table = Table::new();
        for (target, text) in [
            (SelectionTarget::Dealer, "KS"),
            (SelectionTarget::Player(PlayerSlot::Append), "7H"),
            (SelectionTarget::Player(PlayerSlot::Append), "9D"),
        ] {
            table.open_picker(target);
            table.choose_face(text.parse().expect("card"));
        }
        table
    }

    fn wait_for(advisor: &ProcessAdvisor) -> AdviceCompletion {
        advisor
            .receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("advisor completion")
    }

    #[test]
    fn parse_reply_reads_plain_json() {
        let result =
            parse_reply(r#"{"action":"STAND","confidence":92,"explanation":"17 v K"}"#)
                .expect("reply");
        assert_eq!(result.action(), AdviceAction::Stand);
        assert_eq!(result.confidence(), 92);
        assert_eq!(result.explanation(), "17 v K");
    }

    #[test]
    fn parse_reply_strips_code_fences() {
        let text = "```json\n{\"action\":\"DOUBLE\",\"confidence\":80.4,\"explanation\":\"11\"}\n```";
        let result = parse_reply(text).expect("reply");
        assert_eq!(result.action(), AdviceAction::Double);
        assert_eq!(result.confidence(), 80);
    }

    #[test]
    fn parse_reply_rejects_unknown_action_and_bad_confidence() {
        assert!(parse_reply(r#"{"action":"INSURANCE","confidence":50}"#).is_err());
        assert!(parse_reply(r#"{"action":"HIT","confidence":140}"#).is_err());
        assert!(parse_reply("no json here").is_err());
    }

    #[test]
    fn parse_command_line() {
        let command =
            AdvisorCommand::parse("  python3 oracle.py --model fast ", Duration::from_secs(1))
                .expect("command");
        assert_eq!(command.describe(), "python3 oracle.py --model fast");
        assert!(AdvisorCommand::parse("   ", Duration::from_secs(1)).is_none());
    }

    #[test]
    fn missing_command_fails_the_request() {
        let mut table = ready_table();
        let mut advisor = ProcessAdvisor::new(None);
        let token = table.request_advice(&mut advisor).expect("token");
        let completion = wait_for(&advisor);
        assert_eq!(completion.token, token);
        assert!(completion.outcome.is_err());
        assert!(table.complete_advice(completion.token, completion.outcome));
        assert_eq!(table.session(), &AdviceSession::Failed);
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout: Duration) -> AdvisorCommand {
        AdvisorCommand {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            timeout,
        }
    }

    #[cfg(unix)]
    #[test]
    fn shell_advisor_resolves_the_session() {
        let mut table = ready_table();
        let reply = r#"{"action":"STAND","confidence":92,"explanation":"16 v K"}"#;
        let script = format!("cat > /dev/null; printf '%s' '{reply}'");
        let mut advisor = ProcessAdvisor::new(Some(shell(&script, Duration::from_secs(10))));
        let token = table.request_advice(&mut advisor).expect("token");
        let completion = wait_for(&advisor);
        assert_eq!(completion.token, token);
        assert!(table.complete_advice(completion.token, completion.outcome));
        let result = table.session().result().expect("resolved");
        assert_eq!(result.action(), AdviceAction::Stand);
    }

    #[cfg(unix)]
    #[test]
    fn shell_advisor_sees_card_codes() {
        let mut table = ready_table();
        let script = r#"grep -q '"dealer":"KS"' && printf '{"action":"HIT","confidence":60}'"#;
        let mut advisor = ProcessAdvisor::new(Some(shell(script, Duration::from_secs(10))));
        table.request_advice(&mut advisor).expect("token");
        let completion = wait_for(&advisor);
        let result = completion.outcome.expect("advice");
        assert_eq!(result.action(), AdviceAction::Hit);
        assert_eq!(result.explanation(), "");
    }

    #[cfg(unix)]
    #[test]
    fn failing_advisor_reports_unavailable() {
        let mut table = ready_table();
        let mut advisor = ProcessAdvisor::new(Some(shell("exit 3", Duration::from_secs(10))));
        table.request_advice(&mut advisor).expect("token");
        assert!(wait_for(&advisor).outcome.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn slow_advisor_times_out() {
        let mut table = ready_table();
        let mut advisor =
            ProcessAdvisor::new(Some(shell("sleep 5", Duration::from_millis(100))));
        table.request_advice(&mut advisor).expect("token");
        let err = wait_for(&advisor).outcome.expect_err("timeout");
        assert!(err.reason().contains("timed out"));
    }
}
