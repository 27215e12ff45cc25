//! Interactive session
//!
//! One coordinating loop owns the [`AppState`]. Operator input arrives line
//! by line on stdin; a one second tick dispatches radio polls to worker
//! tasks whose results come back over a channel.
//!
//! Input grammar:
//! - `CALL`                  dupe check, remembered as the station being worked
//! - `CALL NAME QUALIFIER`   log the contact
//! - empty line or `!log`    log the remembered call with its prefilled exchange
//! - `!command args`         everything else (see `!help`)

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::state::AppState;
use super::score::Score;
use super::{adif, cw, dupe, qso, score, settings};
use crate::adif::bands::selectable_bands;
use crate::error::{Error, Result};
use crate::radio::{spawn_poll, RadioStatus};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

const HELP: &str = "\
CALL                          check for a dupe on the current band
CALL NAME QUALIFIER           log a contact
(empty line) or !log          log the checked CALL with the offered exchange
!band BAND                    select a band by hand
!f1 .. !f12 [CALL [EXCH]]     send a CW macro
!list                         show the log, newest first
!score                        show the score
!export                       write SST_Statistics.txt and SST.adi
!edit ID CALL NAME QUAL DATE TIME BAND
!delete ID
!mycall CALL
!myexchange NAME STATE
!get KEY / !set KEY VALUE     read or change a setting
!status                       band, radio and station
!quit";

/// Operator-facing outcome of one input line
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }
}

/// What the operator is currently working
#[derive(Debug, Default)]
pub struct Entry {
    pub callsign: String,
    pub exchange: String,
}

pub struct Session {
    pub state: AppState,
    pub entry: Entry,
}

impl Session {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            entry: Entry::default(),
        }
    }

    pub fn status_line(&self) -> String {
        let band = &self.state.band;
        format!(
            "{} {} | {} | band {} at {} Hz | {}",
            crate::commands::time_utils::utc_clock(),
            self.state.settings.mycallsign,
            self.state.settings.myexchange,
            band.band(),
            band.frequency(),
            self.state.radio_status
        )
    }

    /// Handle one line of operator input. Errors are turned into a short
    /// status line; nothing here ends the session except `!quit`.
    pub async fn handle_line(&mut self, input: &str) -> Reply {
        match self.dispatch(input.trim()).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("'{}': {}", input.trim(), e);
                Reply::line(format!("Error: {}", e))
            }
        }
    }

    async fn dispatch(&mut self, input: &str) -> Result<Reply> {
        if input.is_empty() {
            if self.entry.callsign.is_empty() {
                return Ok(Reply::default());
            }
            return self.log_entry().await;
        }
        match input.strip_prefix('!') {
            Some(command) => self.command(command).await,
            None => self.contact_entry(input).await,
        }
    }

    async fn contact_entry(&mut self, input: &str) -> Result<Reply> {
        let (call, exchange) = match input.split_once(char::is_whitespace) {
            Some((call, rest)) => (call, rest.trim()),
            None => (input, ""),
        };

        if exchange.is_empty() {
            let check = dupe::check_dupe(&self.state, call, "").await;
            self.entry.callsign = qso::clean_callsign(call);
            self.entry.exchange = check.suggested_exchange.clone().unwrap_or_default();

            let mut line = format!(
                "{}: {}",
                self.entry.callsign,
                if check.is_dupe { "DUPE" } else { "new" }
            );
            if !check.worked_bands.is_empty() {
                line.push_str(&format!(" (worked {})", check.worked_bands.join(", ")));
            }
            if let Some(exchange) = &check.suggested_exchange {
                line.push_str(&format!(" exchange? {}", exchange));
            }
            return Ok(Reply::line(line));
        }

        match qso::log_contact(&mut self.state, call, exchange).await? {
            Some(id) => {
                // The contact is committed; nothing after this point fails the reply
                self.entry = Entry::default();
                let mut lines = vec![self.contact_line(id).await];
                if let Some(score) = self.refresh_score().await {
                    lines.push(format!(
                        "QSOs: {}  Mults: {}  Score: {}",
                        score.total_qsos, score.total_mults, score.total_score
                    ));
                }
                Ok(Reply { lines, quit: false })
            }
            None => Ok(Reply::line("Need a callsign, a name and a qualifier")),
        }
    }

    /// Log the remembered callsign with its prefilled or keyed exchange
    async fn log_entry(&mut self) -> Result<Reply> {
        if self.entry.callsign.is_empty() {
            return Ok(Reply::line("Nothing to log"));
        }
        if self.entry.exchange.is_empty() {
            return Ok(Reply::line(format!("{}: exchange?", self.entry.callsign)));
        }
        let input = format!("{} {}", self.entry.callsign, self.entry.exchange);
        self.contact_entry(&input).await
    }

    /// List line for a stored contact, or just its id if it cannot be read back
    async fn contact_line(&self, id: i64) -> String {
        match crate::db::qso::get(&self.state.db, id).await {
            Ok(contact) => qso::format_contact(&contact),
            Err(e) => {
                log::warn!("Contact {} stored but not read back: {}", id, e);
                format!("Logged {:03}", id)
            }
        }
    }

    /// Recompute the score and rewrite the report file. A failed write is
    /// logged and the score is still returned.
    async fn refresh_score(&self) -> Option<Score> {
        match score::write_report(&self.state).await {
            Ok(score) => return Some(score),
            Err(e) => log::warn!("Score report not written: {}", e),
        }
        match score::recompute(&self.state).await {
            Ok(score) => Some(score),
            Err(e) => {
                log::error!("Score unavailable: {}", e);
                None
            }
        }
    }

    async fn command(&mut self, command: &str) -> Result<Reply> {
        let args: Vec<&str> = command.split_whitespace().collect();
        let Some((&name, rest)) = args.split_first() else {
            return Ok(Reply::default());
        };
        let name = name.to_lowercase();

        match (name.as_str(), rest) {
            ("quit" | "q", _) => Ok(Reply {
                lines: vec!["73".to_string()],
                quit: true,
            }),
            ("help" | "h", _) => {
                let mut lines: Vec<String> = HELP.lines().map(str::to_string).collect();
                lines.extend(cw::macro_labels(&self.state));
                Ok(Reply { lines, quit: false })
            }
            ("status", _) => Ok(Reply::line(self.status_line())),
            ("band", [band]) => {
                self.state.band.change_band(band)?;
                Ok(Reply::line(format!(
                    "Band {} at {} Hz",
                    self.state.band.band(),
                    self.state.band.frequency()
                )))
            }
            ("band", _) => Ok(Reply::line(format!(
                "Bands: {}",
                selectable_bands().collect::<Vec<_>>().join(" ")
            ))),
            ("list", _) => {
                let lines = qso::log_lines(&self.state).await?;
                if lines.is_empty() {
                    return Ok(Reply::line("Log is empty"));
                }
                Ok(Reply { lines, quit: false })
            }
            ("log", _) => self.log_entry().await,
            ("score", _) => match self.refresh_score().await {
                Some(score) => Ok(Reply {
                    lines: score.report().lines().map(str::to_string).collect(),
                    quit: false,
                }),
                None => Ok(Reply::line("Score unavailable")),
            },
            ("export", _) => Ok(Reply::line(adif::generate_logs(&self.state).await?)),
            ("edit", [id, call, name, qualifier, date, time, band]) => {
                let id = parse_id(id)?;
                qso::edit_contact(
                    &self.state,
                    id,
                    call,
                    &format!("{} {}", name, qualifier),
                    &format!("{} {}", date, time),
                    band,
                )
                .await?;
                self.refresh_score().await;
                Ok(Reply::line(self.contact_line(id).await))
            }
            ("delete", [id]) => {
                let id = parse_id(id)?;
                qso::delete_contact(&self.state, id).await?;
                self.refresh_score().await;
                Ok(Reply::line(format!("Deleted {:03}", id)))
            }
            ("mycall", [call]) => {
                let call = settings::change_my_call(&mut self.state, call)?;
                Ok(Reply::line(format!("My call: {}", call)))
            }
            ("myexchange", words) if !words.is_empty() => {
                let exchange = settings::change_my_exchange(&mut self.state, &words.join(" "))?;
                Ok(Reply::line(format!("My exchange: {}", exchange)))
            }
            ("get", [key]) => match settings::get_setting(&self.state, key)? {
                Some(value) if key.contains("password") && !value.is_empty() => {
                    Ok(Reply::line(format!("{} = ***", key)))
                }
                Some(value) => Ok(Reply::line(format!("{} = {}", key, value))),
                None => Ok(Reply::line(format!("No setting '{}'", key))),
            },
            ("set", [key, value @ ..]) if !value.is_empty() => {
                settings::set_setting(&mut self.state, key, &value.join(" "))?;
                Ok(Reply::line(format!("{} updated", key)))
            }
            (fkey, rest) if is_fkey(fkey) => self.send_fkey(fkey, rest).await,
            _ => Ok(Reply::line(format!("Unknown command '!{}', try !help", command))),
        }
    }

    async fn send_fkey(&mut self, fkey: &str, rest: &[&str]) -> Result<Reply> {
        if let Some((call, exchange)) = rest.split_first() {
            self.entry.callsign = qso::clean_callsign(call);
            self.entry.exchange = qso::clean_exchange(&exchange.join(" "));
        }
        match cw::send_macro(
            &self.state,
            fkey,
            &self.entry.callsign,
            &self.entry.exchange,
        )
        .await
        {
            Ok(text) => Ok(Reply::line(format!("CW: {}", text))),
            // Keyer trouble never interrupts logging
            Err(Error::Keyer(e)) => {
                log::warn!("CW not sent: {}", e);
                Ok(Reply::line(format!("CW not sent: {}", e)))
            }
            Err(e) => Err(e),
        }
    }

    /// Start a radio poll if rig control is configured
    pub fn poll_radio(&mut self, tx: &mpsc::UnboundedSender<crate::radio::PollResult>) {
        if let Some(radio) = &self.state.radio {
            let generation = self.state.poller.next_generation();
            spawn_poll(radio.clone(), generation, tx.clone());
        }
    }
}

fn is_fkey(name: &str) -> bool {
    name.strip_prefix('f')
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| (1..=12).contains(&n))
}

fn parse_id(text: &str) -> Result<i64> {
    text.parse()
        .map_err(|_| Error::Validation(format!("'{}' is not a contact id", text)))
}

/// Run the interactive loop until `!quit` or end of input
pub async fn run(state: AppState) -> Result<()> {
    let mut session = Session::new(state);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = interval(POLL_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("{}", session.status_line());
    println!("Type !help for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let reply = session.handle_line(&line).await;
                for text in &reply.lines {
                    println!("{}", text);
                }
                if reply.quit {
                    break;
                }
            }
            _ = tick.tick() => {
                session.poll_radio(&tx);
            }
            Some(result) = rx.recv() => {
                let was = session.state.radio_status;
                let changed = session.state.apply_poll(result.generation, result.reading);
                let now = session.state.radio_status;
                if changed || (was != now && now != RadioStatus::Disabled) {
                    println!("{}", session.status_line());
                }
            }
        }
    }

    log::info!("Session ended");
    Ok(())
}
