//! Classification of server lines.

/// Prefix of a success acknowledgement.
pub const OK: &str = "OK";

/// Prefix of a failure acknowledgement.
pub const ACK: &str = "ACK";

const GREETING_PREFIX: &str = "OK MPD ";
const CHANGED_PREFIX: &str = "changed: ";

/// One line received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `OK MPD <version>`; holds the version token verbatim
    Greeting(String),
    /// Any line starting with `OK` that is not a greeting; holds the full line
    Ok(String),
    /// Any line starting with `ACK`; holds the full line
    Ack(String),
    /// `changed: <system>`; holds the subsystem name
    Changed(String),
    /// Anything else
    Unrecognized(String),
}

impl Line {
    /// Classify a raw line (without its line terminator).
    ///
    /// Matching is exact and case-sensitive. The greeting version and the
    /// changed subsystem are single whitespace-free tokens; anything after
    /// the token is ignored.
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(GREETING_PREFIX) {
            if let Some(version) = first_token(rest) {
                return Line::Greeting(version.to_string());
            }
        }
        if let Some(rest) = raw.strip_prefix(CHANGED_PREFIX) {
            if let Some(system) = first_token(rest) {
                return Line::Changed(system.to_string());
            }
        }
        if raw.starts_with(OK) {
            return Line::Ok(raw.to_string());
        }
        if raw.starts_with(ACK) {
            return Line::Ack(raw.to_string());
        }
        Line::Unrecognized(raw.to_string())
    }

    /// True only for a bare `OK`, the terminator of an idle response.
    pub fn is_bare_ok(&self) -> bool {
        matches!(self, Line::Ok(text) if text == OK)
    }
}

fn first_token(s: &str) -> Option<&str> {
    // A leading space means the token itself is missing
    if s.starts_with(char::is_whitespace) {
        return None;
    }
    s.split_whitespace().next()
}
