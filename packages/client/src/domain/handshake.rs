//! Connection states and the bounded refresh-and-retry decision.
//!
//! A failed handshake is retried at most once, and only after a successful
//! token refresh. The decision is a pure function of the attempt number and
//! the error description so it can be tested without a network.

/// Realtime channel connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Which handshake of a connect sequence is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeAttempt {
    /// First handshake with the stored access token
    Initial,
    /// Retry with the token obtained from the refresh exchange
    AfterRefresh,
}

/// What to do after a failed handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeDecision {
    /// Exchange the refresh token and try once more
    RefreshAndRetry,
    /// Credentials are unusable; send the user back to login
    RedirectToLogin,
    /// Not an authentication problem; show the error and stop
    Surface,
}

/// Status codes that identify an expired or invalid credential
const AUTH_REJECTION_CODES: [&str; 2] = ["401", "422"];

/// Reason phrases that identify an expired or invalid credential
const AUTH_REJECTION_PHRASES: [&str; 2] = ["unauthorized", "unprocessable"];

/// Check whether a handshake error description reports a rejected credential.
///
/// # Arguments
///
/// * `description` - The transport error text (e.g. `"HTTP error: 401 Unauthorized"`)
///
/// # Returns
///
/// `true` if the text carries an unauthorized/unprocessable marker
pub fn is_auth_rejection(description: &str) -> bool {
    let lowered = description.to_ascii_lowercase();
    // Codes must stand alone so that e.g. port 4010 is not mistaken for a 401.
    let has_code = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| AUTH_REJECTION_CODES.contains(&word));

    has_code
        || AUTH_REJECTION_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
}

/// Decide the next step after a failed handshake.
pub fn decide_on_failure(attempt: HandshakeAttempt, description: &str) -> HandshakeDecision {
    if !is_auth_rejection(description) {
        return HandshakeDecision::Surface;
    }

    match attempt {
        HandshakeAttempt::Initial => HandshakeDecision::RefreshAndRetry,
        HandshakeAttempt::AfterRefresh => HandshakeDecision::RedirectToLogin,
    }
}
