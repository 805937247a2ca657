//! Shared helpers for provider adapters.

use tb_domain::error::Error;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// True when a transport failure is worth retrying (connect failures
/// and timeouts).  A response we received but could not use is a hard
/// error.
pub(crate) fn is_retryable(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// Resolve the partner credential from the configured env var.
///
/// An unset variable is not fatal: searches run unattributed with an
/// empty partner id, matching the provider's anonymous default.
pub fn resolve_partner_id(env_var: &str) -> String {
    match std::env::var(env_var) {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(
                env_var,
                "partner id env var not set, searching without attribution"
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_id_from_env() {
        let var = "TB_TEST_PARTNER_ID_1234";
        std::env::set_var(var, "partner-77");
        assert_eq!(resolve_partner_id(var), "partner-77");
        std::env::remove_var(var);
    }

    #[test]
    fn missing_partner_id_is_empty() {
        assert_eq!(resolve_partner_id("TB_TEST_UNSET_VAR_9999"), "");
    }
}
