pub(crate) mod session_tokens;
